//! Completion xblock toggle event

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::CaliperResult;
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{merge_raw_context, person_on_web_page, push_ip, Transformed};

/// `edx.done.toggled`; emitted by both sides, the server copy carries the
/// session which gets scrubbed
pub fn done_toggled(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let mut object = Entity::new(raw.referer.clone(), EntityType::SoftwareApplication);

    event.classify(EventType::ToolUseEvent, Action::Used);
    person_on_web_page(&mut event, raw);
    merge_raw_context(&mut event, raw)?;
    push_ip(&mut event, raw);

    if raw.is_server_sourced() {
        event.scrub_session();
        object.extensions = Some(raw.event.as_received());
    } else {
        object.extensions = Some(raw.details()?);
    }
    event.object = Some(object);
    Ok(event.into())
}
