//! Poll, survey and split-test xblock events
//!
//! All five are server-sourced and carry the module/tag/aside context along
//! in the extras, with the session scrubbed.

use serde_json::Value;

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::CaliperResult;
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{course_id, person_on_web_page, text, Transformed};

fn push_module_extras(event: &mut CaliperEvent, raw: &RawEvent, with_asides: bool) {
    let context = raw.context.as_ref();
    event.extra().insert("ip".into(), text(&raw.ip));
    event.extra().insert("course_id".into(), course_id(raw));
    event.extra().insert(
        "module".into(),
        context.and_then(|c| c.module.clone()).unwrap_or(Value::Null),
    );
    event.extra().insert(
        "course_user_tags".into(),
        context
            .and_then(|c| c.course_user_tags.clone())
            .unwrap_or(Value::Null),
    );
    if with_asides {
        event.extra().insert(
            "asides".into(),
            context.and_then(|c| c.asides.clone()).unwrap_or(Value::Null),
        );
    }
}

fn block_event(
    raw: &RawEvent,
    mut event: CaliperEvent,
    event_type: EventType,
    action: Action,
    entity_type: EntityType,
    extensions: Option<Value>,
    with_asides: bool,
) -> CaliperResult<Transformed> {
    raw.require_context()?;

    let mut object = Entity::new(raw.referer.clone(), entity_type);
    object.extensions = extensions;
    push_module_extras(&mut event, raw, with_asides);
    event.classify(event_type, action);
    event.object = Some(object);
    person_on_web_page(&mut event, raw);
    event.scrub_session();
    Ok(event.into())
}

/// `xblock.poll.view_results`
pub fn poll_results_viewed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    block_event(
        raw,
        event,
        EventType::Event,
        Action::Viewed,
        EntityType::Result,
        None,
        true,
    )
}

/// `xblock.survey.view_results`
pub fn survey_results_viewed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    block_event(
        raw,
        event,
        EventType::Event,
        Action::Viewed,
        EntityType::Result,
        Some(raw.event.as_received()),
        true,
    )
}

/// `xblock.survey.submitted`
pub fn survey_submitted(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    block_event(
        raw,
        event,
        EventType::AssessmentEvent,
        Action::Submitted,
        EntityType::Assessment,
        Some(raw.event.as_received()),
        true,
    )
}

/// `xblock.poll.submitted`
pub fn poll_submitted(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    block_event(
        raw,
        event,
        EventType::AssessmentEvent,
        Action::Submitted,
        EntityType::Assessment,
        Some(raw.event.as_received()),
        true,
    )
}

/// `xblock.split_test.child_render`; identifies which child module a
/// learner in an content experiment was shown
pub fn split_test_child_rendered(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    block_event(
        raw,
        event,
        EventType::ViewEvent,
        Action::Viewed,
        EntityType::DigitalResource,
        Some(raw.event.as_received()),
        false,
    )
}
