//! Courseware navigation events
//!
//! Link clicks and sequence moves are browser events with JSON-encoded
//! payloads; `page_close` marks the end of time spent on a page.

use serde_json::Value;

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::CaliperResult;
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{payload_field, person_on_web_page, push_course_and_ip, Transformed};

/// `edx.ui.lms.link_clicked`; the clicked target url becomes the object
pub fn link_clicked(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let target_url = payload_field(&details, "target_url", raw)?
        .as_str()
        .map(str::to_string);

    event.classify(EventType::NavigationEvent, Action::NavigatedTo);
    event.object =
        Some(Entity::new(target_url, EntityType::WebPage).with_extensions(details));
    person_on_web_page(&mut event, raw);
    push_course_and_ip(&mut event, raw);
    Ok(event.into())
}

/// `edx.course.tool.accessed`; a course tool opened from the Course Tools
/// panel
pub fn tool_accessed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;

    event.classify(EventType::ToolUseEvent, Action::Used);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::SoftwareApplication)
            .with_extensions(details),
    );
    person_on_web_page(&mut event, raw);
    push_course_and_ip(&mut event, raw);
    Ok(event.into())
}

fn sequence_event(raw: &RawEvent, mut event: CaliperEvent) -> CaliperResult<Transformed> {
    let details = raw.details()?;

    event.classify(EventType::NavigationEvent, Action::NavigatedTo);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::DigitalResource).with_extensions(details),
    );
    person_on_web_page(&mut event, raw);
    push_course_and_ip(&mut event, raw);
    Ok(event.into())
}

/// `edx.ui.lms.sequence.next_selected`
pub fn sequence_next_selected(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    sequence_event(raw, event)
}

/// `edx.ui.lms.sequence.previous_selected`
pub fn sequence_previous_selected(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    sequence_event(raw, event)
}

/// `seq_next`; arrow navigation inside a unit
pub fn seq_next(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    sequence_event(raw, event)
}

/// `seq_prev`
pub fn seq_prev(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    sequence_event(raw, event)
}

/// `seq_goto`; a jump straight to a unit in the sequence
pub fn seq_goto(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    sequence_event(raw, event)
}

/// `page_close`; the browser reports the learner leaving the page
pub fn page_close(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::Event, Action::Ended);
    event.object = Some(Entity::new(
        raw.page
            .as_ref()
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| raw.referer.clone()),
        EntityType::WebPage,
    ));
    person_on_web_page(&mut event, raw);
    push_course_and_ip(&mut event, raw);
    Ok(event.into())
}
