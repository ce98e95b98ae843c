//! Student notes events
//!
//! Note edits are annotation events whose object carries the note payload;
//! the notes page itself shows up as a plain web page view.

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::CaliperResult;
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{person_on_web_page, push_course_and_ip, Transformed};

fn note_event(
    raw: &RawEvent,
    mut event: CaliperEvent,
    action: Action,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;

    event.classify(EventType::AnnotationEvent, action);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Annotation).with_extensions(details),
    );
    person_on_web_page(&mut event, raw);
    push_course_and_ip(&mut event, raw);
    Ok(event.into())
}

/// `edx.course.student_notes.added`
pub fn added(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    note_event(raw, event, Action::Described)
}

/// `edx.course.student_notes.edited`
pub fn edited(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    note_event(raw, event, Action::Modified)
}

/// `edx.course.student_notes.deleted`
pub fn deleted(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    note_event(raw, event, Action::Deleted)
}

/// `edx.course.student_notes.viewed`
pub fn viewed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    note_event(raw, event, Action::Viewed)
}

/// `edx.course.student_notes.searched`
pub fn searched(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;

    event.classify(EventType::Event, Action::Searched);
    event.object =
        Some(Entity::new(raw.referer.clone(), EntityType::WebPage).with_extensions(details));
    person_on_web_page(&mut event, raw);
    push_course_and_ip(&mut event, raw);
    Ok(event.into())
}

/// `edx.course.student_notes.notes_page_viewed`
pub fn notes_page_viewed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;

    event.classify(EventType::ViewEvent, Action::Viewed);
    event.object =
        Some(Entity::new(raw.referer.clone(), EntityType::WebPage).with_extensions(details));
    person_on_web_page(&mut event, raw);
    push_course_and_ip(&mut event, raw);
    Ok(event.into())
}

/// `edx.course.student_notes.used_unit_link`; a jump from a note back to
/// the unit it annotates
pub fn used_unit_link(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let target = details
        .get("view")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
        .or_else(|| raw.referer.clone());

    event.classify(EventType::NavigationEvent, Action::NavigatedTo);
    event.object = Some(Entity::new(target, EntityType::WebPage).with_extensions(details));
    person_on_web_page(&mut event, raw);
    push_course_and_ip(&mut event, raw);
    Ok(event.into())
}
