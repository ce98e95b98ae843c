//! Special-exam (timed, practice, proctored) events
//!
//! The exam name is lifted out of the payload into `object.name`; attempt
//! deletion converts the attempt's start/end stamps into the object's
//! `startedAtTime`/`endedAtTime`.

use serde_json::{Map, Value};

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::CaliperResult;
use crate::identity::TransformContext;
use crate::raw::RawEvent;
use crate::time::convert_datetime;

use super::{course_id, person_on_web_page, text, Transformed};

fn exam_details(raw: &RawEvent) -> CaliperResult<Map<String, Value>> {
    Ok(raw.details()?.as_object().cloned().unwrap_or_default())
}

fn push_exam_extras(event: &mut CaliperEvent, raw: &RawEvent) {
    event.extra().insert("course_id".into(), course_id(raw));
    event.extra().insert("ip".into(), text(&raw.ip));
}

/// Shared shape: exam name lifted into the object, remaining payload in the
/// object extensions
fn exam_event(
    raw: &RawEvent,
    mut event: CaliperEvent,
    event_type: EventType,
    action: Action,
    entity_type: EntityType,
    name_required: bool,
) -> CaliperResult<Transformed> {
    let mut details = exam_details(raw)?;
    let name = details.remove("exam_name");
    if name_required && name.is_none() {
        return Err(crate::error::CaliperError::MissingRequiredField {
            field: "exam_name",
            event_type: raw.event_type.clone(),
        });
    }

    event.classify(event_type, action);
    let mut object = Entity::new(raw.referer.clone(), entity_type);
    object.name = name;
    object.extensions = Some(Value::Object(details));
    event.object = Some(object);

    push_exam_extras(&mut event, raw);
    person_on_web_page(&mut event, raw);
    Ok(event.into())
}

/// `edx.special_exam.timed.attempt.created`
pub fn timed_attempt_created(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    exam_event(raw, event, EventType::Event, Action::Created, EntityType::Attempt, true)
}

/// `edx.special_exam.timed.attempt.started`
pub fn timed_attempt_started(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    exam_event(
        raw,
        event,
        EventType::AssessmentEvent,
        Action::Started,
        EntityType::Assessment,
        true,
    )
}

/// `edx.special_exam.timed.attempt.submitted`; also carries the course user
/// tags in the extras
pub fn timed_attempt_submitted(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let mut details = exam_details(raw)?;
    let name = details
        .remove("exam_name")
        .ok_or(crate::error::CaliperError::MissingRequiredField {
            field: "exam_name",
            event_type: raw.event_type.clone(),
        })?;

    event.classify(EventType::AssessmentEvent, Action::Submitted);
    let mut object = Entity::new(raw.referer.clone(), EntityType::Assessment);
    object.name = Some(name);
    object.extensions = Some(Value::Object(details));
    event.object = Some(object);

    event.extra().insert("course_id".into(), course_id(raw));
    event.extra().insert(
        "course_user_tags".into(),
        raw.context
            .as_ref()
            .and_then(|c| c.course_user_tags.clone())
            .unwrap_or(Value::Null),
    );
    event.extra().insert("ip".into(), text(&raw.ip));
    person_on_web_page(&mut event, raw);
    Ok(event.into())
}

/// `edx.special_exam.timed.attempt.ready_to_submit`; the learner is prompted
/// to submit and navigated to the submission page
pub fn timed_attempt_ready_to_submit(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    exam_event(
        raw,
        event,
        EventType::NavigationEvent,
        Action::NavigatedTo,
        EntityType::WebPage,
        true,
    )
}

/// `edx.special_exam.timed.attempt.deleted`
pub fn timed_attempt_deleted(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let mut details = exam_details(raw)?;

    event.classify(EventType::Event, Action::Deleted);
    let mut object = Entity::new(raw.referer.clone(), EntityType::Attempt);
    object.name = details.remove("exam_name");
    object.started_at_time = details
        .remove("attempt_started_at")
        .and_then(|v| v.as_str().and_then(convert_datetime));
    object.ended_at_time = details
        .remove("attempt_completed_at")
        .and_then(|v| v.as_str().and_then(convert_datetime));
    object.extensions = Some(Value::Object(details));
    event.object = Some(object);

    push_exam_extras(&mut event, raw);
    person_on_web_page(&mut event, raw);
    Ok(event.into())
}

/// `edx.special_exam.practice.attempt.created`
pub fn practice_attempt_created(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    exam_event(raw, event, EventType::Event, Action::Created, EntityType::Attempt, true)
}

/// The instructor-side create/update events tolerate a missing exam name
fn exam_definition_event(
    raw: &RawEvent,
    event: CaliperEvent,
    action: Action,
) -> CaliperResult<Transformed> {
    exam_event(raw, event, EventType::Event, action, EntityType::Assessment, false)
}

/// `edx.special_exam.timed.created`
pub fn timed_created(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    exam_definition_event(raw, event, Action::Created)
}

/// `edx.special_exam.timed.updated`
pub fn timed_updated(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    exam_definition_event(raw, event, Action::Modified)
}

/// `edx.special_exam.practice.created`
pub fn practice_created(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    exam_definition_event(raw, event, Action::Created)
}

/// `edx.special_exam.practice.updated`
pub fn practice_updated(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    exam_definition_event(raw, event, Action::Modified)
}

/// `edx.special_exam.proctored.created`
pub fn proctored_created(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    exam_definition_event(raw, event, Action::Created)
}

/// `edx.special_exam.proctored.updated`
pub fn proctored_updated(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    exam_definition_event(raw, event, Action::Modified)
}
