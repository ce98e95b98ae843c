//! Open-response assessment (ORA) events
//!
//! All server-sourced. Grading events lift `scored_at` into
//! `object.dateCreated`; saved drafts arrive with the response itself
//! JSON-encoded inside the payload.

use serde_json::{json, Map, Value};

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::{CaliperError, CaliperResult};
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{course_id, payload_field, person_on_web_page, text, Transformed};

fn context_value(raw: &RawEvent, pick: fn(&crate::raw::EventContext) -> Option<Value>) -> Value {
    raw.context.as_ref().and_then(pick).unwrap_or(Value::Null)
}

/// asides + course_user_tags + course_id + module + ip
fn push_block_extras(event: &mut CaliperEvent, raw: &RawEvent) {
    event
        .extra()
        .insert("asides".into(), context_value(raw, |c| c.asides.clone()));
    event.extra().insert(
        "course_user_tags".into(),
        context_value(raw, |c| c.course_user_tags.clone()),
    );
    event.extra().insert("course_id".into(), course_id(raw));
    event
        .extra()
        .insert("module".into(), context_value(raw, |c| c.module.clone()));
    event.extra().insert("ip".into(), text(&raw.ip));
}

/// display_name + usage_key lifted out of the module context
fn push_module_detail_extras(event: &mut CaliperEvent, raw: &RawEvent) -> CaliperResult<()> {
    let module = raw
        .require_context()?
        .module
        .clone()
        .ok_or(CaliperError::MissingRequiredField {
            field: "module",
            event_type: raw.event_type.clone(),
        })?;
    event.extra().insert(
        "display_name".into(),
        module.get("display_name").cloned().unwrap_or(Value::Null),
    );
    event.extra().insert(
        "usage_key".into(),
        module.get("usage_key").cloned().unwrap_or(Value::Null),
    );
    Ok(())
}

/// `openassessmentblock.get_submission_for_staff_grading`
pub fn staff_grading_submission_retrieved(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::ViewEvent, Action::Viewed);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Assessment)
            .with_extensions(raw.event.as_received()),
    );
    push_block_extras(&mut event, raw);
    person_on_web_page(&mut event, raw);
    event.scrub_session();
    Ok(event.into())
}

/// `openassessmentblock.get_peer_submission`; peers' responses delivered to
/// a learner for evaluation
pub fn peer_submission_retrieved(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::ViewEvent, Action::Viewed);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Assessment)
            .with_extensions(raw.event.as_received()),
    );
    person_on_web_page(&mut event, raw);
    event
        .extra()
        .insert("asides".into(), context_value(raw, |c| c.asides.clone()));
    event.extra().insert(
        "course_user_tags".into(),
        context_value(raw, |c| c.course_user_tags.clone()),
    );
    push_module_detail_extras(&mut event, raw)?;
    event.extra().insert("ip".into(), text(&raw.ip));
    event.scrub_session();
    Ok(event.into())
}

/// `openassessmentblock.create_submission`; timestamps inside the payload
/// are normalized like the envelope time
pub fn submission_created(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let normalize = |value: Value| -> Value {
        value
            .as_str()
            .and_then(crate::time::convert_datetime)
            .map(Value::String)
            .unwrap_or(Value::Null)
    };

    event.classify(EventType::AssessmentEvent, Action::Submitted);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Assessment).with_extensions(json!({
            "answer": payload_field(&details, "answer", raw)?,
            "attempt_number": payload_field(&details, "attempt_number", raw)?,
            "created_at": normalize(payload_field(&details, "created_at", raw)?),
            "submission_uuid": payload_field(&details, "submission_uuid", raw)?,
            "submitted_at": normalize(payload_field(&details, "submitted_at", raw)?),
        })),
    );
    push_block_extras(&mut event, raw);
    person_on_web_page(&mut event, raw);
    event.scrub_session();
    Ok(event.into())
}

/// The three grading variants (peer, staff, self) share one `Attempt` shape
fn assessed(raw: &RawEvent, mut event: CaliperEvent) -> CaliperResult<Transformed> {
    let mut details: Map<String, Value> = raw.details()?.as_object().cloned().unwrap_or_default();
    let scored_at = details
        .remove("scored_at")
        .and_then(|v| v.as_str().and_then(crate::time::convert_datetime))
        .ok_or(CaliperError::MissingRequiredField {
            field: "scored_at",
            event_type: raw.event_type.clone(),
        })?;

    event.classify(EventType::GradeEvent, Action::Graded);
    let mut object = Entity::new(raw.referer.clone(), EntityType::Attempt);
    object.date_created = Some(scored_at);
    object.extensions = Some(Value::Object(details));
    event.object = Some(object);

    person_on_web_page(&mut event, raw);
    push_block_extras(&mut event, raw);
    event.scrub_session();
    Ok(event.into())
}

/// `openassessmentblock.peer_assess`
pub fn peer_assessed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    assessed(raw, event)
}

/// `openassessmentblock.staff_assess`
pub fn staff_assessed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    assessed(raw, event)
}

/// `openassessmentblock.self_assess`
pub fn self_assessed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    assessed(raw, event)
}

/// `openassessment.student_training_assess_example`
pub fn training_example_assessed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;

    event.classify(EventType::AssessmentEvent, Action::Submitted);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Assessment).with_extensions(json!({
            "corrections": payload_field(&details, "corrections", raw)?,
            "options_selected": payload_field(&details, "options_selected", raw)?,
            "submission_uuid": payload_field(&details, "submission_uuid", raw)?,
        })),
    );
    push_block_extras(&mut event, raw);
    person_on_web_page(&mut event, raw);
    event.scrub_session();
    Ok(event.into())
}

/// `openassessmentblock.submit_feedback_on_assessments`
pub fn feedback_submitted(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::MessageEvent, Action::Posted);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Message)
            .with_extensions(raw.event.as_received()),
    );
    person_on_web_page(&mut event, raw);
    event
        .extra()
        .insert("asides".into(), context_value(raw, |c| c.asides.clone()));
    event.extra().insert("course_id".into(), course_id(raw));
    event.extra().insert(
        "course_user_tags".into(),
        context_value(raw, |c| c.course_user_tags.clone()),
    );
    push_module_detail_extras(&mut event, raw)?;
    event.extra().insert("ip".into(), text(&raw.ip));
    event.scrub_session();
    Ok(event.into())
}

/// `openassessmentblock.save_submission`; the draft is JSON-encoded inside
/// the payload
pub fn submission_saved(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let saved_response = decode_saved_response(raw)?;

    event.classify(EventType::AssessmentEvent, Action::Paused);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Assessment)
            .with_extensions(json!({ "saved_response": saved_response })),
    );
    person_on_web_page(&mut event, raw);
    event
        .extra()
        .insert("asides".into(), context_value(raw, |c| c.asides.clone()));
    event.extra().insert("course_id".into(), course_id(raw));
    event.extra().insert(
        "course_user_tags".into(),
        context_value(raw, |c| c.course_user_tags.clone()),
    );
    push_module_detail_extras(&mut event, raw)?;
    event.extra().insert("ip".into(), text(&raw.ip));
    event.scrub_session();
    Ok(event.into())
}

/// `openassessmentblock.save_files_descriptions`; the document is part of
/// the assessment it belongs to
pub fn file_descriptions_saved(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let saved_response = decode_saved_response(raw)?;

    event.classify(EventType::Event, Action::Described);
    let mut object = Entity::new(raw.referer.clone(), EntityType::Document)
        .with_extensions(json!({ "saved_response": saved_response }));
    object.is_part_of = Some(Box::new(Entity::new(
        raw.referer.clone(),
        EntityType::Assessment,
    )));
    event.object = Some(object);

    person_on_web_page(&mut event, raw);
    event
        .extra()
        .insert("asides".into(), context_value(raw, |c| c.asides.clone()));
    event.extra().insert(
        "course_user_tags".into(),
        context_value(raw, |c| c.course_user_tags.clone()),
    );
    event.extra().insert("ip".into(), text(&raw.ip));
    event
        .extra()
        .insert("module".into(), context_value(raw, |c| c.module.clone()));
    event.extra().insert("course_id".into(), course_id(raw));
    event.scrub_session();
    Ok(event.into())
}

fn decode_saved_response(raw: &RawEvent) -> CaliperResult<Value> {
    let details = raw.details()?;
    let encoded = details
        .get("saved_response")
        .and_then(Value::as_str)
        .ok_or(CaliperError::MissingRequiredField {
            field: "saved_response",
            event_type: raw.event_type.clone(),
        })?;
    serde_json::from_str(encoded).map_err(|e| CaliperError::MalformedPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::build_envelope;
    use crate::identity::NullResolver;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn ctx() -> TransformContext {
        TransformContext::new("http://localhost:18000", Arc::new(NullResolver))
    }

    fn ora_raw(event_type: &str, payload: Value) -> RawEvent {
        serde_json::from_value(json!({
            "event_type": event_type,
            "event": payload,
            "username": "honor",
            "referer": "http://localhost:18000/courses/course-v1:edX+DemoX+Demo_Course/courseware/",
            "ip": "127.0.0.1",
            "time": "2018-10-16T14:23:24.785148+00:00",
            "session": "a14j3ifhskqw0e2jmwgo",
            "event_source": "server",
            "context": {
                "course_id": "course-v1:edX+DemoX+Demo_Course",
                "org_id": "edX",
                "user_id": 7,
                "module": {"display_name": "Open Response", "usage_key": "block-v1:ora1"},
                "asides": {},
                "course_user_tags": {}
            }
        }))
        .unwrap()
    }

    fn run(raw: &RawEvent, transformer: super::super::Transformer) -> CaliperEvent {
        let envelope = build_envelope(raw, &ctx()).unwrap();
        match transformer(raw, &ctx(), envelope).unwrap() {
            Transformed::Caliper(event) => *event,
            Transformed::Untransformed(_) => panic!("expected a caliper event"),
        }
    }

    #[test]
    fn test_peer_assess_lifts_scored_at_into_date_created() {
        let raw = ora_raw(
            "openassessmentblock.peer_assess",
            json!({"scored_at": "2018-10-16T14:23:24.785148+00:00", "score_type": "PE", "parts": []}),
        );
        let event = run(&raw, peer_assessed);

        let object = event.object.as_ref().unwrap();
        assert_eq!(object.entity_type, Some(EntityType::Attempt));
        assert_eq!(
            object.date_created.as_deref(),
            Some("2018-10-16T14:23:24.785Z")
        );
        let extensions = object.extensions.as_ref().unwrap();
        assert!(extensions.get("scored_at").is_none());
        assert_eq!(extensions["score_type"], json!("PE"));
        assert!(!event.extensions.extra_fields.contains_key("session"));
    }

    #[test]
    fn test_submission_created_normalizes_payload_timestamps() {
        let raw = ora_raw(
            "openassessmentblock.create_submission",
            json!({
                "answer": {"parts": [{"text": "my answer"}]},
                "attempt_number": 1,
                "created_at": "2018-10-16T14:23:24.785148+00:00",
                "submitted_at": "2018-10-16T14:23:25.000000+00:00",
                "submission_uuid": "a3dc2313"
            }),
        );
        let event = run(&raw, submission_created);

        let extensions = event.object.as_ref().unwrap().extensions.as_ref().unwrap();
        assert_eq!(extensions["created_at"], json!("2018-10-16T14:23:24.785Z"));
        assert_eq!(extensions["submitted_at"], json!("2018-10-16T14:23:25.000Z"));
    }

    #[test]
    fn test_save_submission_decodes_embedded_draft() {
        let raw = ora_raw(
            "openassessmentblock.save_submission",
            json!({"saved_response": "{\"parts\": [{\"text\": \"draft\"}]}"}),
        );
        let event = run(&raw, submission_saved);

        let extensions = event.object.as_ref().unwrap().extensions.as_ref().unwrap();
        assert_eq!(
            extensions["saved_response"],
            json!({"parts": [{"text": "draft"}]})
        );
        assert_eq!(event.extensions.extra_fields["usage_key"], json!("block-v1:ora1"));
    }

    #[test]
    fn test_file_descriptions_document_is_part_of_assessment() {
        let raw = ora_raw(
            "openassessmentblock.save_files_descriptions",
            json!({"saved_response": "{\"descriptions\": [\"diagram\"]}"}),
        );
        let event = run(&raw, file_descriptions_saved);

        let object = event.object.as_ref().unwrap();
        assert_eq!(object.entity_type, Some(EntityType::Document));
        let parent = object.is_part_of.as_ref().unwrap();
        assert_eq!(parent.entity_type, Some(EntityType::Assessment));
        assert_eq!(parent.id, raw.referer);
    }
}
