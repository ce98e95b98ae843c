//! Peer instruction (UBC) xblock events

use serde_json::Value;

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::CaliperResult;
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{person_on_web_page, text, Transformed};

/// `ubc.peer_instruction.accessed`
pub fn accessed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let context = raw.require_context()?;

    event.classify(EventType::ViewEvent, Action::Viewed);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::AssignableDigitalResource)
            .with_extensions(raw.event.as_received()),
    );
    event.extra().insert(
        "asides".into(),
        context.asides.clone().unwrap_or(Value::Null),
    );
    event.extra().insert(
        "course_id".into(),
        context.course_id.clone().map(Value::String).unwrap_or(Value::Null),
    );
    event.extra().insert(
        "course_user_tags".into(),
        context.course_user_tags.clone().unwrap_or(Value::Null),
    );
    person_on_web_page(&mut event, raw);
    event.extra().insert("ip".into(), text(&raw.ip));
    event.scrub_session();
    Ok(event.into())
}

fn response_submitted(raw: &RawEvent, mut event: CaliperEvent) -> CaliperResult<Transformed> {
    let context = raw.require_context()?;

    event.classify(EventType::AssessmentEvent, Action::Submitted);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Assessment)
            .with_extensions(raw.event.as_received()),
    );
    event.extra().insert(
        "asides".into(),
        context.asides.clone().unwrap_or(Value::Null),
    );
    event.extra().insert(
        "course_id".into(),
        context.course_id.clone().map(Value::String).unwrap_or(Value::Null),
    );
    event.extra().insert(
        "course_user_tags".into(),
        context.course_user_tags.clone().unwrap_or(Value::Null),
    );
    event.extra().insert(
        "module".into(),
        context.module.clone().unwrap_or(Value::Null),
    );
    event.extra().insert("ip".into(), text(&raw.ip));
    person_on_web_page(&mut event, raw);
    event.scrub_session();
    Ok(event.into())
}

/// `ubc.peer_instruction.original_submitted`
pub fn original_submitted(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    response_submitted(raw, event)
}

/// `ubc.peer_instruction.revised_submitted`
pub fn revised_submitted(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    response_submitted(raw, event)
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

    fn ubc_raw(event_type: &str) -> RawEvent {
        serde_json::from_value(json!({
            "event_type": event_type,
            "event": {"answer": 1, "rationale": "it follows"},
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
                "module": {"display_name": "Peer Instruction"},
                "asides": {},
                "course_user_tags": {}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_accessed_is_a_view_of_the_question() {
        let raw = ubc_raw("ubc.peer_instruction.accessed");
        let envelope = build_envelope(&raw, &ctx()).unwrap();
        let event = accessed(&raw, &ctx(), envelope).unwrap();
        let event = event.as_caliper().unwrap();

        assert_eq!(event.event_type, Some(EventType::ViewEvent));
        assert_eq!(
            event.object.as_ref().unwrap().entity_type,
            Some(EntityType::AssignableDigitalResource)
        );
        assert!(!event.extensions.extra_fields.contains_key("session"));
        assert!(!event.extensions.extra_fields.contains_key("module"));
    }

    #[test]
    fn test_submissions_carry_the_module() {
        let raw = ubc_raw("ubc.peer_instruction.original_submitted");
        let envelope = build_envelope(&raw, &ctx()).unwrap();
        let event = original_submitted(&raw, &ctx(), envelope).unwrap();
        let event = event.as_caliper().unwrap();

        assert_eq!(event.action, Some(Action::Submitted));
        assert_eq!(
            event.extensions.extra_fields["module"],
            json!({"display_name": "Peer Instruction"})
        );
    }
}
