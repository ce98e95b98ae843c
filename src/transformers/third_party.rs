//! Google component and Oppia exploration events
//!
//! All five share one shape: the embedded component at the referer, the
//! module context in the extras, session scrubbed.

use serde_json::Value;

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::CaliperResult;
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{person_on_web_page, text, Transformed};

fn component_event(
    raw: &RawEvent,
    mut event: CaliperEvent,
    event_type: EventType,
    action: Action,
    entity_type: EntityType,
) -> CaliperResult<Transformed> {
    let context = raw.require_context()?;

    event.extra().insert("ip".into(), text(&raw.ip));
    event.extra().insert(
        "course_id".into(),
        context.course_id.clone().map(Value::String).unwrap_or(Value::Null),
    );
    event.extra().insert(
        "module".into(),
        context.module.clone().unwrap_or(Value::Null),
    );
    event.extra().insert(
        "course_user_tags".into(),
        context.course_user_tags.clone().unwrap_or(Value::Null),
    );
    event.extra().insert(
        "asides".into(),
        context.asides.clone().unwrap_or(Value::Null),
    );

    event.classify(event_type, action);
    event.object = Some(
        Entity::new(raw.referer.clone(), entity_type).with_extensions(raw.event.as_received()),
    );
    person_on_web_page(&mut event, raw);
    event.scrub_session();
    Ok(event.into())
}

/// `edx.googlecomponent.calendar.displayed`
pub fn calendar_displayed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    component_event(raw, event, EventType::ViewEvent, Action::Viewed, EntityType::Frame)
}

/// `edx.googlecomponent.document.displayed`
pub fn document_displayed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    component_event(raw, event, EventType::ViewEvent, Action::Viewed, EntityType::Document)
}

/// `oppia.exploration.state.changed`; every answer submission changes the
/// exploration state
pub fn exploration_state_changed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    component_event(raw, event, EventType::Event, Action::Modified, EntityType::AssessmentItem)
}

/// `oppia.exploration.loaded`
pub fn exploration_loaded(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    component_event(raw, event, EventType::Event, Action::Started, EntityType::AssessmentItem)
}

/// `oppia.exploration.completed`
pub fn exploration_completed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    component_event(raw, event, EventType::Event, Action::Completed, EntityType::AssessmentItem)
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

    fn component_raw(event_type: &str) -> RawEvent {
        serde_json::from_value(json!({
            "event_type": event_type,
            "event": {"url": "https://calendar.google.com/embed", "displayed": true},
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
                "module": {"display_name": "Google Calendar"},
                "course_user_tags": {},
                "asides": {}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_calendar_is_viewed_in_a_frame() {
        let raw = component_raw("edx.googlecomponent.calendar.displayed");
        let envelope = build_envelope(&raw, &ctx()).unwrap();
        let event = calendar_displayed(&raw, &ctx(), envelope).unwrap();
        let event = event.as_caliper().unwrap();

        assert_eq!(event.event_type, Some(EventType::ViewEvent));
        assert_eq!(
            event.object.as_ref().unwrap().entity_type,
            Some(EntityType::Frame)
        );
        assert!(!event.extensions.extra_fields.contains_key("session"));
    }

    #[test]
    fn test_exploration_completed_keeps_the_module_extra() {
        let raw = component_raw("oppia.exploration.completed");
        let envelope = build_envelope(&raw, &ctx()).unwrap();
        let event = exploration_completed(&raw, &ctx(), envelope).unwrap();
        let event = event.as_caliper().unwrap();

        assert_eq!(event.action, Some(Action::Completed));
        assert_eq!(
            event.extensions.extra_fields["module"],
            json!({"display_name": "Google Calendar"})
        );
    }
}
