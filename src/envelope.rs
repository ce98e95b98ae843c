//! Partial Caliper envelope construction
//!
//! Every registered transformer starts from the same partial envelope: a
//! fresh `urn:uuid:` id, the normalized event time, the actor's profile link,
//! the referrer URL, and the common platform extras in a fixed order. The
//! page-view path finishes the envelope itself since those events never reach
//! the registry.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::caliper::{
    Action, CaliperEvent, Entity, EntityType, EventType, Extensions, CALIPER_CONTEXT,
};
use crate::error::{CaliperError, CaliperResult};
use crate::identity::TransformContext;
use crate::raw::RawEvent;
use crate::time::convert_datetime;

fn opt(value: &Option<String>) -> Value {
    match value {
        Some(text) => Value::String(text.clone()),
        None => Value::Null,
    }
}

/// Build the partial envelope every transformer completes
pub fn build_envelope(raw: &RawEvent, ctx: &TransformContext) -> CaliperResult<CaliperEvent> {
    let context = raw.require_context()?;

    let time = raw.time.as_deref().ok_or(CaliperError::MissingRequiredField {
        field: "time",
        event_type: raw.event_type.clone(),
    })?;
    let event_time = convert_datetime(time).ok_or(CaliperError::MissingRequiredField {
        field: "time",
        event_type: raw.event_type.clone(),
    })?;

    let mut event = CaliperEvent {
        context: CALIPER_CONTEXT.to_string(),
        id: Uuid::new_v4().urn().to_string(),
        event_time,
        actor: Entity {
            id: Some(ctx.user_link(&raw.username)),
            ..Default::default()
        },
        referrer: Some(Entity {
            id: raw.referer.clone(),
            ..Default::default()
        }),
        event_type: None,
        action: None,
        object: None,
        target: None,
        extensions: Extensions::default(),
    };

    let extra = event.extra();
    extra.insert("agent".into(), opt(&raw.agent));
    extra.insert("event_type".into(), json!(raw.event_type));
    extra.insert("event_source".into(), opt(&raw.event_source));
    extra.insert("host".into(), opt(&raw.host));
    extra.insert("org_id".into(), opt(&context.org_id));
    extra.insert("path".into(), opt(&context.path));
    extra.insert("session".into(), opt(&raw.session));
    extra.insert(
        "user_id".into(),
        context.user_id.clone().unwrap_or(Value::Null),
    );
    extra.insert("accept_language".into(), opt(&raw.accept_language));
    extra.insert("page".into(), raw.page.clone().unwrap_or(Value::Null));

    Ok(event)
}

/// Complete transformation for page-view events (`event_type` starting with
/// `/`), which bypass the registry entirely
pub fn page_view(raw: &RawEvent, ctx: &TransformContext) -> CaliperResult<CaliperEvent> {
    let context = raw.require_context()?;
    let mut event = build_envelope(raw, ctx)?;

    event.actor.entity_type = Some(EntityType::Person);
    event.referrer_web_page();
    event.classify(EventType::NavigationEvent, Action::NavigatedTo);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::WebPage)
            .with_extensions(raw.event.as_received()),
    );
    event.merge_context(context);

    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::NullResolver;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn ctx() -> TransformContext {
        TransformContext::new("http://localhost:18000", Arc::new(NullResolver))
    }

    fn sample_raw() -> RawEvent {
        serde_json::from_value(json!({
            "event_type": "problem_check",
            "event": {},
            "username": "honor",
            "referer": "http://localhost:18000/courses/course-v1:edX+DemoX+Demo_Course/courseware/",
            "time": "2018-10-16T14:23:24.785148+00:00",
            "agent": "Mozilla/5.0",
            "host": "localhost",
            "session": "a14j3ifhskqw0e2jmwgo",
            "event_source": "server",
            "accept_language": "en-US,en;q=0.5",
            "page": null,
            "context": {
                "course_id": "course-v1:edX+DemoX+Demo_Course",
                "org_id": "edX",
                "user_id": 7,
                "path": "/event"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_envelope_generic_fields() {
        let event = build_envelope(&sample_raw(), &ctx()).unwrap();

        assert_eq!(event.context, CALIPER_CONTEXT);
        assert!(event.id.starts_with("urn:uuid:"));
        assert_eq!(event.event_time, "2018-10-16T14:23:24.785Z");
        assert_eq!(
            event.actor.id.as_deref(),
            Some("http://localhost:18000/u/honor")
        );
        assert_eq!(
            event.referrer.as_ref().unwrap().id.as_deref(),
            sample_raw().referer.as_deref()
        );
    }

    #[test]
    fn test_envelope_extra_field_order() {
        let event = build_envelope(&sample_raw(), &ctx()).unwrap();
        let keys: Vec<&String> = event.extensions.extra_fields.keys().collect();
        assert_eq!(
            keys,
            [
                "agent",
                "event_type",
                "event_source",
                "host",
                "org_id",
                "path",
                "session",
                "user_id",
                "accept_language",
                "page"
            ]
        );
        assert_eq!(event.extensions.extra_fields["org_id"], json!("edX"));
        assert_eq!(event.extensions.extra_fields["user_id"], json!(7));
        assert_eq!(
            event.extensions.extra_fields["session"],
            json!("a14j3ifhskqw0e2jmwgo")
        );
    }

    #[test]
    fn test_fresh_id_per_envelope() {
        let raw = sample_raw();
        let first = build_envelope(&raw, &ctx()).unwrap();
        let second = build_envelope(&raw, &ctx()).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_missing_context_fails_loudly() {
        let mut raw = sample_raw();
        raw.context = None;
        assert!(matches!(
            build_envelope(&raw, &ctx()),
            Err(CaliperError::MissingContext)
        ));
    }

    #[test]
    fn test_missing_time_is_required_field_error() {
        let mut raw = sample_raw();
        raw.time = None;
        match build_envelope(&raw, &ctx()) {
            Err(CaliperError::MissingRequiredField { field, .. }) => assert_eq!(field, "time"),
            other => panic!("expected MissingRequiredField, got {other:?}"),
        }
    }

    #[test]
    fn test_page_view_completes_the_envelope() {
        let mut raw = sample_raw();
        raw.event_type = "/courses/course-v1:edX+DemoX+Demo_Course/course/".to_string();

        let event = page_view(&raw, &ctx()).unwrap();
        assert_eq!(event.event_type, Some(EventType::NavigationEvent));
        assert_eq!(event.action, Some(Action::NavigatedTo));

        let object = event.object.as_ref().unwrap();
        assert_eq!(object.entity_type, Some(EntityType::WebPage));
        assert_eq!(object.id.as_deref(), raw.referer.as_deref());

        // context is folded into the extras
        assert_eq!(
            event.extensions.extra_fields["course_id"],
            json!("course-v1:edX+DemoX+Demo_Course")
        );
    }
}
