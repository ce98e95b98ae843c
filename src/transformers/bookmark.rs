//! Bookmark events: listing, adding, visiting and removing bookmarks

use serde_json::{json, Value};

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::CaliperResult;
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{course_id, payload_field, person_on_web_page, push_ip, text, Transformed};

/// `edx.bookmark.listed`; emitted per results page of the bookmark list
/// under Course Tools
pub fn listed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let field = |name: &str| details.get(name).cloned().unwrap_or(Value::Null);

    event.classify(EventType::NavigationEvent, Action::NavigatedTo);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::WebPage).with_extensions(json!({
            "course_id": field("course_id"),
            "page_number": field("page_number"),
            "bookmarks_count": field("bookmarks_count"),
            "page_size": field("page_size"),
            "list_type": field("list_type"),
        })),
    );
    person_on_web_page(&mut event, raw);
    push_ip(&mut event, raw);
    Ok(event.into())
}

/// `edx.bookmark.added`
pub fn added(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;

    event.classify(EventType::AnnotationEvent, Action::Bookmarked);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Page).with_extensions(json!({
            "course_id": payload_field(&details, "course_id", raw)?,
            "bookmark_id": payload_field(&details, "bookmark_id", raw)?,
            "component_usage_id": payload_field(&details, "component_usage_id", raw)?,
            "component_type": payload_field(&details, "component_type", raw)?,
        })),
    );
    person_on_web_page(&mut event, raw);
    event.extra().insert("ip".into(), text(&raw.ip));
    event.extra().insert(
        "path".into(),
        raw.context
            .as_ref()
            .and_then(|c| c.path.clone())
            .map(Value::String)
            .unwrap_or(Value::Null),
    );
    Ok(event.into())
}

/// `edx.bookmark.accessed`; the browser JSON-encodes the payload
pub fn accessed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;

    event.classify(EventType::NavigationEvent, Action::NavigatedTo);
    event.extra().insert("course_id".into(), course_id(raw));
    event.extra().insert("ip".into(), text(&raw.ip));
    person_on_web_page(&mut event, raw);
    event.object =
        Some(Entity::new(raw.referer.clone(), EntityType::WebPage).with_extensions(details));
    Ok(event.into())
}

/// `edx.bookmark.removed`; the payload stays as received
pub fn removed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::Event, Action::Deleted);
    push_ip(&mut event, raw);
    person_on_web_page(&mut event, raw);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::BookmarkAnnotation)
            .with_extensions(raw.event.as_received()),
    );
    Ok(event.into())
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

    fn bookmark_raw(event_type: &str, payload: Value) -> RawEvent {
        serde_json::from_value(json!({
            "event_type": event_type,
            "event": payload,
            "username": "honor",
            "referer": "http://localhost:18000/courses/course-v1:edX+DemoX+Demo_Course/bookmarks/",
            "ip": "127.0.0.1",
            "time": "2018-10-16T14:23:24.785148+00:00",
            "event_source": "server",
            "context": {
                "course_id": "course-v1:edX+DemoX+Demo_Course",
                "org_id": "edX",
                "user_id": 7,
                "path": "/api/bookmarks/v1/bookmarks/"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_listed_is_a_navigation_with_paging_extensions() {
        let raw = bookmark_raw(
            "edx.bookmark.listed",
            json!({
                "course_id": "course-v1:edX+DemoX+Demo_Course",
                "page_number": 2,
                "bookmarks_count": 23,
                "page_size": 10,
                "list_type": "per_course"
            }),
        );
        let envelope = build_envelope(&raw, &ctx()).unwrap();
        let event = listed(&raw, &ctx(), envelope).unwrap();
        let event = event.as_caliper().unwrap();

        assert_eq!(event.event_type, Some(EventType::NavigationEvent));
        let extensions = event.object.as_ref().unwrap().extensions.as_ref().unwrap();
        assert_eq!(extensions["page_number"], json!(2));
        assert_eq!(extensions["bookmarks_count"], json!(23));
    }

    #[test]
    fn test_added_requires_the_bookmark_identifier() {
        let raw = bookmark_raw(
            "edx.bookmark.added",
            json!({
                "course_id": "course-v1:edX+DemoX+Demo_Course",
                "component_usage_id": "block-v1:edX+DemoX+type@html+block@x",
                "component_type": "html"
            }),
        );
        let envelope = build_envelope(&raw, &ctx()).unwrap();
        let err = added(&raw, &ctx(), envelope).unwrap_err();
        assert!(matches!(
            err,
            crate::error::CaliperError::MissingRequiredField { field: "bookmark_id", .. }
        ));
    }

    #[test]
    fn test_accessed_decodes_the_browser_payload() {
        let raw = bookmark_raw(
            "edx.bookmark.accessed",
            json!("{\"bookmark_id\": \"honor,block-v1:edX+DemoX+type@html+block@x\"}"),
        );
        let envelope = build_envelope(&raw, &ctx()).unwrap();
        let event = accessed(&raw, &ctx(), envelope).unwrap();
        let event = event.as_caliper().unwrap();

        let extensions = event.object.as_ref().unwrap().extensions.as_ref().unwrap();
        assert_eq!(
            extensions["bookmark_id"],
            json!("honor,block-v1:edX+DemoX+type@html+block@x")
        );
    }

    #[test]
    fn test_removed_keeps_payload_verbatim() {
        let raw = bookmark_raw("edx.bookmark.removed", json!({"bookmark_id": "b1"}));
        let envelope = build_envelope(&raw, &ctx()).unwrap();
        let event = removed(&raw, &ctx(), envelope).unwrap();
        let event = event.as_caliper().unwrap();

        let object = event.object.as_ref().unwrap();
        assert_eq!(object.entity_type, Some(EntityType::BookmarkAnnotation));
        assert_eq!(object.extensions, Some(json!({"bookmark_id": "b1"})));
        assert_eq!(event.action, Some(Action::Deleted));
    }
}
