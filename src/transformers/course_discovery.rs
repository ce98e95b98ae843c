//! Course discovery search events

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::CaliperResult;
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{course_id, person_on_web_page, text, Transformed};

fn discovery_event(
    raw: &RawEvent,
    mut event: CaliperEvent,
    event_type: EventType,
    action: Action,
) -> CaliperResult<Transformed> {
    event.classify(event_type, action);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::WebPage)
            .with_extensions(raw.event.as_received()),
    );
    person_on_web_page(&mut event, raw);
    event.extra().insert("ip".into(), text(&raw.ip));
    event.extra().insert("course_id".into(), course_id(raw));
    Ok(event.into())
}

/// `edx.course_discovery.search.initiated`
pub fn search_initiated(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    discovery_event(raw, event, EventType::Event, Action::Searched)
}

/// `edx.course_discovery.search.results_displayed`
pub fn search_results_displayed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    discovery_event(raw, event, EventType::ViewEvent, Action::Viewed)
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

    fn discovery_raw(event_type: &str) -> RawEvent {
        serde_json::from_value(json!({
            "event_type": event_type,
            "event": {"search_term": "demo", "page_number": 1},
            "username": "honor",
            "referer": "http://localhost:18000/courses",
            "ip": "127.0.0.1",
            "time": "2018-10-16T14:23:24.785148+00:00",
            "event_source": "server",
            "context": {
                "course_id": "",
                "org_id": "",
                "user_id": 7
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_search_initiated() {
        let raw = discovery_raw("edx.course_discovery.search.initiated");
        let envelope = build_envelope(&raw, &ctx()).unwrap();
        let event = search_initiated(&raw, &ctx(), envelope).unwrap();
        let event = event.as_caliper().unwrap();

        assert_eq!(event.event_type, Some(EventType::Event));
        assert_eq!(event.action, Some(Action::Searched));
        assert_eq!(
            event.object.as_ref().unwrap().extensions.as_ref().unwrap()["search_term"],
            json!("demo")
        );
    }

    #[test]
    fn test_results_displayed_is_a_view() {
        let raw = discovery_raw("edx.course_discovery.search.results_displayed");
        let envelope = build_envelope(&raw, &ctx()).unwrap();
        let event = search_results_displayed(&raw, &ctx(), envelope).unwrap();
        let event = event.as_caliper().unwrap();

        assert_eq!(event.event_type, Some(EventType::ViewEvent));
        assert_eq!(event.action, Some(Action::Viewed));
    }
}
