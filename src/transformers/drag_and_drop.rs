//! Drag and drop problem events
//!
//! The item events point both referrer and object at the same page; the
//! feedback popups merge the raw context into the object extensions and move
//! `path` into the extras.

use serde_json::{Map, Value};

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::CaliperResult;
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{merge_raw_context, person_on_web_page, text, Transformed};

fn item_event(
    raw: &RawEvent,
    mut event: CaliperEvent,
    event_type: EventType,
    action: Action,
) -> CaliperResult<Transformed> {
    event.classify(event_type, action);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::AssessmentItem)
            .with_extensions(raw.event.as_received()),
    );
    event.referrer = Some(Entity::new(raw.referer.clone(), EntityType::WebPage));
    event.actor_person(&raw.username);

    merge_raw_context(&mut event, raw)?;
    event.extra().insert("ip".into(), text(&raw.ip));
    event.scrub_session();
    Ok(event.into())
}

/// `edx.drag_and_drop_v2.item.dropped`
pub fn item_dropped(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    item_event(raw, event, EventType::AssessmentItemEvent, Action::Completed)
}

/// `edx.drag_and_drop_v2.item.picked_up`
pub fn item_picked_up(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    item_event(raw, event, EventType::AssessmentItemEvent, Action::Started)
}

/// `edx.drag_and_drop_v2.loaded`
pub fn loaded(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    item_event(raw, event, EventType::ViewEvent, Action::Viewed)
}

fn feedback_event(
    raw: &RawEvent,
    mut event: CaliperEvent,
    event_type: EventType,
    action: Action,
) -> CaliperResult<Transformed> {
    let context = raw.require_context()?;
    let mut extensions: Map<String, Value> = context
        .to_map()
        .into_iter()
        .collect();
    if let Some(details) = raw.details()?.as_object() {
        for (key, value) in details {
            extensions.insert(key.clone(), value.clone());
        }
    }
    let path = extensions.remove("path").unwrap_or(Value::Null);
    extensions.remove("user_id");

    event.classify(event_type, action);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Frame)
            .with_extensions(Value::Object(extensions)),
    );
    person_on_web_page(&mut event, raw);
    event.extra().insert("ip".into(), text(&raw.ip));
    event.extra().insert("path".into(), path);
    event.scrub_session();
    Ok(event.into())
}

/// `edx.drag_and_drop_v2.feedback.opened`
pub fn feedback_opened(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    feedback_event(raw, event, EventType::ViewEvent, Action::Viewed)
}

/// `edx.drag_and_drop_v2.feedback.closed`
pub fn feedback_closed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    feedback_event(raw, event, EventType::Event, Action::Removed)
}
