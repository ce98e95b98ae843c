//! Discussion forum events

use serde_json::{Map, Value};

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::CaliperResult;
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{course_id, person_on_web_page, text, Transformed};

fn take(details: &mut Map<String, Value>, key: &str) -> Value {
    details.remove(key).unwrap_or(Value::Null)
}

/// ip + course_id + course_user_tags, the extras every forum event carries
fn push_forum_extras(event: &mut CaliperEvent, raw: &RawEvent) {
    let tags = raw
        .context
        .as_ref()
        .and_then(|c| c.course_user_tags.clone())
        .unwrap_or(Value::Null);
    event.extra().insert("ip".into(), text(&raw.ip));
    event.extra().insert("course_id".into(), course_id(raw));
    event.extra().insert("course_user_tags".into(), tags);
}

/// `edx.forum.response.created`
pub fn response_created(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let mut details = raw.details()?.as_object().cloned().unwrap_or_default();
    let body = take(&mut details, "body");

    event.classify(EventType::MessageEvent, Action::Posted);
    let mut object = Entity::new(raw.referer.clone(), EntityType::Message);
    object.body = Some(body);
    object.extensions = Some(Value::Object(details));
    event.object = Some(object);

    person_on_web_page(&mut event, raw);
    event.extra().insert("course_id".into(), course_id(raw));
    event.extra().insert("ip".into(), text(&raw.ip));
    Ok(event.into())
}

/// `edx.forum.thread.created`; the post title becomes the object name
pub fn thread_created(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let mut details = raw.details()?.as_object().cloned().unwrap_or_default();
    let body = take(&mut details, "body");
    let title = take(&mut details, "title");

    event.classify(EventType::MessageEvent, Action::Posted);
    let mut object = Entity::new(raw.referer.clone(), EntityType::Message);
    object.body = Some(body);
    object.name = Some(title);
    object.extensions = Some(Value::Object(details));
    event.object = Some(object);

    person_on_web_page(&mut event, raw);
    push_forum_extras(&mut event, raw);
    Ok(event.into())
}

/// `edx.forum.comment.created`; the url is dropped from the payload
pub fn comment_created(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let mut details = raw.details()?.as_object().cloned().unwrap_or_default();
    details.remove("url");
    let body = take(&mut details, "body");

    event.classify(EventType::MessageEvent, Action::Posted);
    let mut object = Entity::new(raw.referer.clone(), EntityType::Message);
    object.body = Some(body);
    object.extensions = Some(Value::Object(details));
    event.object = Some(object);

    person_on_web_page(&mut event, raw);
    push_forum_extras(&mut event, raw);
    Ok(event.into())
}

/// `edx.forum.thread.viewed`
pub fn thread_viewed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let mut details = raw.details()?.as_object().cloned().unwrap_or_default();
    details.remove("url");
    let title = details.remove("title").unwrap_or_else(|| Value::String(String::new()));

    event.classify(EventType::ViewEvent, Action::Viewed);
    let mut object = Entity::new(raw.referer.clone(), EntityType::Thread);
    object.name = Some(title);
    object.extensions = Some(Value::Object(details));
    event.object = Some(object);

    person_on_web_page(&mut event, raw);
    push_forum_extras(&mut event, raw);
    Ok(event.into())
}

/// `edx.forum.searched`
pub fn searched(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::Event, Action::Searched);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Forum)
            .with_extensions(raw.event.as_received()),
    );
    person_on_web_page(&mut event, raw);
    push_forum_extras(&mut event, raw);
    Ok(event.into())
}

/// The vote icon is a toggle; `vote_value` picks the direction
fn voted(
    raw: &RawEvent,
    mut event: CaliperEvent,
    entity_type: EntityType,
) -> CaliperResult<Transformed> {
    let mut details = raw.details()?.as_object().cloned().unwrap_or_default();
    details.remove("url");
    let action = if details.get("vote_value").and_then(Value::as_str) == Some("up") {
        Action::Liked
    } else {
        Action::Disliked
    };

    event.classify(EventType::Event, action);
    event.object = Some(
        Entity::new(raw.referer.clone(), entity_type)
            .with_extensions(Value::Object(details)),
    );
    person_on_web_page(&mut event, raw);
    push_forum_extras(&mut event, raw);
    Ok(event.into())
}

/// `edx.forum.response.voted`
pub fn response_voted(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    voted(raw, event, EntityType::Message)
}

/// `edx.forum.thread.voted`
pub fn thread_voted(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    voted(raw, event, EntityType::Thread)
}
