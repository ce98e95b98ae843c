//! Randomized content library block events
//!
//! Both events are platform initiated, so the actor is the LMS itself and
//! the learner shows up in the extras or the assignment payload.

use serde_json::{json, Value};

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::CaliperResult;
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{merge_raw_context, text, Transformed};

/// `edx.librarycontentblock.content.removed`
pub fn content_removed(
    raw: &RawEvent,
    ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::Event, Action::Deleted);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::AssessmentItem)
            .with_extensions(raw.event.as_received()),
    );
    event.referrer_web_page();
    event.actor_software_application(ctx.lms_root_url());

    merge_raw_context(&mut event, raw)?;
    event.extra().insert("ip".into(), text(&raw.ip));
    event.extra().insert("username".into(), Value::String(raw.username.clone()));
    event.scrub_session();
    Ok(event.into())
}

/// `edx.librarycontentblock.content.assigned`; the learner the content was
/// delivered to rides along inside the assignment payload
pub fn content_assigned(
    raw: &RawEvent,
    ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let context = raw.require_context()?;
    let mut details = raw.details()?.as_object().cloned().unwrap_or_default();
    details.insert(
        "learner".into(),
        json!({
            "id": ctx.user_link(&raw.username),
            "name": raw.username,
            "type": EntityType::Person,
            "user_id": context.user_id.clone().unwrap_or(Value::Null),
        }),
    );

    event.classify(EventType::Event, Action::Linked);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Assessment)
            .with_extensions(Value::Object(details)),
    );
    event.actor_software_application(ctx.lms_root_url());
    event.referrer_web_page();

    event.extra().insert(
        "course_id".into(),
        context.course_id.clone().map(Value::String).unwrap_or(Value::Null),
    );
    event.extra().insert(
        "course_user_tags".into(),
        context.course_user_tags.clone().unwrap_or(Value::Null),
    );
    event.extra().insert("ip".into(), text(&raw.ip));
    event.extra().insert("username".into(), Value::String(raw.username.clone()));
    Ok(event.into())
}
