//! Course enrollment lifecycle events

use serde_json::{json, Value};

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::{CaliperError, CaliperResult};
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{payload_field, person_on_web_page, push_ip, text, Transformed};

fn required_course_id(raw: &RawEvent) -> CaliperResult<String> {
    raw.context
        .as_ref()
        .and_then(|c| c.course_id.clone())
        .ok_or(CaliperError::MissingRequiredField {
            field: "course_id",
            event_type: raw.event_type.clone(),
        })
}

/// `edx.course.enrollment.activated`; the learner's `user_id` moves out of
/// the extras into the membership extensions
pub fn activated(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let user_id = event.take_extra("user_id").unwrap_or(Value::Null);

    event.classify(EventType::Event, Action::Activated);
    event.object = Some(
        Entity::new(event.referrer_id(), EntityType::Membership).with_extensions(json!({
            "mode": payload_field(&details, "mode", raw)?,
            "course_id": required_course_id(raw)?,
            "user_id": user_id,
        })),
    );
    person_on_web_page(&mut event, raw);
    push_ip(&mut event, raw);
    Ok(event.into())
}

/// `edx.course.enrollment.deactivated`; the membership is anchored at the
/// course about page rather than the referer
pub fn deactivated(
    raw: &RawEvent,
    ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let course_id = required_course_id(raw)?;
    let course_link = format!("{}/courses/{}/about", ctx.lms_root_url(), course_id);

    event.classify(EventType::Event, Action::Deactivated);
    event.object = Some(
        Entity::new(Some(course_link), EntityType::Membership).with_extensions(json!({
            "course_id": course_id,
            "mode": payload_field(&details, "mode", raw)?,
        })),
    );
    person_on_web_page(&mut event, raw);
    push_ip(&mut event, raw);
    Ok(event.into())
}

/// `edx.course.enrollment.mode_changed`
pub fn mode_changed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let org_id = raw
        .context
        .as_ref()
        .and_then(|c| c.org_id.clone())
        .map(Value::String)
        .unwrap_or(Value::Null);

    event.classify(EventType::Event, Action::Modified);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Membership).with_extensions(json!({
            "course_id": required_course_id(raw)?,
            "org_id": org_id,
            "mode": payload_field(&details, "mode", raw)?,
        })),
    );
    person_on_web_page(&mut event, raw);
    push_ip(&mut event, raw);
    Ok(event.into())
}

/// `edx.course.enrollment.upgrade.clicked`; the target page, not the
/// referer, identifies the object
pub fn upgrade_clicked(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let page = raw
        .page
        .as_ref()
        .and_then(Value::as_str)
        .map(str::to_string);

    event.classify(EventType::NavigationEvent, Action::NavigatedTo);
    event.object = Some(Entity::new(page, EntityType::WebPage));
    event.extra().insert("event".into(), raw.event.as_received());
    event.extra().insert("ip".into(), text(&raw.ip));
    event.extra().insert(
        "course_id".into(),
        Value::String(required_course_id(raw)?),
    );
    person_on_web_page(&mut event, raw);
    Ok(event.into())
}

/// `edx.course.enrollment.upgrade.succeeded`; both `user_id` and `org_id`
/// move out of the extras into the membership extensions
pub fn upgrade_succeeded(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let user_id = event.take_extra("user_id").unwrap_or(Value::Null);
    let org_id = event.take_extra("org_id").unwrap_or(Value::Null);

    event.classify(EventType::Event, Action::Modified);
    event.object = Some(
        Entity::new(event.referrer_id(), EntityType::Membership).with_extensions(json!({
            "mode": payload_field(&details, "mode", raw)?,
            "course_id": required_course_id(raw)?,
            "user_id": user_id,
            "org_id": org_id,
        })),
    );
    person_on_web_page(&mut event, raw);
    push_ip(&mut event, raw);
    Ok(event.into())
}
