//! Certificate generation and sharing events

use serde_json::Value;

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::{CaliperError, CaliperResult};
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{course_id, merge_raw_context, person_on_web_page, text, Transformed};

fn id_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// `edx.certificate.evidence_visited`; an anonymous visitor followed a
/// shared certificate link, so the platform is the actor and there is no
/// referrer
pub fn evidence_visited(
    raw: &RawEvent,
    ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let user_id = id_text(details.get("user_id"));
    let course_id = id_text(details.get("course_id"));

    event.classify(EventType::Event, Action::Showed);
    event.object = Some(
        Entity::new(
            Some(ctx.certificate_url(&user_id, &course_id)),
            EntityType::Document,
        )
        .with_extensions(raw.event.as_received()),
    );
    event.actor_software_application(ctx.lms_root_url());

    event.extra().insert("ip".into(), text(&raw.ip));
    event.extra().insert("referer".into(), text(&raw.referer));
    event.extra().insert("username".into(), Value::String(raw.username.clone()));
    merge_raw_context(&mut event, raw)?;
    event.referrer = None;
    Ok(event.into())
}

/// `edx.certificate.shared`; browser event with a JSON-encoded payload that
/// carries the certificate url
pub fn shared(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let certificate_url = details
        .get("certificate_url")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(CaliperError::MissingRequiredField {
            field: "certificate_url",
            event_type: raw.event_type.clone(),
        })?;

    event.classify(EventType::Event, Action::Shared);
    event.object =
        Some(Entity::new(Some(certificate_url), EntityType::Document).with_extensions(details));
    person_on_web_page(&mut event, raw);
    event.extra().insert("ip".into(), text(&raw.ip));
    event.extra().insert("course_id".into(), course_id(raw));
    Ok(event.into())
}

/// `edx.certificate.created`
pub fn created(
    raw: &RawEvent,
    ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let context = raw.require_context()?;
    let user_id = context
        .user_id
        .as_ref()
        .map(|v| id_text(Some(v)))
        .unwrap_or_default();
    let course = context.course_id.clone().unwrap_or_default();

    event.classify(EventType::Event, Action::Created);
    event.object = Some(
        Entity::new(
            Some(ctx.certificate_url(&user_id, &course)),
            EntityType::Document,
        )
        .with_extensions(raw.event.as_received()),
    );
    event.actor_software_application(ctx.lms_root_url());
    event.referrer_web_page();

    event.extra().insert("ip".into(), text(&raw.ip));
    event.extra().insert("course_id".into(), course_id(raw));
    event.extra().insert(
        "course_user_tags".into(),
        context.course_user_tags.clone().unwrap_or(Value::Null),
    );
    event.extra().insert("username".into(), Value::String(raw.username.clone()));
    Ok(event.into())
}
