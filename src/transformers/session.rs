//! Login and logout events
//!
//! The login payload names the user itself, so the actor is rebuilt from the
//! payload's username rather than the envelope's.

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::CaliperResult;
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{course_id, merge_raw_context, payload_field, person_on_web_page, push_ip, Transformed};

/// `edx.user.login`
pub fn login(
    raw: &RawEvent,
    ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let username = payload_field(&details, "username", raw)?;
    let username_text = username.as_str().unwrap_or_default().to_string();

    event.classify(EventType::SessionEvent, Action::LoggedIn);
    event.object = Some(
        Entity::new(Some(ctx.lms_root_url().to_string()), EntityType::SoftwareApplication)
            .with_extensions(raw.event.as_received()),
    );
    event.referrer_web_page();

    let mut actor = Entity::new(Some(ctx.user_link(&username_text)), EntityType::Person);
    actor.name = Some(username);
    event.actor = actor;

    merge_raw_context(&mut event, raw)?;
    push_ip(&mut event, raw);
    Ok(event.into())
}

/// `edx.user.logout`
pub fn logout(
    raw: &RawEvent,
    ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::SessionEvent, Action::LoggedOut);
    event.object = Some(
        Entity::new(Some(ctx.lms_root_url().to_string()), EntityType::SoftwareApplication)
            .with_extensions(raw.event.as_received()),
    );
    person_on_web_page(&mut event, raw);
    push_ip(&mut event, raw);
    event.extra().insert("course_id".into(), course_id(raw));
    Ok(event.into())
}
