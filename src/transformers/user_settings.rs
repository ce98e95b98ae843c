//! Account settings and upsell events

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::CaliperResult;
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{course_id, merge_raw_context, person_on_web_page, push_ip, text, Transformed};

/// `edx.user.settings.viewed`
pub fn viewed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;

    event.classify(EventType::ViewEvent, Action::Viewed);
    event.object =
        Some(Entity::new(raw.referer.clone(), EntityType::WebPage).with_extensions(details));
    person_on_web_page(&mut event, raw);
    event.extra().insert("ip".into(), text(&raw.ip));
    event.extra().insert("course_id".into(), course_id(raw));
    event.take_extra("user_id");
    Ok(event.into())
}

/// `edx.user.settings.changed`; the object is the learner's own profile
pub fn changed(
    raw: &RawEvent,
    ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::Event, Action::Modified);
    event.object = Some(
        Entity::new(Some(ctx.user_link(&raw.username)), EntityType::Person)
            .with_extensions(raw.event.as_received()),
    );
    person_on_web_page(&mut event, raw);
    event.extra().insert("ip".into(), text(&raw.ip));
    event.extra().insert("course_id".into(), course_id(raw));
    Ok(event.into())
}

/// `edx.bi.course.upgrade.sidebarupsell.displayed`
pub fn upgrade_sidebar_displayed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;

    event.classify(EventType::ViewEvent, Action::Viewed);
    event.object =
        Some(Entity::new(raw.referer.clone(), EntityType::Frame).with_extensions(details));
    person_on_web_page(&mut event, raw);
    merge_raw_context(&mut event, raw)?;
    event.scrub_session();
    push_ip(&mut event, raw);
    Ok(event.into())
}
