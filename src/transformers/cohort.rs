//! Cohort management events
//!
//! The cohort page is the instructor dashboard anchored at the cohort
//! management view; membership events resolve the affected learner through
//! the identity resolver.

use serde_json::{json, Value};

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::{CaliperError, CaliperResult};
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{course_id, person_on_web_page, text, Transformed};

fn cohort_page_link(raw: &RawEvent) -> String {
    format!(
        "{}#view-cohort_management",
        raw.referer.as_deref().unwrap_or_default()
    )
}

fn push_cohort_extras(event: &mut CaliperEvent, raw: &RawEvent, with_tags: bool) {
    event.extra().insert("ip".into(), text(&raw.ip));
    event.extra().insert("course_id".into(), course_id(raw));
    if with_tags {
        event.extra().insert(
            "course_user_tags".into(),
            raw.context
                .as_ref()
                .and_then(|c| c.course_user_tags.clone())
                .unwrap_or(Value::Null),
        );
    }
}

/// `Group` entity for the cohort itself
fn cohort_group(raw: &RawEvent, details: &Value) -> Entity {
    let mut group = Entity::new(Some(cohort_page_link(raw)), EntityType::Group);
    group.name = details.get("cohort_name").cloned();
    group.extensions = Some(json!({
        "cohort_id": details.get("cohort_id").cloned().unwrap_or(Value::Null)
    }));
    group
}

/// Membership of the resolved learner in the cohort
fn cohort_membership(
    raw: &RawEvent,
    ctx: &TransformContext,
    details: &Value,
    member_extensions: Value,
) -> CaliperResult<Entity> {
    let user_id = details
        .get("user_id")
        .and_then(Value::as_i64)
        .ok_or(CaliperError::MissingRequiredField {
            field: "user_id",
            event_type: raw.event_type.clone(),
        })?;
    let username = ctx.username_from_id(user_id)?;

    let mut member =
        Entity::new(Some(ctx.user_link(&username)), EntityType::Person).with_name(username);
    member.extensions = Some(member_extensions);

    let mut object = Entity::new(Some(cohort_page_link(raw)), EntityType::Membership);
    object.member = Some(Box::new(member));
    object.organization = Some(Box::new(cohort_group(raw, details)));
    Ok(object)
}

/// `edx.cohort.user_added`
pub fn user_added(
    raw: &RawEvent,
    ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let member_extensions = json!({
        "user_id": details.get("user_id").cloned().unwrap_or(Value::Null)
    });

    event.classify(EventType::Event, Action::Added);
    event.object = Some(cohort_membership(raw, ctx, &details, member_extensions)?);
    person_on_web_page(&mut event, raw);
    push_cohort_extras(&mut event, raw, true);
    Ok(event.into())
}

/// `edx.cohort.user_removed`
pub fn user_removed(
    raw: &RawEvent,
    ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let member_extensions = json!({
        "user_id": details.get("user_id").cloned().unwrap_or(Value::Null)
    });

    event.classify(EventType::Event, Action::Removed);
    event.object = Some(cohort_membership(raw, ctx, &details, member_extensions)?);
    person_on_web_page(&mut event, raw);
    push_cohort_extras(&mut event, raw, true);
    Ok(event.into())
}

/// `edx.cohort.user_add_requested`; the learner's previous cohort rides
/// along in the member extensions
pub fn user_add_requested(
    raw: &RawEvent,
    ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let member_extensions = json!({
        "user_id": details.get("user_id").cloned().unwrap_or(Value::Null),
        "previous_cohort_id": details.get("previous_cohort_id").cloned().unwrap_or(Value::Null),
        "previous_cohort_name": details.get("previous_cohort_name").cloned().unwrap_or(Value::Null),
    });

    event.classify(EventType::Event, Action::Added);
    event.object = Some(cohort_membership(raw, ctx, &details, member_extensions)?);
    person_on_web_page(&mut event, raw);
    push_cohort_extras(&mut event, raw, true);
    Ok(event.into())
}

/// `edx.cohort.created`
pub fn created(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;

    event.classify(EventType::Event, Action::Created);
    event.object = Some(cohort_group(raw, &details));
    person_on_web_page(&mut event, raw);
    push_cohort_extras(&mut event, raw, true);
    Ok(event.into())
}

/// `edx.cohort.creation_requested`
pub fn creation_requested(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;

    event.classify(EventType::Event, Action::Created);
    event.object = Some(cohort_group(raw, &details));
    person_on_web_page(&mut event, raw);
    push_cohort_extras(&mut event, raw, false);
    Ok(event.into())
}
