//! Course team events
//!
//! Membership events resolve the affected learner through the identity
//! resolver and anchor the team URL off the page the event came from.

use serde_json::{json, Value};

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::{CaliperError, CaliperResult};
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{course_id, person_on_web_page, push_course_and_ip, push_ip, text, Transformed};

fn team_id(details: &Value, raw: &RawEvent) -> CaliperResult<String> {
    details
        .get("team_id")
        .and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .ok_or(CaliperError::MissingRequiredField {
            field: "team_id",
            event_type: raw.event_type.clone(),
        })
}

fn learner_user_id(details: &Value, raw: &RawEvent) -> CaliperResult<i64> {
    details
        .get("user_id")
        .and_then(Value::as_i64)
        .ok_or(CaliperError::MissingRequiredField {
            field: "user_id",
            event_type: raw.event_type.clone(),
        })
}

/// Membership object shared by learner_added / learner_removed: the learner
/// as member, the team as organization
fn membership_object(
    raw: &RawEvent,
    ctx: &TransformContext,
    details: &Value,
    object_link: String,
    method_key: &str,
) -> CaliperResult<Entity> {
    let user_id = learner_user_id(details, raw)?;
    let username = ctx.username_from_id(user_id)?;
    let user_link = ctx.user_link(&username);
    let team = team_id(details, raw)?;

    let mut member = Entity::new(Some(user_link), EntityType::Person).with_name(username);
    member.extensions = Some(json!({ "user_id": user_id }));

    let mut organization = Entity::new(Some(object_link.clone()), EntityType::Group);
    organization.extensions = Some(json!({ "team_id": team }));

    let mut object = Entity::new(Some(object_link), EntityType::Membership);
    object.member = Some(Box::new(member));
    object.organization = Some(Box::new(organization));
    object.extensions = Some(json!({
        method_key: details.get(method_key).cloned().unwrap_or(Value::Null)
    }));
    Ok(object)
}

/// `edx.team.page_viewed` (browser)
pub fn page_viewed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;

    event.classify(EventType::ViewEvent, Action::Viewed);
    event.object = Some(
        Entity::new(
            raw.page.as_ref().and_then(Value::as_str).map(str::to_string),
            EntityType::WebPage,
        )
        .with_extensions(details),
    );
    push_ip(&mut event, raw);
    event.extra().insert("course_id".into(), course_id(raw));
    person_on_web_page(&mut event, raw);
    Ok(event.into())
}

/// `edx.team.learner_added`
pub fn learner_added(
    raw: &RawEvent,
    ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let referer = raw.referer.clone().unwrap_or_default();
    let object_link = ctx.team_url(&referer, &team_id(&details, raw)?)?;

    event.classify(EventType::Event, Action::Added);
    event.object = Some(membership_object(raw, ctx, &details, object_link, "add_method")?);
    person_on_web_page(&mut event, raw);
    event.extra().insert("ip".into(), text(&raw.ip));
    event.extra().insert("course_id".into(), course_id(raw));
    Ok(event.into())
}

/// `edx.team.learner_removed`; fires for explicit removal and for team
/// deletion, which removes every member
pub fn learner_removed(
    raw: &RawEvent,
    ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let referer = raw.referer.clone().unwrap_or_default();
    let object_link = if details.get("remove_method").and_then(Value::as_str)
        == Some("team_deleted")
    {
        referer
    } else {
        ctx.team_url(&referer, &team_id(&details, raw)?)?
    };

    event.classify(EventType::Event, Action::Removed);
    event.object = Some(membership_object(
        raw,
        ctx,
        &details,
        object_link,
        "remove_method",
    )?);
    person_on_web_page(&mut event, raw);
    event.extra().insert("ip".into(), text(&raw.ip));
    event.extra().insert("course_id".into(), course_id(raw));
    Ok(event.into())
}

/// `edx.team.deleted`
pub fn deleted(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::Event, Action::Deleted);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Group)
            .with_extensions(raw.event.as_received()),
    );
    person_on_web_page(&mut event, raw);
    push_ip(&mut event, raw);
    event.extra().insert("course_id".into(), course_id(raw));
    Ok(event.into())
}

/// `edx.team.created`
pub fn created(
    raw: &RawEvent,
    ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let referer = raw.referer.clone().unwrap_or_default();
    let team_link = ctx.team_url(&referer, &team_id(&details, raw)?)?;

    event.classify(EventType::Event, Action::Created);
    event.object =
        Some(Entity::new(Some(team_link), EntityType::Group).with_extensions(details));
    person_on_web_page(&mut event, raw);
    push_ip(&mut event, raw);
    event.extra().insert("course_id".into(), course_id(raw));
    Ok(event.into())
}

/// `edx.team.changed`; the course and org ride along in the object, with
/// org_id lifted out of the extras
pub fn changed(
    raw: &RawEvent,
    ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let referer = raw.referer.clone().unwrap_or_default();
    let object_link = ctx.team_url(&referer, &team_id(&details, raw)?)?;

    let org_id = event.take_extra("org_id").unwrap_or(Value::Null);
    let mut extensions = details.as_object().cloned().unwrap_or_default();
    extensions.insert("course_id".into(), course_id(raw));
    extensions.insert("org_id".into(), org_id);

    event.classify(EventType::Event, Action::Modified);
    event.object = Some(
        Entity::new(Some(object_link), EntityType::Group)
            .with_extensions(Value::Object(extensions)),
    );
    person_on_web_page(&mut event, raw);
    push_ip(&mut event, raw);
    Ok(event.into())
}

/// `edx.team.searched`
pub fn searched(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;

    let org_id = event.take_extra("org_id").unwrap_or(Value::Null);
    let mut extensions = details.as_object().cloned().unwrap_or_default();
    extensions.insert("course_id".into(), course_id(raw));
    extensions.insert("org_id".into(), org_id);

    event.classify(EventType::Event, Action::Searched);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Group)
            .with_extensions(Value::Object(extensions)),
    );
    person_on_web_page(&mut event, raw);
    push_ip(&mut event, raw);
    Ok(event.into())
}

/// `edx.team.activity_updated`; discussion activity on the team's forum
pub fn activity_updated(
    raw: &RawEvent,
    ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let referer = raw.referer.clone().unwrap_or_default();
    let team = team_id(&details, raw)?;
    let object_link = ctx.team_url(&referer, &team)?;

    event.classify(EventType::Event, Action::Modified);
    event.object = Some(
        Entity::new(Some(object_link), EntityType::Forum)
            .with_extensions(json!({ "team_id": team })),
    );
    person_on_web_page(&mut event, raw);
    event.extra().insert(
        "course_user_tags".into(),
        raw.context
            .as_ref()
            .and_then(|c| c.course_user_tags.clone())
            .unwrap_or(Value::Null),
    );
    push_ip(&mut event, raw);
    event.extra().insert("course_id".into(), course_id(raw));
    Ok(event.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::build_envelope;
    use crate::identity::IdentityResolver;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    struct TeamResolver;

    impl IdentityResolver for TeamResolver {
        fn username_from_user_id(&self, user_id: i64) -> Option<String> {
            (user_id == 5).then(|| "verified".to_string())
        }

        fn topic_id_from_team_id(&self, team_id: &str) -> Option<String> {
            (team_id == "team-42").then(|| "topic-1".to_string())
        }
    }

    fn ctx() -> TransformContext {
        TransformContext::new("http://localhost:18000", Arc::new(TeamResolver))
    }

    fn team_raw(event_type: &str, payload: Value) -> RawEvent {
        serde_json::from_value(json!({
            "event_type": event_type,
            "event": payload,
            "username": "honor",
            "referer": "http://localhost:18000/courses/course-v1:edX+DemoX+Demo_Course/teams/",
            "ip": "127.0.0.1",
            "time": "2018-10-16T14:23:24.785148+00:00",
            "event_source": "server",
            "context": {
                "course_id": "course-v1:edX+DemoX+Demo_Course",
                "org_id": "edX",
                "user_id": 7
            }
        }))
        .unwrap()
    }

    fn run(raw: &RawEvent, transformer: super::super::Transformer) -> CaliperEvent {
        let envelope = build_envelope(raw, &ctx()).unwrap();
        match transformer(raw, &ctx(), envelope).unwrap() {
            Transformed::Caliper(event) => *event,
            Transformed::Untransformed(_) => panic!("expected a caliper event"),
        }
    }

    #[test]
    fn test_learner_added_builds_membership() {
        let raw = team_raw(
            "edx.team.learner_added",
            json!({"user_id": 5, "team_id": "team-42", "add_method": "joined_from_team_view"}),
        );
        let event = run(&raw, learner_added);

        assert_eq!(event.action, Some(Action::Added));
        let object = event.object.as_ref().unwrap();
        assert_eq!(object.entity_type, Some(EntityType::Membership));
        assert_eq!(
            object.id.as_deref(),
            Some("http://localhost:18000/courses/course-v1:edX+DemoX+Demo_Course/teams/#teams/topic-1/team-42")
        );

        let member = object.member.as_ref().unwrap();
        assert_eq!(member.name, Some(json!("verified")));
        assert_eq!(
            member.id.as_deref(),
            Some("http://localhost:18000/u/verified")
        );

        let organization = object.organization.as_ref().unwrap();
        assert_eq!(organization.entity_type, Some(EntityType::Group));
        assert_eq!(
            object.extensions.as_ref().unwrap()["add_method"],
            json!("joined_from_team_view")
        );
    }

    #[test]
    fn test_learner_removed_on_team_deletion_keeps_referer_link() {
        let raw = team_raw(
            "edx.team.learner_removed",
            json!({"user_id": 5, "team_id": "team-42", "remove_method": "team_deleted"}),
        );
        let event = run(&raw, learner_removed);

        assert_eq!(event.action, Some(Action::Removed));
        assert_eq!(
            event.object.as_ref().unwrap().id.as_deref(),
            raw.referer.as_deref()
        );
    }

    #[test]
    fn test_unresolvable_learner_is_a_lookup_error() {
        let raw = team_raw(
            "edx.team.learner_added",
            json!({"user_id": 99, "team_id": "team-42", "add_method": "joined"}),
        );
        let envelope = build_envelope(&raw, &ctx()).unwrap();
        assert!(matches!(
            learner_added(&raw, &ctx(), envelope),
            Err(CaliperError::IdentityLookup(_))
        ));
    }

    #[test]
    fn test_team_changed_lifts_org_id_into_object() {
        let raw = team_raw(
            "edx.team.changed",
            json!({"team_id": "team-42", "field": "description", "new": "a", "old": "b"}),
        );
        let event = run(&raw, changed);

        assert!(!event.extensions.extra_fields.contains_key("org_id"));
        let extensions = event.object.as_ref().unwrap().extensions.as_ref().unwrap();
        assert_eq!(extensions["org_id"], json!("edX"));
        assert_eq!(
            extensions["course_id"],
            json!("course-v1:edX+DemoX+Demo_Course")
        );
    }

    #[test]
    fn test_activity_updated_points_at_team_forum() {
        let raw = team_raw("edx.team.activity_updated", json!({"team_id": "team-42"}));
        let event = run(&raw, activity_updated);

        let object = event.object.as_ref().unwrap();
        assert_eq!(object.entity_type, Some(EntityType::Forum));
        assert_eq!(
            object.extensions.as_ref().unwrap()["team_id"],
            json!("team-42")
        );
    }
}
