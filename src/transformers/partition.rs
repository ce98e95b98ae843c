//! Content experiment partition assignment

use serde_json::{json, Value};

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::CaliperResult;
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{course_id, text, Transformed};

/// `xmodule.partitions.assigned_user_to_partition`; the platform links the
/// learner to an experiment group, expressed as a membership whose
/// organization carries the partition payload
pub fn assigned_user_to_partition(
    raw: &RawEvent,
    ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let user_id = event.take_extra("user_id").unwrap_or(Value::Null);

    let mut member = Entity::new(Some(ctx.user_link(&raw.username)), EntityType::Person)
        .with_name(raw.username.clone());
    member.extensions = Some(json!({ "user_id": user_id }));

    let mut organization = Entity::new(raw.referer.clone(), EntityType::Group);
    organization.extensions = Some(raw.event.as_received());

    let mut object = Entity::new(raw.referer.clone(), EntityType::Membership);
    object.member = Some(Box::new(member));
    object.organization = Some(Box::new(organization));

    event.classify(EventType::Event, Action::Linked);
    event.object = Some(object);
    event.actor_software_application(ctx.lms_root_url());
    event.referrer_web_page();

    event.extra().insert("ip".into(), text(&raw.ip));
    event.extra().insert("course_id".into(), course_id(raw));
    event.extra().insert(
        "course_user_tags".into(),
        raw.context
            .as_ref()
            .and_then(|c| c.course_user_tags.clone())
            .unwrap_or(Value::Null),
    );
    Ok(event.into())
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

    #[test]
    fn test_assignment_builds_a_membership_for_the_learner() {
        let raw: RawEvent = serde_json::from_value(json!({
            "event_type": "xmodule.partitions.assigned_user_to_partition",
            "event": {"group_id": 2, "group_name": "Group B", "partition_id": 5},
            "username": "honor",
            "referer": "http://localhost:18000/courses/course-v1:edX+DemoX+Demo_Course/courseware/",
            "ip": "127.0.0.1",
            "time": "2018-10-16T14:23:24.785148+00:00",
            "event_source": "server",
            "context": {
                "course_id": "course-v1:edX+DemoX+Demo_Course",
                "org_id": "edX",
                "user_id": 7,
                "course_user_tags": {"5": "2"}
            }
        }))
        .unwrap();
        let envelope = build_envelope(&raw, &ctx()).unwrap();
        let event = assigned_user_to_partition(&raw, &ctx(), envelope).unwrap();
        let event = event.as_caliper().unwrap();

        assert_eq!(event.action, Some(Action::Linked));
        assert_eq!(event.actor.entity_type, Some(EntityType::SoftwareApplication));

        let object = event.object.as_ref().unwrap();
        let member = object.member.as_ref().unwrap();
        assert_eq!(member.extensions.as_ref().unwrap()["user_id"], json!(7));
        assert!(!event.extensions.extra_fields.contains_key("user_id"));
        assert_eq!(
            object.organization.as_ref().unwrap().extensions.as_ref().unwrap()["group_name"],
            json!("Group B")
        );
    }
}
