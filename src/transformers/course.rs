//! Course home and grading policy events

use serde_json::Value;

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::{CaliperError, CaliperResult};
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{course_id, merge_raw_context, person_on_web_page, push_ip, Transformed};

/// `edx.course.home.resume_course.clicked`; the payload's target url becomes
/// the object, `org_id` moves from the extras into the object extensions
pub fn resume_course_clicked(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let mut extensions = raw.details()?.as_object().cloned().unwrap_or_default();
    let url = extensions
        .remove("url")
        .and_then(|v| v.as_str().map(str::to_string))
        .ok_or(CaliperError::MissingRequiredField {
            field: "url",
            event_type: raw.event_type.clone(),
        })?;
    extensions.insert("course_id".into(), course_id(raw));
    extensions.insert(
        "org_id".into(),
        event.take_extra("org_id").unwrap_or(Value::Null),
    );

    event.classify(EventType::NavigationEvent, Action::NavigatedTo);
    event.object = Some(
        Entity::new(Some(url), EntityType::CourseSection)
            .with_extensions(Value::Object(extensions)),
    );
    person_on_web_page(&mut event, raw);
    push_ip(&mut event, raw);
    Ok(event.into())
}

/// `edx.grades.grading_policy_changed`; Studio-side change to the course
/// grading policy
pub fn grading_policy_changed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;

    event.classify(EventType::Event, Action::Modified);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::CourseOffering)
            .with_extensions(details.clone()),
    );
    person_on_web_page(&mut event, raw);
    merge_raw_context(&mut event, raw)?;
    push_ip(&mut event, raw);
    event.extra().insert(
        "course_id".into(),
        details.get("course_id").cloned().unwrap_or(Value::Null),
    );
    Ok(event.into())
}
