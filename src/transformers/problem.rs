//! Problem (capa) events
//!
//! The grading family mixes browser and server emissions; the rescore and
//! score-override events degrade to the untouched raw event when the referer
//! needed for `object.id` is absent.

use serde_json::{json, Value};

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::CaliperResult;
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{
    course_id, merge_raw_context, payload_field, person_on_web_page, push_course_and_ip,
    push_ip, text, untransformed, Transformed,
};

fn page_as_id(raw: &RawEvent) -> Option<String> {
    raw.page
        .as_ref()
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// `problem_reset`; the learner selected Reset
pub fn reset_clicked(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::AssessmentEvent, Action::Reset);
    event.object = Some(Entity::new(page_as_id(raw), EntityType::Assessment));
    person_on_web_page(&mut event, raw);
    event.extra().insert("course_id".into(), course_id(raw));
    event.extra().insert("event".into(), raw.event.as_received());
    event.extra().insert("ip".into(), text(&raw.ip));
    Ok(event.into())
}

/// `problem_show`; the learner selected Show Answer
pub fn show(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let problem = payload_field(&details, "problem", raw)?;

    event.classify(EventType::ViewEvent, Action::Viewed);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::DigitalResource)
            .with_extensions(json!({ "problem": problem })),
    );
    person_on_web_page(&mut event, raw);
    event.extra().insert("course_id".into(), course_id(raw));
    event.extra().insert("event".into(), raw.event.as_received());
    event.extra().insert("ip".into(), text(&raw.ip));
    Ok(event.into())
}

/// `problem_graded`
pub fn graded(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::GradeEvent, Action::Graded);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Attempt)
            .with_extensions(json!({ "event": raw.event.as_received() })),
    );
    person_on_web_page(&mut event, raw);
    push_course_and_ip(&mut event, raw);
    Ok(event.into())
}

/// `problem_save`; the learner saved an answer without submitting
pub fn save_clicked(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::AssessmentEvent, Action::Paused);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Assessment)
            .with_extensions(json!({ "event": raw.event.as_received() })),
    );
    person_on_web_page(&mut event, raw);
    push_course_and_ip(&mut event, raw);
    Ok(event.into())
}

/// `save_problem_success` (server)
pub fn save_succeeded(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let context = raw.require_context()?;

    event.scrub_session();
    event.classify(EventType::AssessmentEvent, Action::Paused);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Assessment)
            .with_extensions(raw.event.as_received()),
    );
    person_on_web_page(&mut event, raw);
    event.extra().insert("course_id".into(), course_id(raw));
    event
        .extra()
        .insert("asides".into(), context.asides.clone().unwrap_or(Value::Null));
    event.extra().insert(
        "course_user_tags".into(),
        context.course_user_tags.clone().unwrap_or(Value::Null),
    );
    event
        .extra()
        .insert("module".into(), context.module.clone().unwrap_or(Value::Null));
    event.extra().insert("ip".into(), text(&raw.ip));
    Ok(event.into())
}

/// `problem_check`; both the browser GET and the server grading emit it
pub fn check(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::AssessmentEvent, Action::Submitted);
    let mut object = Entity::new(raw.referer.clone(), EntityType::Assessment);

    person_on_web_page(&mut event, raw);
    merge_raw_context(&mut event, raw)?;
    push_ip(&mut event, raw);

    if raw.is_server_sourced() {
        event.scrub_session();
        object.extensions = Some(raw.event.as_received());
    } else {
        object.extensions = Some(json!({ "event": raw.event.as_received() }));
    }
    event.object = Some(object);
    Ok(event.into())
}

/// `problem_check_fail`; same shape as `problem_check`
pub fn check_failed(
    raw: &RawEvent,
    ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    check(raw, ctx, event)
}

/// The two hint-display events share one `Frame`-viewed shape
fn hint_displayed(raw: &RawEvent, mut event: CaliperEvent) -> CaliperResult<Transformed> {
    event.classify(EventType::ViewEvent, Action::Viewed);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Frame)
            .with_extensions(raw.event.as_received()),
    );
    person_on_web_page(&mut event, raw);
    merge_raw_context(&mut event, raw)?;
    event.scrub_session();
    push_ip(&mut event, raw);
    Ok(event.into())
}

/// `edx.problem.hint.demandhint_displayed`
pub fn demand_hint_displayed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    hint_displayed(raw, event)
}

/// `edx.problem.hint.feedback_displayed`
pub fn feedback_displayed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    hint_displayed(raw, event)
}

/// `problem_rescore` (server); the actor is the staff member recorded in the
/// context, not the original submitter
pub fn rescore(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let context = raw.require_context()?;
    if raw.referer.is_none() && context.referer.is_none() {
        return Ok(untransformed(raw, "referer"));
    }

    let mut remaining = context.to_map();
    let context_referer = remaining.shift_remove("referer").unwrap_or(Value::Null);
    let context_username = remaining.shift_remove("username").unwrap_or(Value::Null);

    event.classify(EventType::GradeEvent, Action::Graded);
    event.object = Some(
        Entity::new(
            context_referer.as_str().map(str::to_string),
            EntityType::Attempt,
        )
        .with_extensions(raw.event.as_received()),
    );
    if let Some(referrer) = event.referrer.as_mut() {
        referrer.id = context_referer.as_str().map(str::to_string);
        referrer.entity_type = Some(EntityType::WebPage);
    }
    event.actor.entity_type = Some(EntityType::Person);
    event.actor.name = Some(context_username);

    for (key, value) in remaining {
        event.extra().insert(key, value);
    }
    Ok(event.into())
}

/// `edx.grades.problem.submitted`
pub fn grades_submitted(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::AssessmentEvent, Action::Submitted);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Assessment)
            .with_extensions(raw.event.as_received()),
    );
    person_on_web_page(&mut event, raw);
    merge_raw_context(&mut event, raw)?;
    push_ip(&mut event, raw);
    Ok(event.into())
}

/// `edx.grades.problem.state_deleted`
pub fn state_deleted(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::AssessmentEvent, Action::Reset);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Assessment)
            .with_extensions(raw.event.as_received()),
    );
    person_on_web_page(&mut event, raw);
    merge_raw_context(&mut event, raw)?;
    push_ip(&mut event, raw);
    Ok(event.into())
}

/// `edx.grades.problem.rescored` (server)
pub fn grades_rescored(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    if raw.referer.is_none() {
        return Ok(untransformed(raw, "referer"));
    }

    event.classify(EventType::GradeEvent, Action::Graded);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Attempt)
            .with_extensions(raw.event.as_received()),
    );
    person_on_web_page(&mut event, raw);
    merge_raw_context(&mut event, raw)?;
    push_ip(&mut event, raw);
    Ok(event.into())
}

/// `edx.grades.problem.score_overridden` (server)
pub fn score_overridden(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    if raw.referer.is_none() {
        return Ok(untransformed(raw, "referer"));
    }

    event.classify(EventType::GradeEvent, Action::Graded);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Attempt)
            .with_extensions(raw.event.as_received()),
    );
    person_on_web_page(&mut event, raw);
    merge_raw_context(&mut event, raw)?;
    event.extra().insert("ip".into(), text(&raw.ip));
    event
        .extra()
        .insert("event_source".into(), text(&raw.event_source));
    event.extra().insert("host".into(), text(&raw.host));
    event.extra().insert("session".into(), text(&raw.session));
    event
        .extra()
        .insert("page".into(), raw.page.clone().unwrap_or(Value::Null));
    Ok(event.into())
}

/// `reset_problem` (server)
pub fn reset(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::AssessmentEvent, Action::Reset);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Assessment)
            .with_extensions(raw.event.as_received()),
    );
    person_on_web_page(&mut event, raw);
    merge_raw_context(&mut event, raw)?;
    event
        .extra()
        .insert("event_source".into(), text(&raw.event_source));
    event
        .extra()
        .insert("event_type".into(), json!(raw.event_type));
    event.extra().insert("host".into(), text(&raw.host));
    event.extra().insert("ip".into(), text(&raw.ip));
    event
        .extra()
        .insert("page".into(), raw.page.clone().unwrap_or(Value::Null));
    event.scrub_session();
    Ok(event.into())
}

/// `reset_problem_fail` (server)
pub fn reset_failed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::AssessmentEvent, Action::Reset);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Assessment)
            .with_extensions(raw.event.as_received()),
    );
    person_on_web_page(&mut event, raw);
    merge_raw_context(&mut event, raw)?;
    push_ip(&mut event, raw);
    event.scrub_session();
    Ok(event.into())
}

/// `showanswer` (server)
pub fn answer_shown(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::ViewEvent, Action::Viewed);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Frame)
            .with_extensions(raw.event.as_received()),
    );
    person_on_web_page(&mut event, raw);
    merge_raw_context(&mut event, raw)?;
    push_ip(&mut event, raw);
    event.scrub_session();
    Ok(event.into())
}

/// `save_problem_fail` (server); the platform itself is the actor
pub fn save_failed(
    raw: &RawEvent,
    ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    event.classify(EventType::Event, Action::Abandoned);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::AssessmentItem)
            .with_extensions(raw.event.as_received()),
    );
    event.referrer_web_page();
    event.actor.id = Some(ctx.lms_root_url().to_string());
    event.actor.entity_type = Some(EntityType::SoftwareApplication);
    push_ip(&mut event, raw);
    merge_raw_context(&mut event, raw)?;
    event.scrub_session();
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

    fn server_raw(event_type: &str) -> RawEvent {
        serde_json::from_value(json!({
            "event_type": event_type,
            "event": {"grade": 1, "max_grade": 1, "problem_id": "block-v1:edX+DemoX+problem1"},
            "username": "honor",
            "referer": "http://localhost:18000/courses/course-v1:edX+DemoX+Demo_Course/courseware/",
            "ip": "127.0.0.1",
            "time": "2018-10-16T14:23:24.785148+00:00",
            "session": "a14j3ifhskqw0e2jmwgo",
            "event_source": "server",
            "context": {
                "course_id": "course-v1:edX+DemoX+Demo_Course",
                "org_id": "edX",
                "user_id": 7,
                "path": "/event",
                "username": "staff",
                "referer": "http://localhost:18000/instructor"
            }
        }))
        .unwrap()
    }

    fn transform(raw: &RawEvent, transformer: super::super::Transformer) -> Transformed {
        let envelope = build_envelope(raw, &ctx()).unwrap();
        transformer(raw, &ctx(), envelope).unwrap()
    }

    #[test]
    fn test_server_problem_check_scrubs_session_and_inlines_payload() {
        let raw = server_raw("problem_check");
        let transformed = transform(&raw, check);
        let event = transformed.as_caliper().unwrap();

        assert_eq!(event.event_type, Some(EventType::AssessmentEvent));
        assert_eq!(event.action, Some(Action::Submitted));
        assert!(!event.extensions.extra_fields.contains_key("session"));

        let object = event.object.as_ref().unwrap();
        assert_eq!(object.entity_type, Some(EntityType::Assessment));
        assert_eq!(
            object.extensions.as_ref().unwrap()["problem_id"],
            json!("block-v1:edX+DemoX+problem1")
        );
    }

    #[test]
    fn test_browser_problem_check_keeps_session_and_wraps_payload() {
        let mut raw = server_raw("problem_check");
        raw.event_source = Some("browser".to_string());
        raw.event = serde_json::from_value(json!("{\"answers\": \"choice_1\"}")).unwrap();

        let transformed = transform(&raw, check);
        let event = transformed.as_caliper().unwrap();

        assert!(event.extensions.extra_fields.contains_key("session"));
        let extensions = event.object.as_ref().unwrap().extensions.as_ref().unwrap();
        assert_eq!(extensions["event"], json!("{\"answers\": \"choice_1\"}"));
    }

    #[test]
    fn test_rescore_without_any_referer_returns_raw_event() {
        let mut raw = server_raw("problem_rescore");
        raw.referer = None;
        raw.context.as_mut().unwrap().referer = None;

        match transform(&raw, rescore) {
            Transformed::Untransformed(returned) => {
                assert_eq!(returned.event_type, "problem_rescore")
            }
            Transformed::Caliper(_) => panic!("expected the raw event back"),
        }
    }

    #[test]
    fn test_rescore_uses_context_identity() {
        let raw = server_raw("problem_rescore");
        let transformed = transform(&raw, rescore);
        let event = transformed.as_caliper().unwrap();

        assert_eq!(event.actor.name, Some(json!("staff")));
        assert_eq!(
            event.referrer.as_ref().unwrap().id.as_deref(),
            Some("http://localhost:18000/instructor")
        );
        // the lifted keys stay out of the merged context
        assert!(!event.extensions.extra_fields.contains_key("username"));
        assert!(!event.extensions.extra_fields.contains_key("referer"));
        assert_eq!(event.extensions.extra_fields["org_id"], json!("edX"));
    }

    #[test]
    fn test_score_overridden_without_referer_returns_raw_event() {
        let mut raw = server_raw("edx.grades.problem.score_overridden");
        raw.referer = None;
        assert!(matches!(
            transform(&raw, score_overridden),
            Transformed::Untransformed(_)
        ));
    }

    #[test]
    fn test_save_failed_actor_is_the_platform() {
        let raw = server_raw("save_problem_fail");
        let transformed = transform(&raw, save_failed);
        let event = transformed.as_caliper().unwrap();

        assert_eq!(event.actor.id.as_deref(), Some("http://localhost:18000"));
        assert_eq!(
            event.actor.entity_type,
            Some(EntityType::SoftwareApplication)
        );
        assert_eq!(event.action, Some(Action::Abandoned));
        assert!(!event.extensions.extra_fields.contains_key("session"));
    }

    #[test]
    fn test_reset_clicked_object_is_the_page() {
        let mut raw = server_raw("problem_reset");
        raw.page = Some(json!("http://localhost:18000/courses/page"));
        let transformed = transform(&raw, reset_clicked);
        let event = transformed.as_caliper().unwrap();

        assert_eq!(
            event.object.as_ref().unwrap().id.as_deref(),
            Some("http://localhost:18000/courses/page")
        );
        assert_eq!(event.action, Some(Action::Reset));
    }
}
