//! Video player events
//!
//! Payloads arrive JSON-encoded from the browser player and carry positions
//! as fractional seconds; positions and durations go out as ISO-8601
//! durations.

use serde_json::{json, Map, Value};

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::CaliperResult;
use crate::identity::TransformContext;
use crate::raw::RawEvent;
use crate::time::duration_isoformat;

use super::{person_on_web_page, push_course_and_ip, seconds_field, text, Transformed};

/// `VideoObject` keyed by the referring page, with the player's video code
/// and id tucked into extensions
fn video_object(raw: &RawEvent, details: &Value, duration: f64) -> Entity {
    let mut object = Entity::new(raw.referer.clone(), EntityType::VideoObject);
    object.duration = Some(duration_isoformat(duration));
    object.extensions = Some(json!({
        "code": details.get("code").cloned().unwrap_or(Value::Null),
        "id": details.get("id").cloned().unwrap_or(Value::Null),
    }));
    object
}

/// `MediaLocation` target pointing at the playhead position
fn media_location(raw: &RawEvent, position: f64) -> Entity {
    let mut target = Entity::new(raw.referer.clone(), EntityType::MediaLocation);
    target.current_time = Some(json!(duration_isoformat(position)));
    target
}

/// Finish the common player shape: object + optional target + person/webpage
/// + course/ip extras
fn player_event(
    raw: &RawEvent,
    mut event: CaliperEvent,
    event_type: EventType,
    action: Action,
    position_field: Option<&'static str>,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let duration = seconds_field(&details, "duration", raw)?;

    event.classify(event_type, action);
    event.object = Some(video_object(raw, &details, duration));
    if let Some(field) = position_field {
        let position = seconds_field(&details, field, raw)?;
        event.target = Some(media_location(raw, position));
    }
    person_on_web_page(&mut event, raw);
    push_course_and_ip(&mut event, raw);
    Ok(event.into())
}

/// `play_video`
pub fn play(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    player_event(raw, event, EventType::MediaEvent, Action::Started, Some("currentTime"))
}

/// `pause_video`
pub fn pause(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    player_event(raw, event, EventType::MediaEvent, Action::Paused, Some("currentTime"))
}

/// `stop_video`; the player reached the end of the file
pub fn stop(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    player_event(raw, event, EventType::MediaEvent, Action::Ended, None)
}

/// `load_video`; the video is rendered and ready to play
pub fn load(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    player_event(raw, event, EventType::Event, Action::Retrieved, None)
}

/// `edx.video.closed_captions.shown`
pub fn captions_shown(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    player_event(
        raw,
        event,
        EventType::MediaEvent,
        Action::EnabledClosedCaptioning,
        Some("current_time"),
    )
}

/// `edx.video.closed_captions.hidden`
pub fn captions_hidden(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    player_event(
        raw,
        event,
        EventType::MediaEvent,
        Action::DisabledClosedCaptioning,
        Some("current_time"),
    )
}

/// `show_transcript`
pub fn transcript_shown(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    player_event(
        raw,
        event,
        EventType::MediaEvent,
        Action::EnabledClosedCaptioning,
        Some("current_time"),
    )
}

/// `hide_transcript`
pub fn transcript_hidden(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    player_event(
        raw,
        event,
        EventType::MediaEvent,
        Action::DisabledClosedCaptioning,
        Some("current_time"),
    )
}

/// `speed_change_video`; whatever is left of the payload after lifting the
/// times rides along as object extensions
pub fn speed_changed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let duration = seconds_field(&details, "duration", raw)?;
    let position = seconds_field(&details, "current_time", raw)?;

    event.classify(EventType::MediaEvent, Action::ChangedSpeed);
    person_on_web_page(&mut event, raw);
    push_course_and_ip(&mut event, raw);

    let mut leftover: Map<String, Value> = details.as_object().cloned().unwrap_or_default();
    leftover.remove("duration");
    leftover.remove("current_time");

    let mut object = Entity::new(raw.referer.clone(), EntityType::VideoObject);
    object.duration = Some(duration_isoformat(duration));
    object.extensions = Some(Value::Object(leftover));
    event.object = Some(object);
    event.target = Some(media_location(raw, position));
    Ok(event.into())
}

/// `seek_video`; the old position travels in the target extensions
pub fn seek(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let duration = seconds_field(&details, "duration", raw)?;
    let new_time = seconds_field(&details, "new_time", raw)?;
    let old_time = seconds_field(&details, "old_time", raw)?;

    event.classify(EventType::MediaEvent, Action::JumpedTo);
    let mut object = video_object(raw, &details, duration);
    object.extensions = Some(json!({
        "code": details.get("code").cloned().unwrap_or(Value::Null),
        "id": details.get("id").cloned().unwrap_or(Value::Null),
        "type": details.get("type").cloned().unwrap_or(Value::Null),
    }));
    event.object = Some(object);

    let mut target = media_location(raw, new_time);
    target.extensions = Some(json!({
        "old_time": duration_isoformat(old_time),
    }));
    event.target = Some(target);

    person_on_web_page(&mut event, raw);
    push_course_and_ip(&mut event, raw);
    Ok(event.into())
}

/// The language-menu toggles share one shape: a `Frame` object and the
/// player `name` carried in the extras
fn cc_menu_event(
    raw: &RawEvent,
    mut event: CaliperEvent,
    action: Action,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;
    let duration = seconds_field(&details, "duration", raw)?;

    event.classify(EventType::Event, action);
    let mut object = video_object(raw, &details, duration);
    object.entity_type = Some(EntityType::Frame);
    event.object = Some(object);

    person_on_web_page(&mut event, raw);
    push_course_and_ip(&mut event, raw);
    event.extra().insert("name".into(), text(&raw.name));
    Ok(event.into())
}

/// `video_show_cc_menu`
pub fn cc_menu_shown(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    cc_menu_event(raw, event, Action::Showed)
}

/// `video_hide_cc_menu`
pub fn cc_menu_hidden(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    cc_menu_event(raw, event, Action::Hid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::build_envelope;
    use crate::error::CaliperError;
    use crate::identity::NullResolver;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn ctx() -> TransformContext {
        TransformContext::new("http://localhost:18000", Arc::new(NullResolver))
    }

    fn raw_video(event_type: &str, payload: Value) -> RawEvent {
        serde_json::from_value(json!({
            "event_type": event_type,
            "event": payload.to_string(),
            "username": "honor",
            "referer": "http://localhost:18000/courses/course-v1:edX+DemoX+Demo_Course/courseware/",
            "ip": "127.0.0.1",
            "time": "2018-10-16T14:23:24.785148+00:00",
            "event_source": "browser",
            "context": {
                "course_id": "course-v1:edX+DemoX+Demo_Course",
                "org_id": "edX",
                "user_id": 7,
                "path": "/event"
            }
        }))
        .unwrap()
    }

    fn transform(event_type: &str, payload: Value) -> CaliperEvent {
        let raw = raw_video(event_type, payload);
        let envelope = build_envelope(&raw, &ctx()).unwrap();
        let kind = crate::registry::EventKind::from_event_type(event_type).unwrap();
        match (kind.transformer())(&raw, &ctx(), envelope).unwrap() {
            Transformed::Caliper(event) => *event,
            Transformed::Untransformed(_) => panic!("expected a caliper event"),
        }
    }

    #[test]
    fn test_play_video_becomes_media_started() {
        let event = transform(
            "play_video",
            json!({"id": "video-block-1", "code": "html5", "duration": 120, "currentTime": 5}),
        );

        assert_eq!(event.event_type, Some(EventType::MediaEvent));
        assert_eq!(event.action, Some(Action::Started));

        let object = event.object.as_ref().unwrap();
        assert_eq!(object.entity_type, Some(EntityType::VideoObject));
        assert_eq!(object.duration.as_deref(), Some("PT120S"));

        let target = event.target.as_ref().unwrap();
        assert_eq!(target.entity_type, Some(EntityType::MediaLocation));
        assert_eq!(target.current_time, Some(json!("PT5S")));
    }

    #[test]
    fn test_stop_video_has_no_target() {
        let event = transform(
            "stop_video",
            json!({"id": "video-block-1", "code": "html5", "duration": 300}),
        );
        assert_eq!(event.action, Some(Action::Ended));
        assert!(event.target.is_none());
    }

    #[test]
    fn test_seek_video_carries_old_time_in_target() {
        let event = transform(
            "seek_video",
            json!({
                "id": "video-block-1", "code": "html5", "type": "onSlideSeek",
                "duration": 300, "new_time": 90, "old_time": 30
            }),
        );

        assert_eq!(event.action, Some(Action::JumpedTo));
        let target = event.target.as_ref().unwrap();
        assert_eq!(target.current_time, Some(json!("PT90S")));
        assert_eq!(target.extensions, Some(json!({"old_time": "PT30S"})));
    }

    #[test]
    fn test_speed_change_keeps_leftover_payload_in_object() {
        let event = transform(
            "speed_change_video",
            json!({
                "id": "video-block-1", "code": "html5",
                "duration": 300, "current_time": 45,
                "old_speed": "1.0", "new_speed": "1.5"
            }),
        );

        assert_eq!(event.action, Some(Action::ChangedSpeed));
        let extensions = event.object.as_ref().unwrap().extensions.as_ref().unwrap();
        assert_eq!(extensions["new_speed"], json!("1.5"));
        assert!(extensions.get("duration").is_none());
        assert!(extensions.get("current_time").is_none());
    }

    #[test]
    fn test_cc_menu_events_are_frames_with_name() {
        let mut raw = raw_video(
            "video_show_cc_menu",
            json!({"id": "video-block-1", "code": "html5", "duration": 300}),
        );
        raw.name = Some("video_show_cc_menu".to_string());

        let envelope = build_envelope(&raw, &ctx()).unwrap();
        let transformed = cc_menu_shown(&raw, &ctx(), envelope).unwrap();
        let event = transformed.as_caliper().unwrap();

        assert_eq!(event.action, Some(Action::Showed));
        assert_eq!(
            event.object.as_ref().unwrap().entity_type,
            Some(EntityType::Frame)
        );
        assert_eq!(
            event.extensions.extra_fields["name"],
            json!("video_show_cc_menu")
        );
    }

    #[test]
    fn test_missing_duration_is_a_required_field_error() {
        let raw = raw_video("play_video", json!({"id": "video-block-1", "code": "html5"}));
        let envelope = build_envelope(&raw, &ctx()).unwrap();
        match play(&raw, &ctx(), envelope) {
            Err(CaliperError::MissingRequiredField { field, .. }) => {
                assert_eq!(field, "duration")
            }
            other => panic!("expected MissingRequiredField, got {other:?}"),
        }
    }
}
