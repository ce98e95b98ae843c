//! PDF textbook viewer events
//!
//! All fourteen are browser events with a JSON-encoded payload. Viewer
//! navigation lands on the `Document`, toolbar toggles on the viewer itself
//! as a `SoftwareApplication`. Some payloads repeat the event name, which
//! gets dropped.

use serde_json::{Map, Value};

use crate::caliper::{Action, CaliperEvent, Entity, EntityType, EventType};
use crate::error::CaliperResult;
use crate::identity::TransformContext;
use crate::raw::RawEvent;

use super::{person_on_web_page, push_course_and_ip, Transformed};

fn decoded_details(raw: &RawEvent, strip_name: bool) -> CaliperResult<Map<String, Value>> {
    let mut details = raw.details()?.as_object().cloned().unwrap_or_default();
    if strip_name {
        details.remove("name");
    }
    Ok(details)
}

fn viewer_event(
    raw: &RawEvent,
    mut event: CaliperEvent,
    event_type: EventType,
    action: Action,
    entity_type: EntityType,
    strip_name: bool,
) -> CaliperResult<Transformed> {
    let details = decoded_details(raw, strip_name)?;

    person_on_web_page(&mut event, raw);
    push_course_and_ip(&mut event, raw);
    event.classify(event_type, action);
    event.object = Some(
        Entity::new(raw.referer.clone(), entity_type)
            .with_extensions(Value::Object(details)),
    );
    Ok(event.into())
}

/// `textbook.pdf.page.scrolled`
pub fn page_scrolled(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    viewer_event(
        raw,
        event,
        EventType::NavigationEvent,
        Action::NavigatedTo,
        EntityType::Document,
        true,
    )
}

/// `textbook.pdf.search.executed`
pub fn search_executed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    viewer_event(
        raw,
        event,
        EventType::Event,
        Action::Searched,
        EntityType::Document,
        true,
    )
}

/// `textbook.pdf.page.navigated`; only the chapter and page survive into
/// the object extensions
pub fn page_navigated(
    raw: &RawEvent,
    _ctx: &TransformContext,
    mut event: CaliperEvent,
) -> CaliperResult<Transformed> {
    let details = raw.details()?;

    person_on_web_page(&mut event, raw);
    push_course_and_ip(&mut event, raw);
    event.classify(EventType::NavigationEvent, Action::NavigatedTo);
    event.object = Some(
        Entity::new(raw.referer.clone(), EntityType::Document).with_extensions(serde_json::json!({
            "chapter": super::payload_field(&details, "chapter", raw)?,
            "page": super::payload_field(&details, "page", raw)?,
        })),
    );
    Ok(event.into())
}

/// `textbook.pdf.zoom.menu.changed`
pub fn zoom_menu_changed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    viewer_event(
        raw,
        event,
        EventType::Event,
        Action::ChangedSize,
        EntityType::Document,
        false,
    )
}

/// `book`; any navigation within the PDF or PNG viewer
pub fn book(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    viewer_event(
        raw,
        event,
        EventType::NavigationEvent,
        Action::NavigatedTo,
        EntityType::Document,
        false,
    )
}

/// `textbook.pdf.search.navigatednext`
pub fn search_navigated_next(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    viewer_event(
        raw,
        event,
        EventType::NavigationEvent,
        Action::NavigatedTo,
        EntityType::Document,
        false,
    )
}

/// `textbook.pdf.thumbnail.navigated`
pub fn thumbnail_navigated(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    viewer_event(
        raw,
        event,
        EventType::NavigationEvent,
        Action::NavigatedTo,
        EntityType::Document,
        true,
    )
}

/// `textbook.pdf.zoom.buttons.changed`
pub fn zoom_buttons_changed(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    viewer_event(
        raw,
        event,
        EventType::Event,
        Action::ChangedSize,
        EntityType::Document,
        false,
    )
}

/// `textbook.pdf.searchcasesensitivity.toggled`
pub fn search_case_sensitivity_toggled(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    viewer_event(
        raw,
        event,
        EventType::ToolUseEvent,
        Action::Used,
        EntityType::SoftwareApplication,
        false,
    )
}

/// `textbook.pdf.search.highlight.toggled`
pub fn search_highlight_toggled(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    viewer_event(
        raw,
        event,
        EventType::ToolUseEvent,
        Action::Used,
        EntityType::SoftwareApplication,
        false,
    )
}

/// `textbook.pdf.thumbnails.toggled`
pub fn thumbnails_toggled(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    viewer_event(
        raw,
        event,
        EventType::ToolUseEvent,
        Action::Used,
        EntityType::SoftwareApplication,
        true,
    )
}

/// `textbook.pdf.display.scaled`
pub fn display_scaled(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    viewer_event(
        raw,
        event,
        EventType::Event,
        Action::ChangedSize,
        EntityType::Document,
        false,
    )
}

/// `textbook.pdf.outline.toggled`
pub fn outline_toggled(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    viewer_event(
        raw,
        event,
        EventType::ToolUseEvent,
        Action::Used,
        EntityType::SoftwareApplication,
        true,
    )
}

/// `textbook.pdf.chapter.navigated`
pub fn chapter_navigated(
    raw: &RawEvent,
    _ctx: &TransformContext,
    event: CaliperEvent,
) -> CaliperResult<Transformed> {
    viewer_event(
        raw,
        event,
        EventType::NavigationEvent,
        Action::NavigatedTo,
        EntityType::Document,
        false,
    )
}
