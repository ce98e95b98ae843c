//! Event transformers
//!
//! One module per event family, one function per catalog entry. Every
//! transformer is a pure function completing the partial envelope built by
//! [`crate::envelope::build_envelope`]; none of them mutate the raw event.

pub mod bookmark;
pub mod certificate;
pub mod cohort;
pub mod completion;
pub mod course;
pub mod course_discovery;
pub mod drag_and_drop;
pub mod enrollment;
pub mod exam;
pub mod forum;
pub mod library;
pub mod navigation;
pub mod notes;
pub mod open_response;
pub mod partition;
pub mod peer_instruction;
pub mod problem;
pub mod session;
pub mod team;
pub mod textbook;
pub mod third_party;
pub mod user_settings;
pub mod video;
pub mod xblock;

use serde_json::Value;
use tracing::warn;

use crate::caliper::CaliperEvent;
use crate::error::{CaliperError, CaliperResult};
use crate::identity::TransformContext;
use crate::raw::RawEvent;

/// Outcome of a transformation
#[derive(Debug, Clone)]
pub enum Transformed {
    /// A completed Caliper event
    Caliper(Box<CaliperEvent>),
    /// The raw event handed back untouched; the cause is already logged
    Untransformed(Box<RawEvent>),
}

impl From<CaliperEvent> for Transformed {
    fn from(event: CaliperEvent) -> Self {
        Transformed::Caliper(Box::new(event))
    }
}

impl Transformed {
    pub fn as_caliper(&self) -> Option<&CaliperEvent> {
        match self {
            Transformed::Caliper(event) => Some(event),
            Transformed::Untransformed(_) => None,
        }
    }
}

/// A registered transformer completing the partial envelope
pub type Transformer =
    fn(&RawEvent, &TransformContext, CaliperEvent) -> CaliperResult<Transformed>;

/// JSON value for an optional string field, `null` when absent
pub(crate) fn text(value: &Option<String>) -> Value {
    match value {
        Some(text) => Value::String(text.clone()),
        None => Value::Null,
    }
}

/// The raw `course_id` out of the event context
pub(crate) fn course_id(raw: &RawEvent) -> Value {
    raw.context
        .as_ref()
        .and_then(|c| c.course_id.clone())
        .map(Value::String)
        .unwrap_or(Value::Null)
}

/// Actor becomes the named person, referrer a web page; the shape nearly
/// every browser transformer shares
pub(crate) fn person_on_web_page(event: &mut CaliperEvent, raw: &RawEvent) {
    event.actor_person(&raw.username);
    event.referrer_web_page();
}

/// Append `course_id` and `ip` to the extras
pub(crate) fn push_course_and_ip(event: &mut CaliperEvent, raw: &RawEvent) {
    event.extra().insert("course_id".into(), course_id(raw));
    event.extra().insert("ip".into(), text(&raw.ip));
}

/// Append only `ip` to the extras
pub(crate) fn push_ip(event: &mut CaliperEvent, raw: &RawEvent) {
    event.extra().insert("ip".into(), text(&raw.ip));
}

/// Fold the full raw context into the extras
pub(crate) fn merge_raw_context(event: &mut CaliperEvent, raw: &RawEvent) -> CaliperResult<()> {
    let context = raw.require_context()?;
    event.merge_context(context);
    Ok(())
}

/// A numeric seconds field out of the resolved payload
pub(crate) fn seconds_field(
    details: &Value,
    field: &'static str,
    raw: &RawEvent,
) -> CaliperResult<f64> {
    details
        .get(field)
        .and_then(Value::as_f64)
        .ok_or(CaliperError::MissingRequiredField {
            field,
            event_type: raw.event_type.clone(),
        })
}

/// A required field out of the resolved payload, cloned
pub(crate) fn payload_field(
    details: &Value,
    field: &'static str,
    raw: &RawEvent,
) -> CaliperResult<Value> {
    details
        .get(field)
        .cloned()
        .ok_or(CaliperError::MissingRequiredField {
            field,
            event_type: raw.event_type.clone(),
        })
}

/// Degraded path for transformers that cannot build `object.id`: log the
/// cause and hand the raw event back unchanged
pub(crate) fn untransformed(raw: &RawEvent, field: &'static str) -> Transformed {
    warn!(
        event_type = %raw.event_type,
        "missing '{field}' required for object.id, returning the original event"
    );
    Transformed::Untransformed(Box::new(raw.clone()))
}
