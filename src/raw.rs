//! Raw tracking events as emitted by the learning platform
//!
//! Browser-sourced events arrive with their payload JSON-encoded inside a
//! string; server-sourced events carry it inline. `EventPayload` absorbs both
//! shapes at deserialization time and `details()` resolves them to one value.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CaliperError, CaliperResult};

/// The embedded payload of a raw event, either inline JSON or a JSON-encoded
/// string (the browser emitter double-encodes)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventPayload {
    /// Payload arrived as a string holding JSON text
    EncodedJson(String),
    /// Payload arrived as inline JSON
    Inline(Value),
}

impl Default for EventPayload {
    fn default() -> Self {
        EventPayload::Inline(Value::Null)
    }
}

impl EventPayload {
    /// Resolve the payload to a single JSON value, decoding the string form
    pub fn details(&self) -> CaliperResult<Value> {
        match self {
            EventPayload::Inline(value) => Ok(value.clone()),
            EventPayload::EncodedJson(text) => serde_json::from_str(text)
                .map_err(|e| CaliperError::MalformedPayload(e.to_string())),
        }
    }

    /// The payload exactly as it arrived (string form stays a string)
    pub fn as_received(&self) -> Value {
        match self {
            EventPayload::Inline(value) => value.clone(),
            EventPayload::EncodedJson(text) => Value::String(text.clone()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, EventPayload::Inline(Value::Null))
    }
}

/// Per-request context attached to a raw event by the platform
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventContext {
    #[serde(default)]
    pub course_id: Option<String>,
    /// Numeric for registered users, occasionally a string or null
    #[serde(default)]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub org_id: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub referer: Option<String>,
    #[serde(default)]
    pub module: Option<Value>,
    #[serde(default)]
    pub asides: Option<Value>,
    #[serde(default)]
    pub course_user_tags: Option<Value>,
    /// Anything else the platform attached
    #[serde(flatten)]
    pub rest: IndexMap<String, Value>,
}

impl EventContext {
    /// Flatten the context into an ordered map for merging into
    /// `extensions.extra_fields`
    pub fn to_map(&self) -> IndexMap<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(fields)) => fields.into_iter().collect(),
            _ => IndexMap::new(),
        }
    }
}

/// A raw tracking event, straight off the platform's tracking pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEvent {
    pub event_type: String,
    #[serde(default)]
    pub event: EventPayload,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub referer: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub page: Option<Value>,
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default)]
    pub event_source: Option<String>,
    #[serde(default)]
    pub accept_language: Option<String>,
    /// Set by a handful of browser events (closed-caption menu toggles)
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub context: Option<EventContext>,
    /// Fields the platform added that the pipeline does not model
    #[serde(flatten)]
    pub rest: IndexMap<String, Value>,
}

impl RawEvent {
    /// The resolved payload, decoding browser-encoded JSON once
    pub fn details(&self) -> CaliperResult<Value> {
        self.event.details()
    }

    /// The event context, which every registered transformer requires
    pub fn require_context(&self) -> CaliperResult<&EventContext> {
        self.context.as_ref().ok_or(CaliperError::MissingContext)
    }

    /// Whether the event originated on the platform servers rather than in
    /// the learner's browser
    pub fn is_server_sourced(&self) -> bool {
        self.event_source.as_deref() == Some("server")
    }
}
