//! IMS Caliper Analytics output model
//!
//! Closed vocabulary enums plus the envelope/entity structs serialized into
//! the emitted JSON. Field order inside `extra_fields` follows insertion
//! order so emitted documents are stable.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::raw::EventContext;

/// JSON-LD context pinned to Caliper v1p1
pub const CALIPER_CONTEXT: &str = "http://purl.imsglobal.org/ctx/caliper/v1p1";

/// Caliper event categories used by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Event,
    NavigationEvent,
    ViewEvent,
    AnnotationEvent,
    AssessmentEvent,
    AssessmentItemEvent,
    AssignableEvent,
    GradeEvent,
    MediaEvent,
    MessageEvent,
    SessionEvent,
    ToolUseEvent,
}

/// Caliper actions (the verbs of the vocabulary)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Abandoned,
    Activated,
    Added,
    Bookmarked,
    ChangedResolution,
    ChangedSize,
    ChangedSpeed,
    Completed,
    Created,
    Deactivated,
    Deleted,
    Described,
    DisabledClosedCaptioning,
    Disliked,
    EnabledClosedCaptioning,
    Ended,
    Graded,
    Hid,
    JumpedTo,
    Liked,
    Linked,
    LoggedIn,
    LoggedOut,
    Modified,
    NavigatedTo,
    Paused,
    Posted,
    Removed,
    Reset,
    Retrieved,
    Searched,
    Shared,
    Showed,
    Started,
    Submitted,
    Used,
    Viewed,
}

/// Caliper entity vocabulary terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Annotation,
    Assessment,
    AssessmentItem,
    AssignableDigitalResource,
    Attempt,
    BookmarkAnnotation,
    CourseOffering,
    CourseSection,
    DigitalResource,
    Document,
    Forum,
    Frame,
    Group,
    ImageObject,
    MediaLocation,
    Membership,
    Message,
    Page,
    Person,
    Result,
    Session,
    SoftwareApplication,
    Thread,
    VideoObject,
    WebPage,
}

/// An entity reference inside a Caliper event (actor, object, target, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entity {
    pub id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(rename = "currentTime", skip_serializing_if = "Option::is_none")]
    pub current_time: Option<Value>,
    #[serde(rename = "dateCreated", skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
    #[serde(rename = "startedAtTime", skip_serializing_if = "Option::is_none")]
    pub started_at_time: Option<String>,
    #[serde(rename = "endedAtTime", skip_serializing_if = "Option::is_none")]
    pub ended_at_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<Box<Entity>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<Box<Entity>>,
    #[serde(rename = "isPartOf", skip_serializing_if = "Option::is_none")]
    pub is_part_of: Option<Box<Entity>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl Entity {
    /// Entity with just an identifier and type
    pub fn new(id: impl Into<Option<String>>, entity_type: EntityType) -> Self {
        Entity {
            id: id.into(),
            entity_type: Some(entity_type),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<Value>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_extensions(mut self, extensions: Value) -> Self {
        self.extensions = Some(extensions);
        self
    }
}

/// Ordered free-form map carried in `extensions.extra_fields`
pub type ExtraFields = IndexMap<String, Value>;

/// Envelope extensions; the platform keeps everything under `extra_fields`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extensions {
    pub extra_fields: ExtraFields,
}

/// A fully-formed Caliper event ready for emission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaliperEvent {
    #[serde(rename = "@context")]
    pub context: String,
    /// `urn:uuid:` identifier, fresh per transformation
    pub id: String,
    #[serde(rename = "eventTime")]
    pub event_time: String,
    pub actor: Entity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<Entity>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Entity>,
    pub extensions: Extensions,
}

impl CaliperEvent {
    /// Assign the event's Caliper category and action
    pub fn classify(&mut self, event_type: EventType, action: Action) {
        self.event_type = Some(event_type);
        self.action = Some(action);
    }

    /// Mutable access to `extensions.extra_fields`
    pub fn extra(&mut self) -> &mut ExtraFields {
        &mut self.extensions.extra_fields
    }

    /// Remove and return an extra field
    pub fn take_extra(&mut self, key: &str) -> Option<Value> {
        self.extensions.extra_fields.shift_remove(key)
    }

    /// Drop the server-side session identifier from the extras
    pub fn scrub_session(&mut self) {
        self.take_extra("session");
    }

    /// Merge the full raw-event context into the extras
    pub fn merge_context(&mut self, context: &EventContext) {
        for (key, value) in context.to_map() {
            self.extensions.extra_fields.insert(key, value);
        }
    }

    /// Type the referrer as a web page, the common case for browser events
    pub fn referrer_web_page(&mut self) {
        if let Some(referrer) = self.referrer.as_mut() {
            referrer.entity_type = Some(EntityType::WebPage);
        }
    }

    /// The referrer URL, if the raw event carried one
    pub fn referrer_id(&self) -> Option<String> {
        self.referrer.as_ref().and_then(|r| r.id.clone())
    }

    /// Name the actor and mark it a person
    pub fn actor_person(&mut self, username: &str) {
        self.actor.entity_type = Some(EntityType::Person);
        self.actor.name = Some(Value::String(username.to_string()));
    }

    /// Replace the actor with the platform itself
    pub fn actor_software_application(&mut self, id: impl Into<String>) {
        self.actor = Entity::new(Some(id.into()), EntityType::SoftwareApplication);
    }
}
