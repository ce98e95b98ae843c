//! # Caliper Tracking
//!
//! Transforms raw learning-platform tracking events into IMS Caliper v1p1
//! analytics events and delivers them to the configured sinks.
//!
//! The pipeline has three stages:
//! - **Envelope**: every event starts as a partial Caliper envelope with a
//!   fresh `urn:uuid:` id, the normalized event time, the actor's profile
//!   link, and the common platform extras
//! - **Transform**: a registry maps each supported `event_type` to a pure
//!   function completing the envelope; page views bypass the registry
//! - **Delivery**: transformed events are written to the `caliper` log
//!   target and optionally posted to an HTTP endpoint and published to a
//!   message broker with bounded retries
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use caliper_tracking::{CaliperConfig, CaliperProcessor, NullResolver};
//!
//! # async fn run(raw: caliper_tracking::RawEvent) -> anyhow::Result<()> {
//! let config = CaliperConfig::new("http://localhost:18000");
//! let processor = CaliperProcessor::connect(&config, Arc::new(NullResolver)).await?;
//! processor.send(&raw).await?;
//! # Ok(())
//! # }
//! ```

pub mod caliper;
pub mod config;
pub mod delivery;
pub mod envelope;
pub mod error;
pub mod identity;
pub mod processor;
pub mod raw;
pub mod registry;
pub mod time;
pub mod transformers;

pub use caliper::{
    Action, CaliperEvent, Entity, EntityType, EventType, Extensions, CALIPER_CONTEXT,
};
pub use config::{BrokerConfig, CaliperConfig, HttpDeliveryConfig, MAXIMUM_RETRIES};
pub use delivery::{BrokerDelivery, BrokerPublisher, HttpDelivery, LogNotifier, Notifier};
pub use error::{CaliperError, CaliperResult};
pub use identity::{IdentityResolver, NullResolver, TransformContext};
pub use processor::CaliperProcessor;
pub use raw::{EventContext, RawEvent};
pub use registry::{transformer_for, EventKind};
pub use transformers::{Transformed, Transformer};
