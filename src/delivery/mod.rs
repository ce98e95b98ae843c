//! Delivery of transformed events
//!
//! Every transformed event is written to the `caliper` log target; the HTTP
//! and broker channels are optional and fail independently of each other.

pub mod broker;
pub mod http;
pub mod notify;

pub use broker::{BrokerDelivery, BrokerPublisher, NatsPublisher};
pub use http::HttpDelivery;
pub use notify::{LogNotifier, NotificationGate, Notifier};

use tracing::error;

use crate::caliper::CaliperEvent;

/// Write the transformed event as a JSON line on the `caliper` target
pub fn log_event(event: &CaliperEvent) {
    match serde_json::to_string(event) {
        Ok(line) => tracing::info!(target: "caliper", "{line}"),
        Err(err) => error!(error = %err, "transformed event could not be serialized"),
    }
}
