//! HTTP delivery of transformed events
//!
//! Events go out in a `records` batch keyed by the original event type, with
//! a bearer token. HTTP delivery is fire-and-forget: failures are logged and
//! dropped so one slow endpoint never blocks the pipeline or the broker
//! channel.

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::caliper::{CaliperEvent, CALIPER_CONTEXT};
use crate::config::HttpDeliveryConfig;

/// Wrap an event in the standard Caliper sensor envelope
///
/// Used for certification-style endpoints that expect
/// `{sensor, sendTime, dataVersion, data}` instead of the records batch.
pub fn sensor_envelope(sensor: &str, event: &CaliperEvent) -> Value {
    json!({
        "sensor": sensor,
        "sendTime": Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        "dataVersion": CALIPER_CONTEXT,
        "data": [event],
    })
}

/// Posts transformed events to a configured HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpDelivery {
    client: reqwest::Client,
    endpoint: String,
    auth_token: String,
}

impl HttpDelivery {
    pub fn new(config: &HttpDeliveryConfig) -> Self {
        HttpDelivery {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            auth_token: config.auth_token.clone(),
        }
    }

    /// Body posted for a single event
    fn records_body(event_type: &str, event: &CaliperEvent) -> Value {
        json!({
            "records": [{
                "key": event_type,
                "value": event,
            }]
        })
    }

    /// Post one event; errors are logged, never propagated
    pub async fn deliver(&self, event_type: &str, event: &CaliperEvent) {
        let body = Self::records_body(event_type, event);
        let result = self
            .client
            .post(&self.endpoint)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.auth_token),
            )
            .json(&body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!(event_type = %event_type, "event posted to http endpoint");
            }
            Ok(response) => {
                error!(
                    event_type = %event_type,
                    status = %response.status(),
                    "http endpoint rejected the event"
                );
            }
            Err(err) => {
                error!(event_type = %event_type, error = %err, "could not reach http endpoint");
            }
        }
    }
}
