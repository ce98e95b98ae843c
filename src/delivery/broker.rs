//! Broker delivery with bounded retries
//!
//! Publishing gets an initial attempt plus a configured number of retries
//! with randomized exponential backoff. Exhausted events land on the
//! `caliper_delivery_failure` log target for replay, and the operator is
//! notified through the suppression gate in [`notify`](super::notify).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rand::Rng;
use tracing::{debug, warn};

use crate::caliper::CaliperEvent;
use crate::config::BrokerConfig;
use crate::error::{CaliperError, CaliperResult};

use super::notify::{NotificationGate, Notifier};

/// Publishes serialized events to a message broker subject
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrokerPublisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: Bytes) -> CaliperResult<()>;
}

/// NATS-backed publisher
pub struct NatsPublisher {
    client: async_nats::Client,
}

impl NatsPublisher {
    pub async fn connect(url: &str) -> CaliperResult<Self> {
        let client = async_nats::connect(url)
            .await
            .map_err(|err| CaliperError::Delivery(err.to_string()))?;
        Ok(NatsPublisher { client })
    }
}

#[async_trait]
impl BrokerPublisher for NatsPublisher {
    async fn publish(&self, topic: &str, payload: Bytes) -> CaliperResult<()> {
        self.client
            .publish(topic.to_string(), payload)
            .await
            .map_err(|err| CaliperError::Delivery(err.to_string()))?;
        self.client
            .flush()
            .await
            .map_err(|err| CaliperError::Delivery(err.to_string()))
    }
}

/// Backoff before retry number `attempt` (1-based): `uniform(2, 4) ^ attempt`
/// seconds
fn backoff(attempt: u32) -> Duration {
    let base: f64 = rand::thread_rng().gen_range(2.0..4.0);
    Duration::from_secs_f64(base.powi(attempt as i32))
}

/// Pushes transformed events to the broker, retrying transient failures
pub struct BrokerDelivery {
    publisher: Arc<dyn BrokerPublisher>,
    notifier: Arc<dyn Notifier>,
    gate: NotificationGate,
    topic: String,
    max_retries: u32,
}

impl BrokerDelivery {
    pub fn new(
        config: &BrokerConfig,
        publisher: Arc<dyn BrokerPublisher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        BrokerDelivery {
            publisher,
            notifier,
            gate: NotificationGate::new(),
            topic: config.topic.clone(),
            max_retries: config.max_retries,
        }
    }

    /// Deliver one event, retrying up to `max_retries` times after the
    /// initial attempt
    pub async fn deliver(&self, event_type: &str, event: &CaliperEvent) {
        let payload = match serde_json::to_vec(event) {
            Ok(bytes) => Bytes::from(bytes),
            Err(err) => {
                warn!(event_type = %event_type, error = %err, "event could not be serialized for the broker");
                return;
            }
        };

        let mut last_error = String::new();
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(backoff(attempt)).await;
            }
            match self.publisher.publish(&self.topic, payload.clone()).await {
                Ok(()) => {
                    debug!(event_type = %event_type, topic = %self.topic, "event published to broker");
                    if self.gate.should_report_recovery() {
                        self.notifier.delivery_recovered();
                    }
                    return;
                }
                Err(err) => {
                    warn!(
                        event_type = %event_type,
                        attempt,
                        error = %err,
                        "broker publish failed"
                    );
                    last_error = err.to_string();
                }
            }
        }

        self.record_failure(event_type, event, &last_error);
    }

    /// Retries are exhausted: keep the event replayable and tell an operator
    fn record_failure(&self, event_type: &str, event: &CaliperEvent, error: &str) {
        match serde_json::to_string(event) {
            Ok(line) => {
                tracing::error!(target: "caliper_delivery_failure", event_type = %event_type, "{line}")
            }
            Err(err) => {
                tracing::error!(target: "caliper_delivery_failure", event_type = %event_type, error = %err, "event lost")
            }
        }
        if self.gate.should_report_failure() {
            self.notifier.delivery_failed(error);
        }
    }
}
