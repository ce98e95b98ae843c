//! Pipeline configuration
//!
//! Delivery channels are opt-in: a missing section or a cleared `enabled`
//! flag disables the channel without touching the others. `validate` runs
//! before any network activity so misconfiguration surfaces as a
//! [`CaliperError::Configuration`] instead of a delivery failure.

use serde::{Deserialize, Serialize};

use crate::error::{CaliperError, CaliperResult};

/// Default number of broker publish retries after the initial attempt
pub const MAXIMUM_RETRIES: u32 = 3;

fn default_max_retries() -> u32 {
    MAXIMUM_RETRIES
}

/// HTTP delivery endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpDeliveryConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub auth_token: String,
}

impl HttpDeliveryConfig {
    pub fn validate(&self) -> CaliperResult<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.endpoint.trim().is_empty() {
            return Err(CaliperError::Configuration(
                "http delivery is enabled but no endpoint is set".into(),
            ));
        }
        if self.auth_token.trim().is_empty() {
            return Err(CaliperError::Configuration(
                "http delivery is enabled but no auth token is set".into(),
            ));
        }
        Ok(())
    }
}

/// Broker delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub enabled: bool,
    /// Broker server address, e.g. `nats://localhost:4222`
    pub url: String,
    /// Subject the transformed events are published to
    pub topic: String,
    /// Retries after the initial publish attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Recipient for delivery failure and recovery reports; empty disables
    /// reporting
    #[serde(default)]
    pub report_recipient: Option<String>,
}

impl BrokerConfig {
    pub fn validate(&self) -> CaliperResult<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.url.trim().is_empty() {
            return Err(CaliperError::Configuration(
                "broker delivery is enabled but no server url is set".into(),
            ));
        }
        if self.topic.trim().is_empty() {
            return Err(CaliperError::Configuration(
                "broker delivery is enabled but no topic is set".into(),
            ));
        }
        Ok(())
    }
}

/// Top-level pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaliperConfig {
    /// Root url of the platform, used for actor and object links
    pub lms_root_url: String,
    #[serde(default)]
    pub http: Option<HttpDeliveryConfig>,
    #[serde(default)]
    pub broker: Option<BrokerConfig>,
}

impl CaliperConfig {
    pub fn new(lms_root_url: impl Into<String>) -> Self {
        CaliperConfig {
            lms_root_url: lms_root_url.into(),
            http: None,
            broker: None,
        }
    }

    pub fn validate(&self) -> CaliperResult<()> {
        if self.lms_root_url.trim().is_empty() {
            return Err(CaliperError::Configuration("lms root url is not set".into()));
        }
        if let Some(http) = &self.http {
            http.validate()?;
        }
        if let Some(broker) = &self.broker {
            broker.validate()?;
        }
        Ok(())
    }

    /// HTTP settings if the channel is switched on
    pub fn http_enabled(&self) -> Option<&HttpDeliveryConfig> {
        self.http.as_ref().filter(|http| http.enabled)
    }

    /// Broker settings if the channel is switched on
    pub fn broker_enabled(&self) -> Option<&BrokerConfig> {
        self.broker.as_ref().filter(|broker| broker.enabled)
    }
}
