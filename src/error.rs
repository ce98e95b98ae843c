//! Error types for the Caliper transformation pipeline

use thiserror::Error;

/// Errors that can occur while transforming or delivering events
#[derive(Debug, Clone, Error)]
pub enum CaliperError {
    /// No transformer is registered for the raw event type
    #[error("no transformer registered for event type '{0}'")]
    MissingTransformer(String),

    /// A field required by a transformer is absent from the raw event
    #[error("missing required field '{field}' in '{event_type}' event")]
    MissingRequiredField {
        /// Name of the absent field
        field: &'static str,
        /// Raw event type being transformed
        event_type: String,
    },

    /// The embedded event payload is not valid JSON
    #[error("malformed event payload: {0}")]
    MalformedPayload(String),

    /// The raw event carries no context block
    #[error("raw event has no context")]
    MissingContext,

    /// An injected identity lookup could not be resolved
    #[error("identity lookup failed: {0}")]
    IdentityLookup(String),

    /// Required delivery settings are absent or malformed
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A delivery channel failed
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Result type for transformation and delivery operations
pub type CaliperResult<T> = Result<T, CaliperError>;

impl From<serde_json::Error> for CaliperError {
    fn from(err: serde_json::Error) -> Self {
        CaliperError::Serialization(err.to_string())
    }
}

impl CaliperError {
    /// Check if this error leaves the raw event eligible for the generic log
    pub fn is_unmapped(&self) -> bool {
        matches!(self, CaliperError::MissingTransformer(_))
    }

    /// Check if this is a configuration problem (never retried)
    pub fn is_configuration(&self) -> bool {
        matches!(self, CaliperError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = CaliperError::MissingTransformer("custom.event".to_string());
        assert_eq!(
            err.to_string(),
            "no transformer registered for event type 'custom.event'"
        );

        let err = CaliperError::MissingRequiredField {
            field: "referer",
            event_type: "problem_rescore".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "missing required field 'referer' in 'problem_rescore' event"
        );

        let err = CaliperError::MissingContext;
        assert_eq!(err.to_string(), "raw event has no context");
    }

    #[test]
    fn test_serde_json_conversion() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{ bad json }").unwrap_err();
        let err: CaliperError = serde_err.into();
        match err {
            CaliperError::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("expected Serialization"),
        }
    }

    #[test]
    fn test_classification_helpers() {
        assert!(CaliperError::MissingTransformer("x".into()).is_unmapped());
        assert!(!CaliperError::MissingContext.is_unmapped());
        assert!(CaliperError::Configuration("no topic".into()).is_configuration());
    }
}
