//! The tracking pipeline entry point
//!
//! `CaliperProcessor` owns the transform context and the delivery channels.
//! `transform` turns one raw event into its Caliper form; `send` also logs
//! the result and fans it out to whichever channels are configured. The
//! channels are independent: an HTTP outage never costs a broker publish.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::CaliperConfig;
use crate::delivery::{
    log_event, BrokerDelivery, BrokerPublisher, HttpDelivery, LogNotifier, NatsPublisher, Notifier,
};
use crate::envelope;
use crate::error::{CaliperError, CaliperResult};
use crate::identity::{IdentityResolver, TransformContext};
use crate::raw::RawEvent;
use crate::registry;
use crate::transformers::Transformed;

pub struct CaliperProcessor {
    ctx: TransformContext,
    http: Option<HttpDelivery>,
    broker: Option<BrokerDelivery>,
}

impl CaliperProcessor {
    /// Build a processor without a broker connection
    ///
    /// Configuration problems surface here, before any event is handled.
    pub fn new(
        config: &CaliperConfig,
        resolver: Arc<dyn IdentityResolver>,
    ) -> CaliperResult<Self> {
        config.validate()?;
        Ok(CaliperProcessor {
            ctx: TransformContext::new(config.lms_root_url.clone(), resolver),
            http: config.http_enabled().map(HttpDelivery::new),
            broker: None,
        })
    }

    /// Build a processor and connect to the broker if one is configured
    pub async fn connect(
        config: &CaliperConfig,
        resolver: Arc<dyn IdentityResolver>,
    ) -> CaliperResult<Self> {
        let mut processor = Self::new(config, resolver)?;
        if let Some(broker) = config.broker_enabled() {
            let publisher = Arc::new(NatsPublisher::connect(&broker.url).await?);
            let notifier = Arc::new(LogNotifier::new(broker.report_recipient.clone()));
            processor.broker = Some(BrokerDelivery::new(broker, publisher, notifier));
        }
        Ok(processor)
    }

    /// Attach a broker channel with an externally built publisher
    pub fn with_broker(
        mut self,
        config: &CaliperConfig,
        publisher: Arc<dyn BrokerPublisher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        if let Some(broker) = config.broker_enabled() {
            self.broker = Some(BrokerDelivery::new(broker, publisher, notifier));
        }
        self
    }

    pub fn context(&self) -> &TransformContext {
        &self.ctx
    }

    /// Transform one raw event
    ///
    /// Page views (`event_type` starting with `/`) bypass the registry; every
    /// other event needs a catalog entry.
    pub fn transform(&self, raw: &RawEvent) -> CaliperResult<Transformed> {
        if raw.event_type.starts_with('/') {
            return Ok(envelope::page_view(raw, &self.ctx)?.into());
        }

        let Some(transformer) = registry::transformer_for(&raw.event_type) else {
            warn!(event_type = %raw.event_type, "no transformer registered");
            return Err(CaliperError::MissingTransformer(raw.event_type.clone()));
        };
        let event = envelope::build_envelope(raw, &self.ctx)?;
        transformer(raw, &self.ctx, event)
    }

    /// Transform one raw event, log it, and push it through every configured
    /// channel
    pub async fn send(&self, raw: &RawEvent) -> CaliperResult<()> {
        let event = match self.transform(raw)? {
            Transformed::Caliper(event) => event,
            Transformed::Untransformed(raw) => {
                debug!(event_type = %raw.event_type, "event passed through untransformed");
                return Ok(());
            }
        };

        log_event(&event);
        let http = async {
            if let Some(http) = &self.http {
                http.deliver(&raw.event_type, &event).await;
            }
        };
        let broker = async {
            if let Some(broker) = &self.broker {
                broker.deliver(&raw.event_type, &event).await;
            }
        };
        futures::join!(http, broker);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caliper::{Action, EventType};
    use crate::config::{BrokerConfig, HttpDeliveryConfig};
    use crate::delivery::broker::MockBrokerPublisher;
    use crate::delivery::notify::MockNotifier;
    use crate::identity::NullResolver;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config() -> CaliperConfig {
        CaliperConfig::new("http://localhost:18000")
    }

    fn processor() -> CaliperProcessor {
        CaliperProcessor::new(&config(), Arc::new(NullResolver)).unwrap()
    }

    fn raw(event_type: &str) -> RawEvent {
        serde_json::from_value(json!({
            "event_type": event_type,
            "event": {},
            "username": "honor",
            "referer": "http://localhost:18000/courses/course-v1:edX+DemoX+Demo_Course/course/",
            "ip": "127.0.0.1",
            "time": "2018-10-16T14:23:24.785148+00:00",
            "event_source": "server",
            "context": {
                "course_id": "course-v1:edX+DemoX+Demo_Course",
                "org_id": "edX",
                "user_id": 7
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_page_views_bypass_the_registry() {
        let transformed = processor()
            .transform(&raw("/courses/course-v1:edX+DemoX+Demo_Course/course/"))
            .unwrap();
        let event = transformed.as_caliper().unwrap();
        assert_eq!(event.event_type, Some(EventType::NavigationEvent));
        assert_eq!(event.action, Some(Action::NavigatedTo));
    }

    #[test]
    fn test_registered_events_are_transformed() {
        let transformed = processor().transform(&raw("edx.bookmark.removed")).unwrap();
        assert!(transformed.as_caliper().is_some());
    }

    #[test]
    fn test_unknown_event_type_is_a_missing_transformer() {
        assert!(matches!(
            processor().transform(&raw("edx.not.a.real.event")),
            Err(CaliperError::MissingTransformer(_))
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected_up_front() {
        let mut cfg = config();
        cfg.http = Some(HttpDeliveryConfig {
            enabled: true,
            endpoint: String::new(),
            auth_token: "token".into(),
        });
        assert!(matches!(
            CaliperProcessor::new(&cfg, Arc::new(NullResolver)),
            Err(CaliperError::Configuration(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_publishes_to_the_broker() {
        let mut cfg = config();
        cfg.broker = Some(BrokerConfig {
            enabled: true,
            url: "nats://localhost:4222".into(),
            topic: "caliper.events".into(),
            max_retries: 3,
            report_recipient: None,
        });

        let mut publisher = MockBrokerPublisher::new();
        publisher
            .expect_publish()
            .times(1)
            .returning(|_, _| Ok(()));
        let mut notifier = MockNotifier::new();
        notifier.expect_delivery_failed().times(0);

        let processor = CaliperProcessor::new(&cfg, Arc::new(NullResolver))
            .unwrap()
            .with_broker(&cfg, Arc::new(publisher), Arc::new(notifier));
        processor.send(&raw("edx.bookmark.removed")).await.unwrap();
    }
}
