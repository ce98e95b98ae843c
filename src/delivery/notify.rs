//! Operator notifications for delivery failures
//!
//! The original emailed a failure report once per day and a recovery report
//! when delivery resumed. The transport is abstract here; the gate carries
//! the once-per-window and recovery bookkeeping.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{error, info};

/// Failure reports are repeated at most once per this window
pub const REPORT_VALIDITY_PERIOD: Duration = Duration::from_secs(86_400);

/// Delivers failure and recovery reports to an operator
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    /// Report that event delivery keeps failing with the named error
    fn delivery_failed(&self, error_kind: &str);

    /// Report that delivery has recovered after a failure streak
    fn delivery_recovered(&self);
}

/// Default notifier that records the reports in the log stream
#[derive(Debug, Default)]
pub struct LogNotifier {
    recipient: Option<String>,
}

impl LogNotifier {
    pub fn new(recipient: Option<String>) -> Self {
        LogNotifier { recipient }
    }
}

impl Notifier for LogNotifier {
    fn delivery_failed(&self, error_kind: &str) {
        match &self.recipient {
            Some(recipient) => error!(
                recipient = %recipient,
                error = %error_kind,
                "events delivery failure report sent"
            ),
            None => error!(error = %error_kind, "events delivery keeps failing, no report recipient configured"),
        }
    }

    fn delivery_recovered(&self) {
        match &self.recipient {
            Some(recipient) => info!(recipient = %recipient, "events delivery recovery report sent"),
            None => info!("events delivery recovered"),
        }
    }
}

#[derive(Debug, Default)]
struct GateState {
    failure_reported_at: Option<Instant>,
}

/// Check-and-set gate deciding when the notifier may fire
///
/// A failure report opens a suppression window; further failures inside the
/// window stay quiet. The first success after a reported failure emits the
/// recovery report and closes the window.
#[derive(Debug, Default)]
pub struct NotificationGate {
    state: Mutex<GateState>,
}

impl NotificationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a failure report should go out now
    pub fn should_report_failure(&self) -> bool {
        let mut state = self.state.lock().expect("notification gate poisoned");
        match state.failure_reported_at {
            Some(at) if at.elapsed() < REPORT_VALIDITY_PERIOD => false,
            _ => {
                state.failure_reported_at = Some(Instant::now());
                true
            }
        }
    }

    /// Whether a recovery report should go out now; clears the window
    pub fn should_report_recovery(&self) -> bool {
        let mut state = self.state.lock().expect("notification gate poisoned");
        state.failure_reported_at.take().is_some()
    }
}
