//! Gate metrics recorded through the `metrics` facade.
//!
//! Nothing is exported unless the binary installs a recorder; without one
//! every call is a no-op.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use s3gate_model::S3Action;

use crate::audit::Outcome;

/// Counter of anonymous-gate decisions, labelled by `outcome` and `action`.
pub const PUBLIC_REQUESTS_TOTAL: &str = "s3gate_public_requests_total";

/// Histogram of time spent in the gate per request.
pub const GATE_DURATION_SECONDS: &str = "s3gate_gate_duration_seconds";

/// Records gate decisions when enabled.
#[derive(Debug, Clone, Copy)]
pub struct GateMetrics {
    enabled: bool,
}

impl Default for GateMetrics {
    fn default() -> Self {
        Self::new(true)
    }
}

impl GateMetrics {
    /// Create a recorder handle.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// A handle that records nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(false)
    }

    /// Whether recording is on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Register metric descriptions with the installed recorder.
    pub fn describe() {
        describe_counter!(
            PUBLIC_REQUESTS_TOTAL,
            "Total number of requests evaluated by the public access gate"
        );
        describe_histogram!(
            GATE_DURATION_SECONDS,
            "Time spent authorizing a request in the public access gate"
        );
    }

    /// Count one decision.
    pub fn record(&self, outcome: Outcome, action: Option<S3Action>) {
        if !self.enabled {
            return;
        }
        counter!(
            PUBLIC_REQUESTS_TOTAL,
            "outcome" => outcome.as_str(),
            "action" => action_label(action)
        )
        .increment(1);
    }

    /// Record how long the gate took.
    pub fn record_duration(&self, outcome: Outcome, seconds: f64) {
        if !self.enabled {
            return;
        }
        histogram!(GATE_DURATION_SECONDS, "outcome" => outcome.as_str()).record(seconds);
    }
}

fn action_label(action: Option<S3Action>) -> &'static str {
    action.map_or("none", |a| a.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_label_missing_action() {
        assert_eq!(action_label(None), "none");
        assert_eq!(action_label(Some(S3Action::ListBucket)), "s3:ListBucket");
    }

    #[test]
    fn test_should_record_without_recorder() {
        GateMetrics::describe();
        let metrics = GateMetrics::default();
        assert!(metrics.is_enabled());
        metrics.record(Outcome::Allow, Some(S3Action::GetObject));
        metrics.record_duration(Outcome::Allow, 0.001);
        assert!(!GateMetrics::disabled().is_enabled());
    }

    #[test]
    fn test_should_label_counter_by_outcome_and_action() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            let metrics = GateMetrics::default();
            metrics.record(Outcome::Allow, Some(S3Action::GetObject));
            metrics.record(Outcome::Deny, None);
            GateMetrics::disabled().record(Outcome::Allow, Some(S3Action::GetObject));
        });

        let text = handle.render();
        let line = |outcome: &str, action: &str| {
            text.lines()
                .find(|l| {
                    l.starts_with(PUBLIC_REQUESTS_TOTAL)
                        && l.contains(&format!(r#"outcome="{outcome}""#))
                        && l.contains(&format!(r#"action="{action}""#))
                })
                .map(ToOwned::to_owned)
        };
        assert!(line("allow", "s3:GetObject").is_some_and(|l| l.ends_with(" 1")), "{text}");
        assert!(line("deny", "none").is_some_and(|l| l.ends_with(" 1")), "{text}");
    }
}
