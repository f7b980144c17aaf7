//! Counters describing retry, poll, and watchdog activity.

// std
#[cfg(feature = "prometheus")] use std::sync::OnceLock;
// crates.io
use metrics::Label;
#[cfg(feature = "prometheus")]
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use smallvec::SmallVec;
// self
#[cfg(feature = "prometheus")] use crate::_prelude::*;

type LabelSet = SmallVec<[Label; 1]>;

/// Strategy label for [`retry`](crate::retry::retry).
pub const STRATEGY_IMMEDIATE: &str = "immediate";
/// Strategy label for [`async_retry`](crate::retry::async_retry).
pub const STRATEGY_BACKOFF: &str = "backoff";

const METRIC_RETRY_ATTEMPTS: &str = "cadence_retry_attempts_total";
const METRIC_RETRY_EXHAUSTED: &str = "cadence_retry_exhausted_total";
const METRIC_POLL_EXHAUSTED: &str = "cadence_poll_exhausted_total";
const METRIC_WATCHDOG_TRIGGERS: &str = "cadence_watchdog_triggers_total";

/// Shared Prometheus handle installed by [`install_default_exporter`].
#[cfg(feature = "prometheus")]
static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the default Prometheus recorder backed by `metrics`.
///
/// Multiple invocations are safe; subsequent calls become no-ops once the recorder is installed.
#[cfg(feature = "prometheus")]
pub fn install_default_exporter() -> Result<()> {
	if PROMETHEUS_HANDLE.get().is_some() {
		return Ok(());
	}

	let handle = PrometheusBuilder::new()
		.install_recorder()
		.map_err(|err| Error::Metrics(err.to_string()))?;
	let _ = PROMETHEUS_HANDLE.set(handle);

	Ok(())
}

/// Access the global Prometheus exporter handle when installed.
#[cfg(feature = "prometheus")]
pub fn prometheus_handle() -> Option<&'static PrometheusHandle> {
	PROMETHEUS_HANDLE.get()
}

/// Record a failed attempt that will be retried.
pub fn record_retry_attempt(strategy: &'static str) {
	metrics::counter!(METRIC_RETRY_ATTEMPTS, strategy_labels(strategy).iter()).increment(1);
}

/// Record a retry sequence that gave up.
pub fn record_retry_exhausted(strategy: &'static str) {
	metrics::counter!(METRIC_RETRY_EXHAUSTED, strategy_labels(strategy).iter()).increment(1);
}

/// Record a poll that ran out of attempts.
pub fn record_poll_exhausted() {
	metrics::counter!(METRIC_POLL_EXHAUSTED).increment(1);
}

/// Record a watchdog expiry.
pub fn record_watchdog_trigger() {
	metrics::counter!(METRIC_WATCHDOG_TRIGGERS).increment(1);
}

fn strategy_labels(strategy: &'static str) -> LabelSet {
	let mut labels = LabelSet::new();

	labels.push(Label::new("strategy", strategy));

	labels
}
