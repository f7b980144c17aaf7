//! Retries separated by an exponentially growing, whole-second backoff.

// std
use std::{fmt::Display, future::Future};
// crates.io
use tokio::time;
// self
use crate::{_prelude::*, policy::BackoffPolicy};

/// Tracks the attempt counter and computes the delay before the next attempt.
#[derive(Debug)]
pub struct BackoffExecutor<'a> {
	policy: &'a BackoffPolicy,
	max_attempts: u32,
	attempt: u32,
}
impl<'a> BackoffExecutor<'a> {
	/// Create an executor positioned on attempt 1.
	pub fn new(policy: &'a BackoffPolicy, max_attempts: u32) -> Self {
		Self { policy, max_attempts, attempt: 1 }
	}

	/// Number of the attempt currently running (1-based).
	pub fn attempt(&self) -> u32 {
		self.attempt
	}

	/// Attempts that already failed and were followed by a backoff.
	pub fn attempts_used(&self) -> u32 {
		self.attempt - 1
	}

	/// Whether a failure of the current attempt may still be retried.
	pub fn can_retry(&self) -> bool {
		self.attempt <= self.max_attempts
	}

	/// Advance to the next attempt and return the delay to wait before it.
	pub fn next_backoff(&mut self) -> Option<Duration> {
		if !self.can_retry() {
			tracing::debug!(attempt = self.attempt, "backoff budget exhausted");

			return None;
		}

		let delay = self.policy.compute_backoff(self.attempt);

		self.attempt = self.attempt.saturating_add(1);

		tracing::debug!(next_attempt = self.attempt, ?delay, "backoff computed");

		Some(delay)
	}

	/// Sleep for the next backoff window; returns `false` once the budget is exhausted.
	pub async fn sleep_backoff(&mut self) -> bool {
		match self.next_backoff() {
			Some(delay) => {
				if !delay.is_zero() {
					time::sleep(delay).await;
				}

				true
			},
			None => false,
		}
	}
}

/// Run `op` and retry failures with exponential backoff.
///
/// After attempt `n` fails and `n <= max_attempts`, the delay is
/// `round(backoff_ms * (n + 1)^backoff_power / 1000)` seconds. The failure of attempt
/// `max_attempts + 1` is returned to the caller, so `op` runs at most `max_attempts + 1` times.
#[tracing::instrument(skip_all, fields(max_attempts = max_attempts))]
pub async fn async_retry<F, Fut, T, E>(
	mut op: F,
	max_attempts: u32,
	policy: &BackoffPolicy,
) -> std::result::Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = std::result::Result<T, E>>,
	E: Display,
{
	let mut executor = BackoffExecutor::new(policy, max_attempts);

	loop {
		let err = match op().await {
			Ok(value) => return Ok(value),
			Err(err) => err,
		};
		let attempt = executor.attempt();
		let Some(delay) = executor.next_backoff() else {
			#[cfg(feature = "metrics")]
			crate::metrics::record_retry_exhausted(crate::metrics::STRATEGY_BACKOFF);

			return Err(err);
		};

		tracing::warn!(attempt, ?delay, error = %err, "attempt failed, backing off before retry");

		#[cfg(feature = "metrics")]
		crate::metrics::record_retry_attempt(crate::metrics::STRATEGY_BACKOFF);

		if !delay.is_zero() {
			time::sleep(delay).await;
		}
	}
}
