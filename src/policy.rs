//! Configuration types, defaults, and validation for the timing primitives.
//!
//! Every struct here deserializes with serde and falls back to the documented defaults for
//! missing fields, so policies can be loaded from configuration files as well as built in code.

// std
use std::cell::RefCell;
// crates.io
use rand::{Rng, SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
// self
use crate::_prelude::*;

thread_local! {
	static SMALL_RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_rng(&mut rand::rng()));
}

/// Quiet period used by [`debounce`](crate::debounce::debounce) when no wait is supplied.
pub const DEFAULT_DEBOUNCE_WAIT: Duration = Duration::from_millis(200);
/// Default interval between two condition evaluations of [`wait_for`](crate::poll::wait_for).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Default attempt budget of [`wait_for`](crate::poll::wait_for).
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 1000;
/// Default base delay for [`async_retry`](crate::retry::async_retry).
pub const DEFAULT_BACKOFF: Duration = Duration::from_millis(2000);
/// Default exponent for [`async_retry`](crate::retry::async_retry).
pub const DEFAULT_BACKOFF_POWER: f64 = 1.25;
/// Countdown used by [`Watchdog`](crate::watchdog::Watchdog) when no timer is supplied.
pub const DEFAULT_WATCHDOG_TIMER: Duration = Duration::from_millis(100);
/// Settle delay used by [`MockFactory`](crate::mock::MockFactory) when none is supplied.
pub const DEFAULT_MOCK_WAIT: Duration = Duration::from_millis(200);

/// Supported jitter strategies for backoff delays.
#[derive(Clone, Debug, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JitterStrategy {
	/// No jitter; the rounded schedule is used as is.
	#[default]
	None,
	/// Randomize the delay between 80% and 100% of the computed backoff.
	Full,
}

/// Exponential backoff configuration for [`async_retry`](crate::retry::async_retry).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackoffPolicy {
	/// Base delay multiplied by the attempt-derived factor.
	#[serde(default = "default_backoff")]
	pub backoff: Duration,
	/// Exponent applied to `attempt + 1`.
	#[serde(default = "default_backoff_power")]
	pub backoff_power: f64,
	/// Strategy used to randomize the computed delay.
	#[serde(default)]
	pub jitter: JitterStrategy,
}
impl BackoffPolicy {
	/// Build a deterministic policy with the given base and exponent.
	pub fn new(backoff: Duration, backoff_power: f64) -> Self {
		Self { backoff, backoff_power, jitter: JitterStrategy::None }
	}

	/// Select a jitter strategy.
	pub fn with_jitter(mut self, jitter: JitterStrategy) -> Self {
		self.jitter = jitter;

		self
	}

	/// Validate invariants for backoff configuration.
	pub fn validate(&self) -> Result<()> {
		if !self.backoff_power.is_finite() {
			return Err(Error::Validation {
				field: "backoff_power",
				reason: "Must be a finite number.".into(),
			});
		}
		if self.backoff_power < 0.0 {
			return Err(Error::Validation {
				field: "backoff_power",
				reason: "Must be greater than or equal to zero.".into(),
			});
		}

		Ok(())
	}

	/// Delay to wait after attempt `attempt` (1-based) failed.
	///
	/// The factor is `(attempt + 1)^backoff_power`, so the first retry already uses
	/// `2^backoff_power`. The product is rounded to whole seconds before being turned back into
	/// a duration.
	pub fn compute_backoff(&self, attempt: u32) -> Duration {
		let millis = self.backoff.as_millis() as f64;
		let factor = (f64::from(attempt) + 1.0).powf(self.backoff_power);
		let secs = (millis * factor / 1000.0).round();

		if !secs.is_finite() || secs <= 0.0 {
			return Duration::ZERO;
		}

		let rounded = Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX);

		self.apply_jitter(rounded)
	}

	fn apply_jitter(&self, rounded: Duration) -> Duration {
		match self.jitter {
			JitterStrategy::None => rounded,
			JitterStrategy::Full => random_within(rounded.mul_f64(0.8), rounded),
		}
	}
}
impl Default for BackoffPolicy {
	fn default() -> Self {
		Self::new(DEFAULT_BACKOFF, DEFAULT_BACKOFF_POWER)
	}
}

/// Mode switches for [`debounce`](crate::debounce::debounce).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebounceOptions {
	/// Fire on the first call of a burst instead of after the quiet period.
	#[serde(default)]
	pub leading: bool,
}

/// Interval and attempt budget for [`wait_for`](crate::poll::wait_for).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitForOptions {
	/// Delay between two condition evaluations.
	#[serde(default = "default_poll_interval")]
	pub interval: Duration,
	/// Number of failed evaluations tolerated after the initial one.
	#[serde(default = "default_poll_max_attempts")]
	pub max_attempts: u32,
}
impl WaitForOptions {
	/// Validate invariants for poll configuration.
	pub fn validate(&self) -> Result<()> {
		if self.interval.is_zero() {
			return Err(Error::Validation {
				field: "interval",
				reason: "Must be greater than zero.".into(),
			});
		}

		Ok(())
	}
}
impl Default for WaitForOptions {
	fn default() -> Self {
		Self { interval: DEFAULT_POLL_INTERVAL, max_attempts: DEFAULT_POLL_MAX_ATTEMPTS }
	}
}

/// Behaviour switches for [`Watchdog`](crate::watchdog::Watchdog).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchdogOptions {
	/// Refuse to re-arm once the watchdog has triggered.
	#[serde(default)]
	pub once: bool,
}

/// Complete watchdog configuration, suitable for loading from files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchdogConfig {
	/// Countdown armed by `start` when no override is supplied.
	#[serde(default = "default_watchdog_timer")]
	pub timer: Duration,
	/// Refuse to re-arm once the watchdog has triggered.
	#[serde(default)]
	pub once: bool,
}
impl Default for WatchdogConfig {
	fn default() -> Self {
		Self { timer: DEFAULT_WATCHDOG_TIMER, once: false }
	}
}

fn random_within(min: Duration, max: Duration) -> Duration {
	if max <= min {
		return max;
	}
	SMALL_RNG.with(|cell| {
		let mut rng = cell.borrow_mut();
		let nanos = max.as_nanos() - min.as_nanos();
		let jitter = rng.random_range(0..=nanos.min(u64::MAX as u128));

		min + Duration::from_nanos(jitter as u64)
	})
}

fn default_backoff() -> Duration {
	DEFAULT_BACKOFF
}

fn default_backoff_power() -> f64 {
	DEFAULT_BACKOFF_POWER
}

fn default_poll_interval() -> Duration {
	DEFAULT_POLL_INTERVAL
}

fn default_poll_max_attempts() -> u32 {
	DEFAULT_POLL_MAX_ATTEMPTS
}

fn default_watchdog_timer() -> Duration {
	DEFAULT_WATCHDOG_TIMER
}
