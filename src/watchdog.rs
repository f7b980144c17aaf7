//! Resettable countdown that fires a trigger unless it is fed in time.
//!
//! A [`Watchdog`] moves between `idle`, `armed`, and `triggered`. `start` arms a countdown,
//! `cancel` disarms it, and `reset` does both. With `once` enabled, a watchdog that has
//! triggered refuses to arm again, which also turns `reset` into a no-op.

// std
use std::{
	fmt,
	sync::{
		Mutex, MutexGuard, PoisonError,
		atomic::{AtomicBool, AtomicU32, Ordering},
	},
};
// crates.io
use tokio::{task::AbortHandle, time};
// self
use crate::{
	_prelude::*,
	policy::{DEFAULT_WATCHDOG_TIMER, WatchdogConfig, WatchdogOptions},
};

type Trigger = Box<dyn Fn() + Send + Sync>;

/// Watchdog timer handle; clones control the same countdown.
#[derive(Clone)]
pub struct Watchdog {
	inner: Arc<WatchdogInner>,
}
impl Watchdog {
	/// Create an idle watchdog; `None` selects [`DEFAULT_WATCHDOG_TIMER`].
	pub fn new<F>(timer: Option<Duration>, trigger: F, options: WatchdogOptions) -> Self
	where
		F: Fn() + Send + Sync + 'static,
	{
		Self::build(timer, Some(Box::new(trigger) as Trigger), options)
	}

	/// Create an idle watchdog whose expiry only records a failure.
	///
	/// The substituted trigger sets [`Watchdog::failed`], bumps the trigger count a second time
	/// on top of the countdown's own increment, and logs a warning.
	pub fn without_trigger(timer: Option<Duration>, options: WatchdogOptions) -> Self {
		Self::build(timer, None, options)
	}

	/// Create an idle watchdog from a loaded configuration.
	pub fn from_config<F>(config: WatchdogConfig, trigger: F) -> Self
	where
		F: Fn() + Send + Sync + 'static,
	{
		Self::new(Some(config.timer), trigger, WatchdogOptions { once: config.once })
	}

	fn build(timer: Option<Duration>, trigger: Option<Trigger>, options: WatchdogOptions) -> Self {
		Self {
			inner: Arc::new(WatchdogInner {
				timer: timer.unwrap_or(DEFAULT_WATCHDOG_TIMER),
				once: options.once,
				trigger,
				trigger_count: AtomicU32::new(0),
				failed: AtomicBool::new(false),
				countdown: Mutex::new(Countdown { armed: None, generation: 0 }),
			}),
		}
	}

	/// Arm the countdown, replacing any countdown already running.
	///
	/// `None` or a zero duration uses the configured timer. Does nothing when `once` is set and
	/// the watchdog has already triggered. Must be called from within a tokio runtime.
	pub fn start(&self, new_timer: Option<Duration>) {
		if self.inner.once && self.trigger_count() > 0 {
			tracing::debug!("watchdog already triggered once; start ignored");

			return;
		}

		let timer = new_timer.filter(|timer| !timer.is_zero()).unwrap_or(self.inner.timer);
		let mut countdown = self.inner.lock();

		if let Some(armed) = countdown.armed.take() {
			armed.abort();
		}

		countdown.generation = countdown.generation.wrapping_add(1);

		let generation = countdown.generation;
		let inner = self.inner.clone();
		let task = tokio::spawn(async move {
			time::sleep(timer).await;

			inner.fire(generation);
		});

		countdown.armed = Some(task.abort_handle());

		tracing::debug!(?timer, generation, "watchdog armed");
	}

	/// Disarm the countdown if one is running.
	pub fn cancel(&self) {
		let mut countdown = self.inner.lock();

		if let Some(armed) = countdown.armed.take() {
			armed.abort();

			tracing::debug!(generation = countdown.generation, "watchdog cancelled");
		}

		countdown.generation = countdown.generation.wrapping_add(1);
	}

	/// Cancel then start again; the `once` guard of [`Watchdog::start`] still applies.
	pub fn reset(&self, new_timer: Option<Duration>) {
		self.cancel();
		self.start(new_timer);
	}

	/// Number of recorded triggers.
	pub fn trigger_count(&self) -> u32 {
		self.inner.trigger_count.load(Ordering::SeqCst)
	}

	/// Whether the substituted trigger ran because none was supplied.
	pub fn failed(&self) -> bool {
		self.inner.failed.load(Ordering::SeqCst)
	}

	/// Whether a countdown is currently running.
	pub fn is_armed(&self) -> bool {
		self.inner.lock().armed.is_some()
	}

	/// Default countdown length.
	pub fn timer(&self) -> Duration {
		self.inner.timer
	}

	/// Whether the watchdog refuses to re-arm after triggering.
	pub fn once(&self) -> bool {
		self.inner.once
	}
}
impl fmt::Debug for Watchdog {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Watchdog")
			.field("timer", &self.inner.timer)
			.field("once", &self.inner.once)
			.field("trigger_count", &self.trigger_count())
			.field("failed", &self.failed())
			.finish_non_exhaustive()
	}
}

struct WatchdogInner {
	timer: Duration,
	once: bool,
	trigger: Option<Trigger>,
	trigger_count: AtomicU32,
	failed: AtomicBool,
	countdown: Mutex<Countdown>,
}
impl WatchdogInner {
	fn lock(&self) -> MutexGuard<'_, Countdown> {
		self.countdown.lock().unwrap_or_else(PoisonError::into_inner)
	}

	fn fire(&self, generation: u64) {
		{
			let mut countdown = self.lock();

			if countdown.generation != generation {
				return;
			}

			countdown.armed = None;
		}

		let count = self.trigger_count.fetch_add(1, Ordering::SeqCst) + 1;

		tracing::debug!(count, "watchdog expired");

		#[cfg(feature = "metrics")]
		crate::metrics::record_watchdog_trigger();

		match &self.trigger {
			Some(trigger) => trigger(),
			None => {
				self.failed.store(true, Ordering::SeqCst);
				self.trigger_count.fetch_add(1, Ordering::SeqCst);

				tracing::warn!("watchdog expired without a trigger function");
			},
		}
	}
}

struct Countdown {
	armed: Option<AbortHandle>,
	generation: u64,
}
