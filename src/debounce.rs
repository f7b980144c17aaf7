//! Debounced callbacks with trailing or leading invocation.
//!
//! A [`Debounced`] wrapper collapses a burst of calls into a single invocation of the wrapped
//! function. Its state (pending timer, last arguments, leading flag) is held explicitly so it
//! can be inspected and cancelled.

// std
use std::{
	fmt,
	sync::{Mutex, MutexGuard, PoisonError},
};
// crates.io
use tokio::{task::AbortHandle, time};
// self
use crate::{_prelude::*, policy::{DEFAULT_DEBOUNCE_WAIT, DebounceOptions}};

type Callback<A> = Box<dyn Fn(A) + Send + Sync>;

/// Wrap `f` so repeated calls within `wait` collapse into one.
///
/// `None` selects [`DEFAULT_DEBOUNCE_WAIT`].
pub fn debounce<A, F>(f: F, wait: Option<Duration>, options: DebounceOptions) -> Debounced<A>
where
	A: Send + 'static,
	F: Fn(A) + Send + Sync + 'static,
{
	Debounced::new(f, wait.unwrap_or(DEFAULT_DEBOUNCE_WAIT), options)
}

/// Debounced wrapper around a callback taking `A`.
///
/// Clones share the same timer and state.
pub struct Debounced<A> {
	inner: Arc<DebounceInner<A>>,
}
impl<A> Debounced<A>
where
	A: Send + 'static,
{
	/// Build a wrapper with an explicit quiet period.
	pub fn new<F>(f: F, wait: Duration, options: DebounceOptions) -> Self
	where
		F: Fn(A) + Send + Sync + 'static,
	{
		Self {
			inner: Arc::new(DebounceInner {
				callback: Box::new(f),
				wait,
				leading: options.leading,
				state: Mutex::new(DebounceState {
					pending_timer: None,
					pending_args: None,
					leading_fired: false,
					generation: 0,
				}),
			}),
		}
	}

	/// Record a call; the wrapped function runs according to the debounce mode.
	///
	/// Must be called from within a tokio runtime.
	pub fn call(&self, args: A) {
		let fire_now = {
			let mut state = self.inner.lock();

			if let Some(timer) = state.pending_timer.take() {
				timer.abort();
			}

			state.generation = state.generation.wrapping_add(1);

			let generation = state.generation;
			let fire_now = if self.inner.leading {
				if state.leading_fired {
					None
				} else {
					state.leading_fired = true;

					Some(args)
				}
			} else {
				state.pending_args = Some(args);

				None
			};
			let inner = self.inner.clone();
			let task = tokio::spawn(async move {
				time::sleep(inner.wait).await;

				inner.expire(generation);
			});

			state.pending_timer = Some(task.abort_handle());

			tracing::debug!(generation, leading = self.inner.leading, "debounce timer rescheduled");

			fire_now
		};

		if let Some(args) = fire_now {
			(self.inner.callback)(args);
		}
	}

	/// Drop the pending timer and any arguments waiting for a trailing call.
	pub fn cancel(&self) {
		let mut state = self.inner.lock();

		if let Some(timer) = state.pending_timer.take() {
			timer.abort();
		}

		state.generation = state.generation.wrapping_add(1);
		state.pending_args = None;
		state.leading_fired = false;
	}

	/// Whether a quiet-period timer is currently armed.
	pub fn is_pending(&self) -> bool {
		self.inner.lock().pending_timer.is_some()
	}

	/// Whether a leading call already fired in the current quiet window.
	pub fn leading_fired(&self) -> bool {
		self.inner.lock().leading_fired
	}

	/// Configured quiet period.
	pub fn wait(&self) -> Duration {
		self.inner.wait
	}
}
impl<A> Clone for Debounced<A> {
	fn clone(&self) -> Self {
		Self { inner: self.inner.clone() }
	}
}
impl<A> fmt::Debug for Debounced<A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Debounced")
			.field("wait", &self.inner.wait)
			.field("leading", &self.inner.leading)
			.finish_non_exhaustive()
	}
}

struct DebounceInner<A> {
	callback: Callback<A>,
	wait: Duration,
	leading: bool,
	state: Mutex<DebounceState<A>>,
}
impl<A> DebounceInner<A> {
	fn lock(&self) -> MutexGuard<'_, DebounceState<A>> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}

	fn expire(&self, generation: u64) {
		let args = {
			let mut state = self.lock();

			// A newer call rescheduled the timer after this one woke up.
			if state.generation != generation {
				return;
			}

			state.pending_timer = None;
			state.leading_fired = false;
			state.pending_args.take()
		};

		if let Some(args) = args {
			(self.callback)(args);
		}
	}
}

struct DebounceState<A> {
	pending_timer: Option<AbortHandle>,
	pending_args: Option<A>,
	leading_fired: bool,
	generation: u64,
}

#[cfg(test)]
mod tests {
	// crates.io
	use tokio::time::sleep;
	// self
	use super::*;

	type Log = Arc<Mutex<Vec<(Duration, u32)>>>;

	fn recorder(start: Instant) -> (Log, impl Fn(u32) + Send + Sync + 'static) {
		let log = Log::default();
		let sink = log.clone();

		(log, move |value| sink.lock().expect("log").push((start.elapsed(), value)))
	}

	#[tokio::test(start_paused = true)]
	async fn trailing_call_uses_last_arguments_after_quiet_period() {
		let start = Instant::now();
		let (log, f) = recorder(start);
		let debounced = debounce(f, Some(Duration::from_millis(50)), DebounceOptions::default());

		debounced.call(0);
		sleep(Duration::from_millis(10)).await;
		debounced.call(10);
		sleep(Duration::from_millis(10)).await;
		debounced.call(20);

		assert!(debounced.is_pending());

		sleep(Duration::from_millis(100)).await;

		let calls = log.lock().expect("log").clone();

		assert_eq!(calls.len(), 1);
		assert_eq!(calls[0].1, 20);
		assert!(calls[0].0 >= Duration::from_millis(70), "fired early at {:?}", calls[0].0);
		assert!(calls[0].0 < Duration::from_millis(75), "fired late at {:?}", calls[0].0);
		assert!(!debounced.is_pending());
	}

	#[tokio::test(start_paused = true)]
	async fn leading_call_fires_immediately_once_per_burst() {
		let start = Instant::now();
		let (log, f) = recorder(start);
		let debounced =
			debounce(f, Some(Duration::from_millis(50)), DebounceOptions { leading: true });

		debounced.call(0);

		assert_eq!(log.lock().expect("log").len(), 1);
		assert!(debounced.leading_fired());

		sleep(Duration::from_millis(10)).await;
		debounced.call(10);
		sleep(Duration::from_millis(10)).await;
		debounced.call(20);
		sleep(Duration::from_millis(100)).await;

		{
			let calls = log.lock().expect("log");

			assert_eq!(calls.len(), 1);
			assert_eq!(calls[0], (Duration::ZERO, 0));
		}

		assert!(!debounced.leading_fired());

		debounced.call(30);

		assert_eq!(log.lock().expect("log").len(), 2);
	}

	#[tokio::test(start_paused = true)]
	async fn cancel_discards_pending_trailing_call() {
		let (log, f) = recorder(Instant::now());
		let debounced = debounce(f, Some(Duration::from_millis(50)), DebounceOptions::default());

		debounced.call(1);
		debounced.cancel();

		assert!(!debounced.is_pending());

		sleep(Duration::from_millis(200)).await;

		assert!(log.lock().expect("log").is_empty());
	}

	#[tokio::test(start_paused = true)]
	async fn missing_wait_defaults_to_two_hundred_millis() {
		let (log, f) = recorder(Instant::now());
		let debounced = debounce(f, None, DebounceOptions::default());

		assert_eq!(debounced.wait(), DEFAULT_DEBOUNCE_WAIT);

		debounced.clone().call(5);
		sleep(Duration::from_millis(150)).await;

		assert!(log.lock().expect("log").is_empty());

		sleep(Duration::from_millis(100)).await;

		assert_eq!(log.lock().expect("log").len(), 1);
	}
}
