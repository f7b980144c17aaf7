//! Poll a condition on a fixed interval until it holds or the attempt budget runs out.

// std
use std::sync::atomic::{AtomicBool, Ordering};
// crates.io
use tokio::{
	sync::oneshot,
	task::{AbortHandle, JoinHandle},
	time::{self, MissedTickBehavior},
};
// self
use crate::{_prelude::*, policy::WaitForOptions};

/// Evaluate `condition` now and then every `interval` until it returns `true`.
///
/// The handle settles with `Ok(())` on the first success, or with [`Error::LimitReached`] once
/// `max_attempts + 1` evaluations have failed. A zero `interval` is rejected before anything is
/// scheduled.
///
/// Must be called from within a tokio runtime.
pub fn wait_for<F>(condition: F, interval: Duration, max_attempts: u32) -> Result<PollHandle>
where
	F: FnMut() -> bool + Send + 'static,
{
	wait_for_with(condition, WaitForOptions { interval, max_attempts })
}

/// [`wait_for`] driven by a [`WaitForOptions`] value.
pub fn wait_for_with<F>(mut condition: F, options: WaitForOptions) -> Result<PollHandle>
where
	F: FnMut() -> bool + Send + 'static,
{
	options.validate()?;

	let (tx, rx) = oneshot::channel();
	let task = tokio::spawn(async move {
		let mut ticker = time::interval(options.interval);

		ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

		let mut attempt = 0_u32;

		loop {
			ticker.tick().await;

			if condition() {
				tracing::debug!(attempt, "poll condition satisfied");

				let _ = tx.send(Ok(()));

				return;
			}
			if attempt >= options.max_attempts {
				let attempts = attempt.saturating_add(1);

				tracing::debug!(attempts, "poll budget exhausted");

				#[cfg(feature = "metrics")]
				crate::metrics::record_poll_exhausted();

				let _ = tx.send(Err(Error::LimitReached { attempts }));

				return;
			}

			attempt += 1;
		}
	});
	let stopper =
		PollStopper { stopped: Arc::new(AtomicBool::new(false)), abort: task.abort_handle() };

	Ok(PollHandle { outcome: rx, task, stopper })
}

/// Handle to a running poll returned by [`wait_for`].
#[derive(Debug)]
pub struct PollHandle {
	outcome: oneshot::Receiver<Result<()>>,
	task: JoinHandle<()>,
	stopper: PollStopper,
}
impl PollHandle {
	/// Stop evaluating the condition.
	///
	/// Stopping does not settle the poll: if it had not settled yet, [`PollHandle::wait`] never
	/// completes afterwards.
	pub fn stop(&self) {
		self.stopper.stop();
	}

	/// Cloneable stop switch usable from other tasks.
	pub fn stopper(&self) -> PollStopper {
		self.stopper.clone()
	}

	/// Whether [`PollHandle::stop`] has been called.
	pub fn is_stopped(&self) -> bool {
		self.stopper.is_stopped()
	}

	/// Wait for the poll to settle.
	///
	/// A panic inside the condition surfaces as [`Error::Join`].
	pub async fn wait(self) -> Result<()> {
		let Self { outcome, task, stopper } = self;

		match outcome.await {
			Ok(result) => result,
			Err(_) if stopper.is_stopped() => std::future::pending().await,
			Err(_) => match task.await {
				Err(err) => Err(err.into()),
				Ok(()) => std::future::pending().await,
			},
		}
	}
}

/// Stop switch shared between a [`PollHandle`] and other tasks.
#[derive(Clone, Debug)]
pub struct PollStopper {
	stopped: Arc<AtomicBool>,
	abort: AbortHandle,
}
impl PollStopper {
	/// Stop evaluating the condition; see [`PollHandle::stop`].
	pub fn stop(&self) {
		self.stopped.store(true, Ordering::SeqCst);
		self.abort.abort();
	}

	/// Whether the poll has been stopped.
	pub fn is_stopped(&self) -> bool {
		self.stopped.load(Ordering::SeqCst)
	}
}
