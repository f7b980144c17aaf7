//! Single-shot scheduling primitives shared by the other components.

// std
use std::future::Future;
// crates.io
use tokio::{task::AbortHandle, time};
// self
use crate::_prelude::*;

/// Cancellable handle to a callback scheduled on the tokio timer.
///
/// Dropping the handle does not cancel the callback.
#[derive(Debug)]
pub struct TimerHandle {
	abort: AbortHandle,
}
impl TimerHandle {
	pub(crate) fn new(abort: AbortHandle) -> Self {
		Self { abort }
	}

	/// Prevent the callback from running if it has not started yet.
	pub fn cancel(&self) {
		self.abort.abort();
	}

	/// Whether the callback ran to completion or was cancelled.
	pub fn is_finished(&self) -> bool {
		self.abort.is_finished()
	}
}

/// Invoke `f` once after `wait` has elapsed.
///
/// Must be called from within a tokio runtime.
pub fn delay<F>(f: F, wait: Duration) -> TimerHandle
where
	F: FnOnce() + Send + 'static,
{
	let task = tokio::spawn(async move {
		time::sleep(wait).await;

		f();
	});

	TimerHandle::new(task.abort_handle())
}

/// Suspend the current task for `wait`.
pub async fn wait_time(wait: Duration) {
	time::sleep(wait).await;
}

/// Resolve with the output of `future`, or fail once `limit` elapses first.
///
/// The inner future is dropped on expiry.
pub async fn timeout<F>(future: F, limit: Duration) -> Result<F::Output>
where
	F: Future,
{
	match time::timeout(limit, future).await {
		Ok(output) => Ok(output),
		Err(_) => {
			tracing::debug!(?limit, "future timed out");

			Err(Error::Timeout { after: limit })
		},
	}
}
