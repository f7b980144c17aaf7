//! Sequential and chunked execution of async work.

// std
use std::{
	future::Future,
	sync::atomic::{AtomicBool, Ordering},
};
// crates.io
use futures_util::future;
use tokio::task::JoinHandle;
// self
use crate::_prelude::*;

/// Await `futures` one after another and collect their values in order.
///
/// The first error is returned and the remaining futures are never polled.
pub async fn chain<I, Fut, T, E>(futures: I) -> std::result::Result<Vec<T>, E>
where
	I: IntoIterator<Item = Fut>,
	Fut: Future<Output = std::result::Result<T, E>>,
{
	let futures = futures.into_iter();
	let mut results = Vec::with_capacity(futures.size_hint().0);

	for future in futures {
		results.push(future.await?);
	}

	Ok(results)
}

/// Run `getters` in consecutive chunks of `concurrent`, each chunk concurrently.
///
/// A chunk only starts after the previous one completed. [`BatchHandle::stop`] prevents chunks
/// that have not started yet; the handle then yields the values of every started getter.
/// A `concurrent` of zero behaves like one. Must be called from within a tokio runtime.
pub fn execute_getters<G, Fut, T>(getters: Vec<G>, concurrent: usize) -> BatchHandle<T>
where
	G: FnOnce() -> Fut + Send + 'static,
	Fut: Future<Output = T> + Send + 'static,
	T: Send + 'static,
{
	let stopped = Arc::new(AtomicBool::new(false));
	let flag = stopped.clone();
	let chunk_size = concurrent.max(1);
	let task = tokio::spawn(async move {
		let mut results = Vec::with_capacity(getters.len());
		let mut getters = getters.into_iter();

		loop {
			let chunk =
				getters.by_ref().take(chunk_size).map(|getter| getter()).collect::<Vec<_>>();

			if chunk.is_empty() {
				break;
			}

			results.extend(future::join_all(chunk).await);

			if flag.load(Ordering::SeqCst) {
				tracing::debug!(completed = results.len(), "batch stopped");

				break;
			}
		}

		results
	});

	BatchHandle { task, stopped }
}

/// Handle to a batch started by [`execute_getters`].
#[derive(Debug)]
pub struct BatchHandle<T> {
	task: JoinHandle<Vec<T>>,
	stopped: Arc<AtomicBool>,
}
impl<T> BatchHandle<T> {
	/// Do not start further chunks; the running chunk completes.
	pub fn stop(&self) {
		self.stopped.store(true, Ordering::SeqCst);
	}

	/// Whether [`BatchHandle::stop`] has been called.
	pub fn is_stopped(&self) -> bool {
		self.stopped.load(Ordering::SeqCst)
	}

	/// Wait for the batch and collect the values of every started getter.
	pub async fn wait(self) -> Result<Vec<T>> {
		Ok(self.task.await?)
	}
}
