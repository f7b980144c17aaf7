//! Deterministic delayed outcomes for exercising retry logic.

// std
use std::{
	fmt,
	sync::atomic::{AtomicU32, Ordering},
};
// crates.io
use futures_util::{FutureExt, future::BoxFuture};
use tokio::time;
// self
use crate::{_prelude::*, policy::DEFAULT_MOCK_WAIT};

/// Value a mock settles with: either fixed or produced when the mock settles.
pub enum MockResponse<T> {
	/// Fixed value.
	Literal(T),
	/// Producer invoked once per settlement.
	Generator(Arc<dyn Fn() -> T + Send + Sync>),
}
impl<T> MockResponse<T> {
	/// Wrap a producer closure.
	pub fn generator<F>(f: F) -> Self
	where
		F: Fn() -> T + Send + Sync + 'static,
	{
		Self::Generator(Arc::new(f))
	}

	/// Produce the settled value.
	pub fn into_value(self) -> T {
		match self {
			Self::Literal(value) => value,
			Self::Generator(f) => f(),
		}
	}
}
impl<T> Clone for MockResponse<T>
where
	T: Clone,
{
	fn clone(&self) -> Self {
		match self {
			Self::Literal(value) => Self::Literal(value.clone()),
			Self::Generator(f) => Self::Generator(f.clone()),
		}
	}
}
impl<T> fmt::Debug for MockResponse<T>
where
	T: fmt::Debug,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
			Self::Generator(_) => f.write_str("Generator(..)"),
		}
	}
}

/// Settle with `response` after `wait`: `Ok` normally, `Err` when `fail` is set.
pub async fn mock<T>(
	wait: Duration,
	response: MockResponse<T>,
	fail: bool,
) -> std::result::Result<T, T> {
	time::sleep(wait).await;

	let value = response.into_value();

	if fail { Err(value) } else { Ok(value) }
}

/// Produces failing mocks for a fixed number of calls, then succeeding ones.
#[derive(Debug)]
pub struct MockFactory<T, E> {
	on_success: MockResponse<T>,
	on_failure: MockResponse<E>,
	remaining: AtomicU32,
	wait: Duration,
}
impl<T, E> MockFactory<T, E>
where
	T: Clone + Send + 'static,
	E: Clone + Send + 'static,
{
	/// Factory that succeeds immediately after [`DEFAULT_MOCK_WAIT`].
	pub fn new(on_success: MockResponse<T>, on_failure: MockResponse<E>) -> Self {
		Self { on_success, on_failure, remaining: AtomicU32::new(0), wait: DEFAULT_MOCK_WAIT }
	}

	/// Fail the next `countdown` calls before succeeding.
	pub fn with_countdown(self, countdown: u32) -> Self {
		self.remaining.store(countdown, Ordering::SeqCst);

		self
	}

	/// Settle delay of every produced mock.
	pub fn with_wait(mut self, wait: Duration) -> Self {
		self.wait = wait;

		self
	}

	/// Failing calls still ahead.
	pub fn remaining(&self) -> u32 {
		self.remaining.load(Ordering::SeqCst)
	}

	/// Produce the next mock outcome.
	pub fn call(&self) -> BoxFuture<'static, std::result::Result<T, E>> {
		let failing = self
			.remaining
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
			.is_ok();
		let response =
			if failing { Err(self.on_failure.clone()) } else { Ok(self.on_success.clone()) };
		let wait = self.wait;

		async move {
			time::sleep(wait).await;

			match response {
				Ok(success) => Ok(success.into_value()),
				Err(failure) => Err(failure.into_value()),
			}
		}
		.boxed()
	}
}
