//! Async timing toolkit for tokio: debounce, poll-until, retry with backoff, and resettable
//! watchdog timers.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod batch;
pub mod debounce;
#[cfg(feature = "metrics")] pub mod metrics;
pub mod mock;
pub mod policy;
pub mod poll;
pub mod retry;
pub mod timer;
pub mod watchdog;

mod error;
mod _prelude {
	pub use std::{sync::Arc, time::Duration};

	pub use tokio::time::Instant;

	pub use crate::{Error, Result};
}

#[cfg(feature = "prometheus")] pub use crate::metrics::install_default_exporter;
pub use crate::{
	batch::{BatchHandle, chain, execute_getters},
	debounce::{Debounced, debounce},
	error::{Error, Result},
	mock::{MockFactory, MockResponse, mock},
	policy::{
		BackoffPolicy, DebounceOptions, JitterStrategy, WaitForOptions, WatchdogConfig,
		WatchdogOptions,
	},
	poll::{PollHandle, PollStopper, wait_for, wait_for_with},
	retry::{BackoffExecutor, async_retry, retry, retry_with_args},
	timer::{TimerHandle, delay, timeout, wait_time},
	watchdog::Watchdog,
};
