//! Retry helpers: immediate retries and exponential backoff.

pub mod backoff;
pub mod immediate;

pub use self::{
	backoff::{BackoffExecutor, async_retry},
	immediate::{retry, retry_with_args},
};
