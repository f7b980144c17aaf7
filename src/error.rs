//! Crate-wide error types and `Result` alias.

// self
use crate::_prelude::*;

/// Library-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the timing toolkit.
///
/// Errors produced by user operations passed to [`retry`](crate::retry::retry) and friends are
/// never wrapped in this type; they are returned to the caller untouched.
#[allow(missing_docs)]
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Join(#[from] tokio::task::JoinError),

	#[error("Poll budget exhausted after {attempts} attempts.")]
	LimitReached { attempts: u32 },
	#[cfg(feature = "metrics")]
	#[error("Metrics error: {0}")]
	Metrics(String),
	#[error("Operation timed out after {after:?}.")]
	Timeout { after: Duration },
	#[error("Validation failed for {field}: {reason}")]
	Validation { field: &'static str, reason: String },
}
#[cfg(feature = "metrics")]
impl<T> From<metrics::SetRecorderError<T>> for Error
where
	T: std::fmt::Display,
{
	fn from(value: metrics::SetRecorderError<T>) -> Self {
		Self::Metrics(value.to_string())
	}
}
