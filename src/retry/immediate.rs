//! Immediate retries without delay between attempts.

// std
use std::future::Future;

/// Run `op` up to `limit_times` times, returning the first success.
///
/// Attempts follow each other without delay. Only the error of the final attempt is returned;
/// earlier errors are dropped. A limit of zero behaves like one.
#[tracing::instrument(skip_all, fields(limit_times = limit_times))]
pub async fn retry<F, Fut, T, E>(mut op: F, limit_times: u32) -> std::result::Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = std::result::Result<T, E>>,
{
	let limit = limit_times.max(1);
	let mut attempt = 1;

	loop {
		match op().await {
			Ok(value) => return Ok(value),
			Err(err) if attempt >= limit => {
				tracing::debug!(attempt, "retry limit reached");

				#[cfg(feature = "metrics")]
				crate::metrics::record_retry_exhausted(crate::metrics::STRATEGY_IMMEDIATE);

				return Err(err);
			},
			Err(_) => {
				tracing::debug!(attempt, limit, "attempt failed, retrying immediately");

				#[cfg(feature = "metrics")]
				crate::metrics::record_retry_attempt(crate::metrics::STRATEGY_IMMEDIATE);

				attempt += 1;
			},
		}
	}
}

/// [`retry`] for operations taking arguments; every attempt receives a clone of `args`.
pub async fn retry_with_args<A, F, Fut, T, E>(
	mut op: F,
	limit_times: u32,
	args: A,
) -> std::result::Result<T, E>
where
	A: Clone,
	F: FnMut(A) -> Fut,
	Fut: Future<Output = std::result::Result<T, E>>,
{
	retry(move || op(args.clone()), limit_times).await
}
