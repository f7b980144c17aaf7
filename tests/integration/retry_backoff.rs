//! Integration coverage for retry helpers driven by mock factories.

// std
use std::time::Duration;
// crates.io
use cadence::{BackoffPolicy, MockFactory, MockResponse, async_retry, retry};
use tokio::time::Instant;

fn factory(countdown: u32) -> MockFactory<&'static str, &'static str> {
	MockFactory::new(MockResponse::Literal("OK"), MockResponse::Literal("FAIL"))
		.with_countdown(countdown)
}

#[tokio::test(start_paused = true)]
async fn retry_succeeds_on_the_third_attempt() {
	let _ = tracing_subscriber::fmt::try_init();

	let mocks = factory(2);
	let result = retry(|| mocks.call(), 3).await;

	assert_eq!(result, Ok("OK"));
	assert_eq!(mocks.remaining(), 0);
}

#[tokio::test(start_paused = true)]
async fn retry_surfaces_the_last_failure_when_attempts_run_out() {
	let _ = tracing_subscriber::fmt::try_init();

	let mocks = factory(2);
	let result = retry(|| mocks.call(), 2).await;

	assert_eq!(result, Err("FAIL"));
}

#[tokio::test(start_paused = true)]
async fn retries_run_back_to_back() {
	let mocks = factory(2).with_wait(Duration::from_millis(100));
	let start = Instant::now();

	retry(|| mocks.call(), 3).await.expect("third attempt succeeds");

	// Three mock settlements, nothing in between.
	assert!(start.elapsed() >= Duration::from_millis(300));
	assert!(start.elapsed() < Duration::from_millis(310));
}

#[tokio::test(start_paused = true)]
async fn async_retry_waits_whole_seconds_between_attempts() {
	let _ = tracing_subscriber::fmt::try_init();

	let mocks = factory(2).with_wait(Duration::ZERO);
	let policy = BackoffPolicy::new(Duration::from_millis(1000), 1.0);
	let start = Instant::now();
	let result = async_retry(|| mocks.call(), 3, &policy).await;

	assert_eq!(result, Ok("OK"));
	// round(1000 * 2 / 1000) s after the first failure, round(1000 * 3 / 1000) s after the second.
	assert!(start.elapsed() >= Duration::from_secs(5));
	assert!(start.elapsed() < Duration::from_millis(5020));
}

#[tokio::test(start_paused = true)]
async fn async_retry_gives_up_after_max_attempts_plus_one() {
	let mocks = factory(10).with_wait(Duration::ZERO);
	let policy = BackoffPolicy::new(Duration::from_millis(1000), 1.0);
	let result = async_retry(|| mocks.call(), 2, &policy).await;

	assert_eq!(result, Err("FAIL"));
	assert_eq!(mocks.remaining(), 7);
}
