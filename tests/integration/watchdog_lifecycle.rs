//! Integration coverage for watchdog, debounce, and poll lifecycles working together.

// std
use std::{
	sync::{
		Arc,
		atomic::{AtomicU32, Ordering},
	},
	time::Duration,
};
// crates.io
use cadence::{
	DebounceOptions, Error, Watchdog, WatchdogConfig, WatchdogOptions, debounce, wait_for,
};
use tokio::time::sleep;

fn counter() -> (Arc<AtomicU32>, impl Fn() + Send + Sync + 'static) {
	let count = Arc::new(AtomicU32::new(0));
	let handle = count.clone();

	(count, move || {
		handle.fetch_add(1, Ordering::SeqCst);
	})
}

#[tokio::test(start_paused = true)]
async fn once_watchdog_triggers_a_single_time() {
	let _ = tracing_subscriber::fmt::try_init();

	let (fired, trigger) = counter();
	let watchdog =
		Watchdog::new(Some(Duration::from_millis(50)), trigger, WatchdogOptions { once: true });

	watchdog.start(None);
	sleep(Duration::from_millis(80)).await;

	assert_eq!(fired.load(Ordering::SeqCst), 1);

	watchdog.start(None);
	sleep(Duration::from_millis(200)).await;

	assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn debounced_reset_keeps_the_watchdog_quiet_while_active() {
	let _ = tracing_subscriber::fmt::try_init();

	let (fired, trigger) = counter();
	let config: WatchdogConfig =
		serde_json::from_str(r#"{ "timer": { "secs": 0, "nanos": 100000000 } }"#).expect("config");
	let watchdog = Watchdog::from_config(config, trigger);
	let feeder = watchdog.clone();
	let postpone = debounce(
		move |_: ()| feeder.reset(None),
		Some(Duration::from_millis(20)),
		DebounceOptions { leading: true },
	);

	watchdog.start(None);

	// Activity every 30 ms keeps feeding the watchdog.
	for _ in 0..10 {
		postpone.call(());
		sleep(Duration::from_millis(30)).await;
	}

	assert_eq!(fired.load(Ordering::SeqCst), 0);
	assert!(watchdog.is_armed());

	sleep(Duration::from_millis(150)).await;

	assert_eq!(fired.load(Ordering::SeqCst), 1);
	assert_eq!(watchdog.trigger_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn poll_observes_watchdog_expiry() {
	let watchdog =
		Watchdog::without_trigger(Some(Duration::from_millis(35)), WatchdogOptions::default());
	let observed = watchdog.clone();

	watchdog.start(None);

	let poll = wait_for(move || observed.failed(), Duration::from_millis(10), 10).expect("poll");

	poll.wait().await.expect("watchdog expired");

	assert!(watchdog.failed());
	assert_eq!(watchdog.trigger_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn poll_gives_up_when_the_watchdog_is_cancelled() {
	let watchdog =
		Watchdog::without_trigger(Some(Duration::from_millis(35)), WatchdogOptions::default());
	let observed = watchdog.clone();

	watchdog.start(None);
	watchdog.cancel();

	let poll = wait_for(move || observed.failed(), Duration::from_millis(10), 5).expect("poll");
	let err = poll.wait().await.expect_err("watchdog never expires");

	assert!(matches!(err, Error::LimitReached { attempts: 6 }));
}
