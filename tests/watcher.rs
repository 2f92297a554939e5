use std::sync::Arc;
use std::time::Duration;

use pinbroker::driver::{GpioDriver, SimDriver};
use pinbroker::{
    BoardProfile, ClaimOptions, Edge, PinIdentifier, PinRegistry, PinWatcher, Signal,
};

fn registry() -> (PinRegistry, Arc<SimDriver>) {
    let profile = Arc::new(BoardProfile::from_revision("a02082").unwrap());
    let driver = Arc::new(SimDriver::new());
    let registry = PinRegistry::new(profile, Arc::clone(&driver) as Arc<dyn GpioDriver>);
    (registry, driver)
}

const POLL: Duration = Duration::from_millis(5);

async fn settle() {
    // a few poll periods, so the watcher observes the current level
    tokio::time::sleep(POLL * 4).await;
}

#[tokio::test(start_paused = true)]
async fn rising_edge_produces_one_event() {
    let (registry, driver) = registry();
    driver.set_input_value(11, 0);
    let input = registry
        .claim_input(PinIdentifier::board(11), ClaimOptions::default())
        .unwrap();

    let mut watcher = PinWatcher::spawn(input, Edge::Rising, POLL);
    settle().await;

    driver.set_input_value(11, 1);
    let event = tokio::time::timeout(Duration::from_secs(1), watcher.next_event())
        .await
        .expect("no event before timeout")
        .expect("watcher closed");
    assert_eq!(event.board_pin, 11);
    assert_eq!(event.previous, Signal::Low);
    assert_eq!(event.current, Signal::High);

    let handle = watcher.stop().await;
    assert_eq!(handle.board_pin(), 11);
}

#[tokio::test(start_paused = true)]
async fn falling_transitions_are_filtered_on_rising_watch() {
    let (registry, driver) = registry();
    driver.set_input_value(11, 1);
    let input = registry
        .claim_input(PinIdentifier::board(11), ClaimOptions::default())
        .unwrap();

    let mut watcher = PinWatcher::spawn(input, Edge::Rising, POLL);
    settle().await;

    // High -> Low must not produce an event on a rising watch
    driver.set_input_value(11, 0);
    settle().await;
    // Low -> High must
    driver.set_input_value(11, 1);

    let event = tokio::time::timeout(Duration::from_secs(1), watcher.next_event())
        .await
        .expect("no event before timeout")
        .expect("watcher closed");
    assert_eq!(event.previous, Signal::Low);
    assert_eq!(event.current, Signal::High);

    watcher.stop().await;
}

#[tokio::test(start_paused = true)]
async fn both_watch_sees_either_direction() {
    let (registry, driver) = registry();
    driver.set_input_value(11, 0);
    let input = registry
        .claim_input(PinIdentifier::board(11), ClaimOptions::default())
        .unwrap();

    let mut watcher = PinWatcher::spawn(input, Edge::Both, POLL);
    settle().await;

    driver.set_input_value(11, 1);
    let up = tokio::time::timeout(Duration::from_secs(1), watcher.next_event())
        .await
        .unwrap()
        .unwrap();
    assert_eq!((up.previous, up.current), (Signal::Low, Signal::High));

    driver.set_input_value(11, 0);
    let down = tokio::time::timeout(Duration::from_secs(1), watcher.next_event())
        .await
        .unwrap()
        .unwrap();
    assert_eq!((down.previous, down.current), (Signal::High, Signal::Low));

    watcher.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_returns_the_handle_and_the_pin_stays_claimed() {
    let (registry, driver) = registry();
    driver.set_input_value(11, 0);
    let input = registry
        .claim_input(PinIdentifier::board(11), ClaimOptions::default())
        .unwrap();

    let watcher = PinWatcher::spawn(input, Edge::Both, POLL);
    settle().await;
    assert!(registry.is_pin_used(11));

    let handle = watcher.stop().await;
    assert!(registry.is_pin_used(11));
    assert_eq!(handle.read().unwrap(), Signal::Low);

    drop(handle);
    assert!(!registry.is_pin_used(11));
}
