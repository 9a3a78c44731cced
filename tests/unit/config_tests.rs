//! Unit tests for `WaitBound` and `RelayConfig`.

use std::time::Duration;

use pipe_relay::config::{DEFAULT_TIMEOUT_MS, LINE_BUFFER_CAPACITY};
use pipe_relay::{RelayConfig, WaitBound};

#[test]
fn default_wait_is_fifty_milliseconds() {
    assert_eq!(DEFAULT_TIMEOUT_MS, 50);
    assert_eq!(WaitBound::default(), WaitBound::Millis(50));
    assert_eq!(
        WaitBound::default().as_duration(),
        Some(Duration::from_millis(50))
    );
}

#[test]
fn max_millis_means_infinite() {
    assert_eq!(WaitBound::from_millis(u32::MAX), WaitBound::Infinite);
    assert_eq!(WaitBound::Infinite.as_duration(), None);
}

#[test]
fn one_below_max_stays_bounded() {
    let wait = WaitBound::from_millis(u32::MAX - 1);
    assert_eq!(
        wait.as_duration(),
        Some(Duration::from_millis(u64::from(u32::MAX - 1)))
    );
}

#[test]
fn zero_wait_is_bounded_not_infinite() {
    assert_eq!(WaitBound::from_millis(0).as_duration(), Some(Duration::ZERO));
}

#[test]
fn wait_bound_display() {
    assert_eq!(WaitBound::Millis(75).to_string(), "75ms");
    assert_eq!(WaitBound::Infinite.to_string(), "infinite");
}

#[test]
fn relay_config_builder_sets_fields() {
    let config = RelayConfig::new("svc").with_wait(WaitBound::Millis(5));
    assert_eq!(config.pipe_name, "svc");
    assert_eq!(config.wait, WaitBound::Millis(5));
    assert_eq!(RelayConfig::new("svc").wait, WaitBound::Millis(50));
}

#[test]
fn line_buffer_holds_one_kilobyte() {
    assert_eq!(LINE_BUFFER_CAPACITY, 1024);
}
