//! Integration tests for scripted probe runs over the mock transport.
//!
//! These tests require the `mock` feature to be enabled.

#![cfg(feature = "mock")]

mod common;

use std::time::Duration;

use common::{TEST_TIMEOUT, fixture};
use reel::mock::{MockBuilder, simple_mock};
use reel::{CTRL_C, Outcome, Ping, ReelConfig, ReelEnd, ReelEngine, drive};

/// Test a complete run replayed in one piece.
#[tokio::test]
async fn simple_run() {
    let transport = simple_mock(&fixture("ip_address_no_packet_loss"));
    let mut ping = Ping::new(TEST_TIMEOUT, "192.168.1.1", 4);

    let report = ReelEngine::new(transport).run(&mut ping).await.unwrap();
    assert!(report.is_finished());
    assert_eq!(ping.stats(), (4, 4, 0));
    assert_eq!(report.outcome, Outcome::Success);
}

/// Test a run split across arbitrary byte boundaries.
#[tokio::test]
async fn chunked_run() {
    let transport = MockBuilder::new()
        .chunked(&fixture("ip_address_error_packet_loss"), 5)
        .eof()
        .build();
    let mut ping = Ping::new(TEST_TIMEOUT, "192.168.1.1", 20);

    let report = ReelEngine::new(transport).run(&mut ping).await.unwrap();
    assert!(report.is_finished());
    assert_eq!(ping.stats(), (20, 16, 4));
    assert_eq!(report.outcome, Outcome::Error);
}

/// Test a run paced one line at a time.
#[tokio::test]
async fn paced_run() {
    let transport = MockBuilder::new()
        .stream_lines(&fixture("bsd_partial_packet_loss"), Duration::from_millis(5))
        .eof()
        .build();
    let mut ping = Ping::new(TEST_TIMEOUT, "10.0.0.1", 4);

    let report = drive(transport, &mut ping, ReelConfig::default()).await.unwrap();
    assert!(report.is_finished());
    assert_eq!(ping.stats(), (4, 3, 0));
    assert_eq!(report.outcome, Outcome::Success);
}

/// Test a probe that stops producing output is interrupted.
#[tokio::test]
async fn stalled_run() {
    let transport = MockBuilder::new()
        .line("PING 192.168.1.2 (192.168.1.2) 56(84) bytes of data.")
        .build();
    let mut ping = Ping::new(Duration::from_millis(100), "192.168.1.2", 0);

    let mut engine = ReelEngine::new(transport.clone());
    let report = engine.run(&mut ping).await.unwrap();
    assert_eq!(report.end, ReelEnd::Timeout);
    assert_eq!(report.outcome, Outcome::Error);
    assert_eq!(transport.take_input_str(), CTRL_C);
}

/// Test a read failure surfaces as an I/O error.
#[tokio::test]
async fn transport_failure() {
    let transport = MockBuilder::new()
        .line("PING 192.168.1.1 (192.168.1.1) 56(84) bytes of data.")
        .error("device went away")
        .build();
    let mut ping = Ping::new(TEST_TIMEOUT, "192.168.1.1", 4);

    let err = ReelEngine::new(transport).run(&mut ping).await.unwrap_err();
    assert!(err.is_io());
}
