//! Shared fixtures for integration tests.
//!
//! Each fixture is the complete output of one probe run, stored under
//! `tests/testdata/<name>.txt`.

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use reel::Outcome;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Per-step timeout used by the probe tests.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(2);

/// A recorded probe run and the counters it must produce.
#[derive(Debug, Clone, Copy)]
pub struct ProbeCase {
    pub name: &'static str,
    pub host: &'static str,
    pub count: i32,
    pub sent: usize,
    pub received: usize,
    pub errors: usize,
    pub outcome: Outcome,
}

pub const CASES: &[ProbeCase] = &[
    ProbeCase {
        name: "ip_address_no_packet_loss",
        host: "192.168.1.1",
        count: 4,
        sent: 4,
        received: 4,
        errors: 0,
        outcome: Outcome::Success,
    },
    ProbeCase {
        name: "hostname_no_packet_loss",
        host: "www.google.com",
        count: 10,
        sent: 10,
        received: 10,
        errors: 0,
        outcome: Outcome::Success,
    },
    ProbeCase {
        name: "ip_address_error_packet_loss",
        host: "192.168.1.1",
        count: 20,
        sent: 20,
        received: 16,
        errors: 4,
        outcome: Outcome::Error,
    },
    ProbeCase {
        name: "ip_address_failing_packet_loss",
        host: "192.168.1.2",
        count: 1,
        sent: 1,
        received: 0,
        errors: 0,
        outcome: Outcome::Failure,
    },
    ProbeCase {
        name: "ip_address_passing_packet_loss",
        host: "192.168.1.1",
        count: 20,
        sent: 20,
        received: 19,
        errors: 0,
        outcome: Outcome::Success,
    },
    ProbeCase {
        name: "incorrect_ip_address",
        host: "0.0.1.2",
        count: 1,
        sent: 0,
        received: 0,
        errors: 0,
        outcome: Outcome::Error,
    },
    ProbeCase {
        name: "bsd_partial_packet_loss",
        host: "10.0.0.1",
        count: 4,
        sent: 4,
        received: 3,
        errors: 0,
        outcome: Outcome::Success,
    },
    ProbeCase {
        name: "unknown_hostname",
        host: "nosuchhost.invalid",
        count: 1,
        sent: 0,
        received: 0,
        errors: 0,
        outcome: Outcome::Error,
    },
];

/// Route crate logs to the test harness, filtered by `RUST_LOG`.
pub fn init_logging() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_test_writer()
        .with_target(true);

    // Several tests in one binary call this; only the first install wins.
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt_layer)
        .try_init();
}

/// Load the recorded output for `name`.
pub fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("testdata")
        .join(format!("{name}.txt"));
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
}

impl ProbeCase {
    pub fn output(&self) -> String {
        fixture(self.name)
    }

    pub fn stats(&self) -> (usize, usize, usize) {
        (self.sent, self.received, self.errors)
    }
}
