//! Reachability probe handler.
//!
//! [`Ping`] drives the system `ping` program through the [`Reel`] contract.
//! It counts reply lines and explicit per-packet error lines, reads the
//! transmitted count from the closing summary line, and classifies the probe:
//!
//! | transmitted | errors | replies | outcome |
//! |---|---|---|---|
//! | 0 | any | any | [`Outcome::Error`] |
//! | > 0 | > 0 | any | [`Outcome::Error`] |
//! | > 0 | 0 | 0 | [`Outcome::Failure`] |
//! | > 0 | 0 | > 0 | [`Outcome::Success`] |
//!
//! Partial silent loss (fewer replies than requests, no error lines) is a
//! success.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use reel::{Outcome, Reel};
//! use reel::handlers::ping::Ping;
//!
//! let mut ping = Ping::new(Duration::from_secs(2), "192.168.1.1", 1);
//! assert_eq!(ping.arguments(), ["ping", "-c", "1", "192.168.1.1"]);
//!
//! let step = ping.reel_match(
//!     "",
//!     "",
//!     "64 bytes from 192.168.1.1: icmp_seq=1 ttl=64 time=0.42 ms\n\
//!      1 packets transmitted, 1 received, 0% packet loss, time 0ms\n",
//! );
//! assert!(step.is_none());
//! assert_eq!(ping.stats(), (1, 1, 0));
//! assert_eq!(ping.result(), Outcome::Success);
//! ```

use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, trace};

use crate::config::ReelConfig;
use crate::contract::Reel;
use crate::types::{CTRL_C, Outcome, Step};

/// Program invoked by [`ping_cmd`].
pub const PROGRAM: &str = "ping";

/// One successful round trip, e.g.
/// `64 bytes from 192.168.1.1: icmp_seq=1 ttl=64 time=0.531 ms`.
pub const REPLY_REGEX: &str =
    r"(?m)^\d+ bytes from \S+(?: \([^)]*\))?: icmp_[rs]eq=\d+ ttl=\d+ time[=<] ?[\d.]+ ?ms";

/// An explicit delivery failure for one request, e.g.
/// `From 192.168.1.100 icmp_seq=3 Destination Host Unreachable`.
pub const ERROR_REGEX: &str = r"(?m)^From \S+(?: \([^)]*\))? icmp_[rs]eq=\d+ (?:Destination (?:Host|Net|Port|Protocol) Unreachable|Destination (?:Host|Net) (?:Unknown|Prohibited)|Time to live exceeded|Packet filtered|Source Route Failed|Frag needed and DF set)";

/// The closing summary, e.g.
/// `20 packets transmitted, 16 received, +4 errors, 20% packet loss, time 19046ms`.
pub const SUMMARY_REGEX: &str =
    r"(?m)^(\d+) packets transmitted, (\d+)(?: packets)? received(?:, \+(\d+) errors)?";

/// The program could not start sending at all, e.g. `ping: connect: Invalid argument`.
pub const SEND_FAILURE_REGEX: &str = r"(?m)^ping: (?:connect: (?:Invalid argument|Network is unreachable|Cannot assign requested address)|\S+: (?:Name or service not known|Temporary failure in name resolution|No address associated with hostname)|unknown host|cannot resolve \S+: Unknown host)";

static REPLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(REPLY_REGEX).expect("reply pattern is a valid regex"));

static ERROR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ERROR_REGEX).expect("error pattern is a valid regex"));

static SUMMARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SUMMARY_REGEX).expect("summary pattern is a valid regex"));

static SEND_FAILURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(SEND_FAILURE_REGEX).expect("send failure pattern is a valid regex")
});

/// Invocation tokens for probing `host`.
///
/// A positive `count` bounds the probe (`ping -c <count> <host>`); zero or a
/// negative value leaves it unbounded (`ping <host>`), to be stopped by the
/// timeout step's interrupt.
#[must_use]
pub fn ping_cmd(host: &str, count: i32) -> Vec<String> {
    command(PROGRAM, host, count)
}

fn command(program: &str, host: &str, count: i32) -> Vec<String> {
    if count > 0 {
        vec![
            program.to_string(),
            "-c".to_string(),
            count.to_string(),
            host.to_string(),
        ]
    } else {
        vec![program.to_string(), host.to_string()]
    }
}

/// Category of a line of probe output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// A successful round trip.
    Reply,
    /// An explicit per-request delivery failure.
    Error,
    /// The closing transmitted/received summary.
    Summary,
    /// The program failed before sending anything.
    SendFailure,
}

impl LineKind {
    /// Classify one line, or `None` for lines the probe does not care about.
    #[must_use]
    pub fn of(line: &str) -> Option<Self> {
        if REPLY.is_match(line) {
            Some(Self::Reply)
        } else if ERROR.is_match(line) {
            Some(Self::Error)
        } else if SUMMARY.is_match(line) {
            Some(Self::Summary)
        } else if SEND_FAILURE.is_match(line) {
            Some(Self::SendFailure)
        } else {
            None
        }
    }

    /// Check if a line of this kind ends the probe.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Summary | Self::SendFailure)
    }
}

/// Counters accumulated over one probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PingStats {
    /// Requests the summary reports as transmitted.
    pub sent: usize,
    /// Reply lines seen.
    pub received: usize,
    /// Explicit per-request error lines seen.
    pub errors: usize,
    /// Received count printed in the summary; informational only.
    pub reported_received: Option<usize>,
    /// Error count printed in the summary; informational only.
    pub reported_errors: Option<usize>,
}

impl PingStats {
    /// Apply the classification policy to these counters.
    #[must_use]
    pub const fn classify(&self) -> Outcome {
        if self.sent == 0 || self.errors > 0 {
            Outcome::Error
        } else if self.received == 0 {
            Outcome::Failure
        } else {
            Outcome::Success
        }
    }

    /// Requests with neither a reply nor an error line.
    #[must_use]
    pub const fn silently_lost(&self) -> usize {
        self.sent.saturating_sub(self.received + self.errors)
    }
}

impl fmt::Display for PingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sent, {} received, {} errors",
            self.sent, self.received, self.errors
        )
    }
}

/// Handler for one reachability probe.
#[derive(Debug, Clone)]
pub struct Ping {
    program: String,
    host: String,
    count: i32,
    timeout: Duration,
    stats: PingStats,
    outcome: Option<Outcome>,
    eof_seen: bool,
}

impl Ping {
    /// Create a probe of `host` with `count` requests (non-positive: unbounded).
    #[must_use]
    pub fn new(timeout: Duration, host: impl Into<String>, count: i32) -> Self {
        Self {
            program: PROGRAM.to_string(),
            host: host.into(),
            count,
            timeout,
            stats: PingStats::default(),
            outcome: None,
            eof_seen: false,
        }
    }

    /// Create a probe of `host` using the program, count and timeout from `config`.
    #[must_use]
    pub fn from_config(config: &ReelConfig, host: impl Into<String>) -> Self {
        Self::new(config.default_timeout, host, config.ping.count).with_program(&config.ping.program)
    }

    /// Invoke `program` instead of `ping`.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// The probed host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The requested count.
    #[must_use]
    pub const fn count(&self) -> i32 {
        self.count
    }

    /// The expressions returned by [`Reel::reel_first`], in order.
    #[must_use]
    pub fn reel_first_regular_expressions(&self) -> Vec<String> {
        [REPLY_REGEX, ERROR_REGEX, SUMMARY_REGEX, SEND_FAILURE_REGEX]
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    /// `(sent, received, errors)`.
    #[must_use]
    pub const fn stats(&self) -> (usize, usize, usize) {
        (self.stats.sent, self.stats.received, self.stats.errors)
    }

    /// All counters, including the summary's informational values.
    #[must_use]
    pub const fn ping_stats(&self) -> &PingStats {
        &self.stats
    }

    /// Check if the probe reached its summary (or failed to start).
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Check if the engine reported the output closing.
    #[must_use]
    pub const fn eof_seen(&self) -> bool {
        self.eof_seen
    }

    fn continuation(&self) -> Step {
        Step::watch(self.reel_first_regular_expressions(), self.timeout)
    }

    /// Update counters for one line; returns true when the line ends the probe.
    fn observe(&mut self, line: &str) -> bool {
        let Some(kind) = LineKind::of(line) else {
            return false;
        };

        match kind {
            LineKind::Reply => self.stats.received += 1,
            LineKind::Error => self.stats.errors += 1,
            LineKind::Summary => self.read_summary(line),
            LineKind::SendFailure => {}
        }
        trace!(host = %self.host, ?kind, stats = %self.stats, "probe line");

        if kind.is_terminal() {
            self.finish();
        }
        kind.is_terminal()
    }

    fn read_summary(&mut self, line: &str) {
        let Some(caps) = SUMMARY.captures(line) else {
            return;
        };
        let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<usize>().ok());

        // Counts too large for usize are treated as zero.
        self.stats.sent = number(1).unwrap_or(0);
        self.stats.reported_received = number(2);
        self.stats.reported_errors = number(3);
    }

    fn finish(&mut self) {
        let outcome = self.stats.classify();
        debug!(host = %self.host, stats = %self.stats, %outcome, "probe classified");
        self.outcome = Some(outcome);
    }
}

impl Reel for Ping {
    fn arguments(&self) -> Vec<String> {
        command(&self.program, &self.host, self.count)
    }

    fn reel_first(&mut self) -> Step {
        self.continuation()
    }

    fn reel_match(&mut self, pattern: &str, _before: &str, matched: &str) -> Option<Step> {
        if self.is_finished() {
            return None;
        }
        trace!(host = %self.host, pattern, "probe match");

        for line in matched.lines() {
            if self.observe(line) {
                return None;
            }
        }
        Some(self.continuation())
    }

    fn reel_timeout(&mut self) -> Option<Step> {
        debug!(host = %self.host, stats = %self.stats, "probe timed out, interrupting");
        Some(Step::send(CTRL_C, self.timeout))
    }

    fn reel_eof(&mut self) {
        self.eof_seen = true;
        debug!(host = %self.host, finished = self.is_finished(), "probe output closed");
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn result(&self) -> Outcome {
        self.outcome.unwrap_or_default()
    }
}
