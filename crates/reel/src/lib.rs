//! reel: expect-style command interaction automaton
//!
//! This crate defines the [`Reel`] contract, a phased callback interface for
//! driving an external command through its textual output, and a concrete
//! handler for reachability probes ([`handlers::ping::Ping`]).
//!
//! Handlers never touch the process. An engine owns the transport, feeds
//! matched output to the handler, and follows the [`Step`]s it returns:
//!
//! 1. [`Reel::reel_first`] gives the initial watch-set and timeout.
//! 2. [`Reel::reel_match`] is called for every match, in stream order.
//! 3. [`Reel::reel_timeout`] is called when nothing matches in time.
//! 4. [`Reel::reel_eof`] is called when the output closes early.
//!
//! [`engine::ReelEngine`] is a tokio implementation of that driver that works
//! over any `AsyncRead + AsyncWrite` transport.
//!
//! # Features
//!
//! - **Generic contract**: one trait, any number of command handlers
//! - **Ping handler**: reply/error/summary line parsing and deterministic
//!   success/error/failure classification
//! - **Async engine** with per-step timeouts and a bounded output buffer
//! - **Mock transport** for scripted runs (feature: `mock`)
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use reel::{Outcome, Reel};
//! use reel::handlers::Ping;
//!
//! let mut ping = Ping::new(Duration::from_secs(2), "192.168.1.2", 1);
//! assert_eq!(ping.result(), Outcome::Error);
//!
//! let first = ping.reel_first();
//! assert!(first.execute.is_empty());
//! assert_eq!(first.expect, ping.reel_first_regular_expressions());
//!
//! let done = ping.reel_match("", "", "1 packets transmitted, 0 received, 100% packet loss");
//! assert!(done.is_none());
//! assert_eq!(ping.result(), Outcome::Failure);
//! ```

pub mod config;
pub mod contract;
pub mod engine;
pub mod error;
pub mod expect;
pub mod handlers;
pub mod prelude;
pub mod types;

/// Mock transport for testing.
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::{EnvConfig, PingConfig, ReelConfig};
pub use contract::{Reel, ReelPhase};
pub use engine::{ReelEnd, ReelEngine, ReelReport, drive};
pub use error::{ReelError, Result};
pub use expect::{CompiledRegex, Matcher, PatternSet, RingBuffer};
pub use handlers::{Ping, PingStats, ping_cmd};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockBuilder, MockEvent, MockTransport};
pub use types::{CTRL_C, Match, Outcome, Step};
