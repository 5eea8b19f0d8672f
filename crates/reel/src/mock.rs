//! Mock transport for driving handlers without spawning a process.
//!
//! - [`MockTransport`]: an in-memory `AsyncRead + AsyncWrite` that replays
//!   scripted output and records what the engine writes
//! - [`MockEvent`]: one scripted action (output, delay, EOF, read error)
//! - [`MockBuilder`]: fluent construction of a script
//!
//! # Example
//!
//! ```rust,ignore
//! use reel::mock::MockBuilder;
//!
//! let transport = MockBuilder::new()
//!     .line("PING 10.0.0.1 (10.0.0.1) 56(84) bytes of data.")
//!     .delay_ms(10)
//!     .line("64 bytes from 10.0.0.1: icmp_seq=1 ttl=64 time=0.3 ms")
//!     .eof()
//!     .build();
//! assert!(transport.has_pending());
//! ```

pub mod event;
pub mod transport;

use std::time::Duration;

pub use event::MockEvent;
pub use transport::MockTransport;

/// Create a mock transport that emits `output` and then closes.
#[must_use]
pub fn simple_mock(output: &str) -> MockTransport {
    MockBuilder::new().output(output).eof().build()
}

/// Builder for creating mock transports fluently.
#[derive(Debug, Default)]
pub struct MockBuilder {
    events: Vec<MockEvent>,
}

impl MockBuilder {
    /// Create a new mock builder.
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add output to the mock.
    #[must_use]
    pub fn output(mut self, data: &str) -> Self {
        self.events.push(MockEvent::output_str(data));
        self
    }

    /// Add one line of output, newline-terminated.
    #[must_use]
    pub fn line(self, line: &str) -> Self {
        self.output(&format!("{line}\n"))
    }

    /// Emit every line of `text` as its own chunk, pausing `gap` between them.
    #[must_use]
    pub fn stream_lines(mut self, text: &str, gap: Duration) -> Self {
        for line in text.split_inclusive('\n') {
            if !gap.is_zero() {
                self.events.push(MockEvent::Delay(gap));
            }
            self.events.push(MockEvent::output_str(line));
        }
        self
    }

    /// Emit `text` in chunks of `size` bytes, splitting lines (and characters) arbitrarily.
    #[must_use]
    pub fn chunked(mut self, text: &str, size: usize) -> Self {
        for chunk in text.as_bytes().chunks(size.max(1)) {
            self.events.push(MockEvent::output(chunk.to_vec()));
        }
        self
    }

    /// Add a delay.
    #[must_use]
    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.events.push(MockEvent::delay_ms(ms));
        self
    }

    /// Close the output.
    #[must_use]
    pub fn eof(mut self) -> Self {
        self.events.push(MockEvent::Eof);
        self
    }

    /// Fail the read at this point.
    #[must_use]
    pub fn error(mut self, msg: &str) -> Self {
        self.events.push(MockEvent::error(msg));
        self
    }

    /// Build the mock transport.
    #[must_use]
    pub fn build(self) -> MockTransport {
        MockTransport::from_events(self.events)
    }
}
