//! Reel execution engine.
//!
//! [`ReelEngine`] drives one [`Reel`] handler over a transport that is
//! already connected to the command (a PTY, a pipe pair, an SSH channel or
//! a [`MockTransport`](crate::mock::MockTransport)). The engine never spawns
//! anything; whoever owns the process passes [`Reel::arguments`] to its
//! spawner and hands the resulting stream over.
//!
//! Each step is executed the same way: write `execute`, install `expect` as
//! the watch-set, then wait for the earliest match, the step timeout, or the
//! end of the stream, and call back into the handler accordingly.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use reel::engine::ReelEngine;
//! use reel::handlers::Ping;
//!
//! let mut ping = Ping::new(Duration::from_secs(5), "192.168.1.1", 4);
//! let transport = spawn_somehow(&ping.arguments()).await?;
//! let report = ReelEngine::new(transport).run(&mut ping).await?;
//! println!("{} ({})", report.outcome, ping.ping_stats());
//! ```

use std::fmt;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::config::ReelConfig;
use crate::contract::{Reel, ReelPhase};
use crate::error::{ReelError, Result};
use crate::expect::Matcher;
use crate::types::{Match, Outcome, Step};

/// Bytes requested from the transport per read.
const READ_CHUNK: usize = 4096;

/// How an interaction ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReelEnd {
    /// The handler returned a terminal step from a match.
    Finished,
    /// The last phase was a timeout.
    Timeout,
    /// The output stream closed before a terminal step.
    Eof,
}

impl fmt::Display for ReelEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Finished => "finished",
            Self::Timeout => "timeout",
            Self::Eof => "eof",
        };
        f.write_str(s)
    }
}

/// Summary of one driven interaction.
#[derive(Debug, Clone)]
pub struct ReelReport {
    /// How the interaction ended.
    pub end: ReelEnd,
    /// The handler's classification after the last phase.
    pub outcome: Outcome,
    /// Steps issued, including the first.
    pub steps: usize,
    /// Matches delivered to the handler, in order.
    pub matches: Vec<Match>,
    /// Output read but never matched.
    pub unmatched: String,
}

impl ReelReport {
    /// Check if the handler reached a terminal step through a match.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.end == ReelEnd::Finished
    }
}

/// What ended a wait for the next match.
enum Event {
    Matched(Match),
    Timeout,
    Eof,
}

/// Drives [`Reel`] handlers over a transport.
pub struct ReelEngine<T> {
    transport: T,
    matcher: Matcher,
    config: ReelConfig,
    phase: ReelPhase,
}

impl<T> fmt::Debug for ReelEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReelEngine")
            .field("matcher", &self.matcher)
            .field("config", &self.config)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl<T> ReelEngine<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Create an engine with the default configuration.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ReelConfig::default())
    }

    /// Create an engine with a specific configuration.
    #[must_use]
    pub fn with_config(transport: T, config: ReelConfig) -> Self {
        Self {
            transport,
            matcher: Matcher::new(config.buffer_size),
            config,
            phase: ReelPhase::Created,
        }
    }

    /// The phase of the current (or last) interaction.
    #[must_use]
    pub const fn phase(&self) -> ReelPhase {
        self.phase
    }

    /// The engine configuration.
    #[must_use]
    pub const fn config(&self) -> &ReelConfig {
        &self.config
    }

    /// Get the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Take the transport back, e.g. to tear the process down.
    #[must_use]
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Drive `handler` from its first step to a terminal step, a timeout, or EOF.
    ///
    /// Timeouts and EOF are reported through [`ReelReport::end`], not as errors.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails, a watch-set does not compile,
    /// or the handler keeps issuing steps past [`ReelConfig::max_steps`]. In the
    /// last case the handler's [`Reel::reel_timeout`] step is written before
    /// the error is returned.
    pub async fn run<R>(&mut self, handler: &mut R) -> Result<ReelReport>
    where
        R: Reel + ?Sized,
    {
        debug!(arguments = ?handler.arguments(), "starting interaction");

        let mut step = handler.reel_first();
        self.phase = ReelPhase::Created.after(Some(&step));
        let mut steps = 1;
        let mut matches = Vec::new();
        let mut end = ReelEnd::Finished;

        loop {
            self.execute(&step).await?;
            if step.is_terminal() {
                break;
            }
            self.matcher.watch(&step.expect)?;

            let timeout = self.step_timeout(&step);
            let next = match self.wait(timeout).await? {
                Event::Matched(m) => {
                    trace!(pattern = %m.pattern, matched = %m.matched, "match");
                    end = ReelEnd::Finished;
                    let next = handler.reel_match(&m.pattern, &m.before, &m.matched);
                    matches.push(m);
                    next
                }
                Event::Timeout => {
                    debug!(?timeout, "no match before timeout");
                    end = ReelEnd::Timeout;
                    handler.reel_timeout()
                }
                Event::Eof => {
                    debug!("output closed");
                    handler.reel_eof();
                    end = ReelEnd::Eof;
                    break;
                }
            };

            self.phase = self.phase.after(next.as_ref());
            let Some(next) = next else {
                break;
            };

            steps += 1;
            // Terminal steps are exempt from the limit. Past it, the handler's
            // timeout step still goes out.
            if steps > self.config.max_steps && !next.is_terminal() {
                warn!(max = self.config.max_steps, "interaction exceeded step limit");
                self.phase = ReelPhase::Terminal;
                if let Some(stop) = handler.reel_timeout() {
                    self.execute(&stop).await?;
                }
                return Err(ReelError::TooManySteps {
                    max: self.config.max_steps,
                });
            }
            step = next;
        }

        self.phase = ReelPhase::Terminal;
        let outcome = handler.result();
        debug!(%end, %outcome, steps, "interaction complete");

        Ok(ReelReport {
            end,
            outcome,
            steps,
            matches,
            unmatched: self.matcher.buffer_str(),
        })
    }

    fn step_timeout(&self, step: &Step) -> Duration {
        if step.timeout.is_zero() {
            self.config.default_timeout
        } else {
            step.timeout
        }
    }

    async fn execute(&mut self, step: &Step) -> Result<()> {
        if !step.has_execute() {
            return Ok(());
        }
        trace!(execute = ?step.execute, "send");
        self.transport.write_all(step.execute.as_bytes()).await?;
        self.transport.flush().await?;
        Ok(())
    }

    async fn wait(&mut self, timeout: Duration) -> Result<Event> {
        let deadline = Instant::now() + timeout;
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            if let Some(m) = self.matcher.next_match() {
                return Ok(Event::Matched(m));
            }

            match tokio::time::timeout_at(deadline, self.transport.read(&mut chunk)).await {
                Err(_) => return Ok(Event::Timeout),
                Ok(Ok(0)) => return Ok(Event::Eof),
                Ok(Ok(n)) => {
                    let discarded = self.matcher.buffer().bytes_discarded();
                    self.matcher.append(&chunk[..n]);
                    let dropped = self.matcher.buffer().bytes_discarded() - discarded;
                    if dropped > 0 {
                        warn!(dropped, "output buffer full, discarding oldest bytes");
                    }
                }
                Ok(Err(e)) => return Err(e.into()),
            }
        }
    }
}

/// Drive `handler` over `transport` with `config` in one call.
///
/// # Errors
///
/// See [`ReelEngine::run`].
pub async fn drive<T, R>(transport: T, handler: &mut R, config: ReelConfig) -> Result<ReelReport>
where
    T: AsyncRead + AsyncWrite + Unpin,
    R: Reel + ?Sized,
{
    ReelEngine::with_config(transport, config).run(handler).await
}
