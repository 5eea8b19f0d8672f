//! Common types for reel.
//!
//! This module defines the step directive exchanged between handlers and the
//! engine, the three-valued probe outcome, and the match record the engine
//! hands back to handlers.

use std::fmt;
use std::time::Duration;

/// A directive returned by a handler at each phase of an interaction.
///
/// A step tells the engine what to write to the process and which
/// expressions to watch for next. A step whose `expect` set is empty is
/// terminal: the engine must stop matching and finalize.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Step {
    /// Text to write to the process input (empty if nothing is sent).
    pub execute: String,

    /// Regular expressions to watch for, in priority order.
    pub expect: Vec<String>,

    /// How long to wait for one of `expect` before the timeout phase.
    pub timeout: Duration,
}

impl Step {
    /// Create a step that watches for `expect` without sending anything.
    #[must_use]
    pub fn watch(expect: Vec<String>, timeout: Duration) -> Self {
        Self {
            execute: String::new(),
            expect,
            timeout,
        }
    }

    /// Create a terminal step that only sends `execute`.
    #[must_use]
    pub fn send(execute: impl Into<String>, timeout: Duration) -> Self {
        Self {
            execute: execute.into(),
            expect: Vec::new(),
            timeout,
        }
    }

    /// Check if this step ends the interaction.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.expect.is_empty()
    }

    /// Check if this step writes anything to the process.
    #[must_use]
    pub fn has_execute(&self) -> bool {
        !self.execute.is_empty()
    }
}

/// Classification of a finished (or abandoned) interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Outcome {
    /// The interaction did not complete, or completed with explicit errors.
    ///
    /// This is also the value reported before anything has been classified.
    #[default]
    Error,

    /// The interaction completed and its checks passed.
    Success,

    /// The interaction completed and its checks did not pass.
    Failure,
}

impl Outcome {
    /// Stable integer code, for suites that persist results as numbers.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Error => 0,
            Self::Success => 1,
            Self::Failure => 2,
        }
    }

    /// Inverse of [`Outcome::code`].
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Error),
            1 => Some(Self::Success),
            2 => Some(Self::Failure),
            _ => None,
        }
    }

    /// Check if this is a success.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Error => "error",
            Self::Success => "success",
            Self::Failure => "failure",
        };
        f.write_str(s)
    }
}

/// Interrupt sequence sent to stop a running command.
pub const CTRL_C: &str = "\x03";

/// A match found by the engine in the process output.
#[derive(Debug, Clone)]
pub struct Match {
    /// The index of the pattern that matched within the step's `expect` set.
    pub pattern_index: usize,

    /// The source expression that matched.
    pub pattern: String,

    /// The full text that matched.
    pub matched: String,

    /// Text consumed before the match.
    pub before: String,
}

impl Match {
    /// Create a new match record.
    #[must_use]
    pub fn new(
        pattern_index: usize,
        pattern: impl Into<String>,
        matched: impl Into<String>,
        before: impl Into<String>,
    ) -> Self {
        Self {
            pattern_index,
            pattern: pattern.into(),
            matched: matched.into(),
            before: before.into(),
        }
    }

    /// Get the full matched text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.matched
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.matched)
    }
}
