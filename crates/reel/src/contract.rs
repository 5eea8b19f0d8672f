//! The interaction contract every command handler implements.
//!
//! A handler describes how to drive one command: which arguments start it,
//! which expressions to watch for in its output, and how to react when one
//! matches, when nothing matches in time, or when the output closes. The
//! handler performs no I/O of its own. An engine such as
//! [`ReelEngine`](crate::engine::ReelEngine) owns the transport and calls
//! back into the handler, one phase at a time:
//!
//! ```text
//! created -> awaiting-first-match -> (awaiting-match <-> matched) -> terminal
//! ```
//!
//! Returning `None` (or a [`Step`] with an empty `expect` set) from
//! [`Reel::reel_match`] or [`Reel::reel_timeout`] moves the interaction to
//! `terminal`; the engine will not call `reel_match` again.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use reel::{Outcome, Reel, Step};
//!
//! struct Echo {
//!     seen: bool,
//! }
//!
//! impl Reel for Echo {
//!     fn arguments(&self) -> Vec<String> {
//!         vec!["echo".into(), "ready".into()]
//!     }
//!
//!     fn reel_first(&mut self) -> Step {
//!         Step::watch(vec!["ready".into()], self.timeout())
//!     }
//!
//!     fn reel_match(&mut self, _pattern: &str, _before: &str, _matched: &str) -> Option<Step> {
//!         self.seen = true;
//!         None
//!     }
//!
//!     fn reel_timeout(&mut self) -> Option<Step> {
//!         None
//!     }
//!
//!     fn reel_eof(&mut self) {}
//!
//!     fn timeout(&self) -> Duration {
//!         Duration::from_secs(1)
//!     }
//!
//!     fn result(&self) -> Outcome {
//!         if self.seen { Outcome::Success } else { Outcome::Error }
//!     }
//! }
//!
//! let mut echo = Echo { seen: false };
//! assert!(!echo.reel_first().is_terminal());
//! assert!(echo.reel_match("ready", "", "ready").is_none());
//! assert_eq!(echo.result(), Outcome::Success);
//! ```

use std::time::Duration;

use crate::types::{Outcome, Step};

/// Expect-style contract for driving one command through its output.
///
/// Implementations may assume at most one call is in flight at a time.
/// None of the methods block.
pub trait Reel {
    /// Process invocation tokens: the program name followed by its arguments.
    ///
    /// Must be a pure function of the handler's construction parameters.
    fn arguments(&self) -> Vec<String>;

    /// The initial watch-set, called exactly once before any output is read.
    fn reel_first(&mut self) -> Step;

    /// Called once per match, in stream order.
    ///
    /// `pattern` is the expression (from the current step's `expect` set)
    /// that matched, `before` the unmatched text preceding it and `matched`
    /// the matched text. Returns the next step, or `None` once the
    /// interaction is finished.
    fn reel_match(&mut self, pattern: &str, before: &str, matched: &str) -> Option<Step>;

    /// Called when nothing in the current watch-set matched within the step timeout.
    fn reel_timeout(&mut self) -> Option<Step>;

    /// Notification that the output stream closed before a terminal step.
    ///
    /// Must never panic.
    fn reel_eof(&mut self);

    /// The per-step timeout supplied at construction.
    fn timeout(&self) -> Duration;

    /// The current classification. Callable at any time.
    fn result(&self) -> Outcome;
}

impl<R: Reel + ?Sized> Reel for Box<R> {
    fn arguments(&self) -> Vec<String> {
        (**self).arguments()
    }

    fn reel_first(&mut self) -> Step {
        (**self).reel_first()
    }

    fn reel_match(&mut self, pattern: &str, before: &str, matched: &str) -> Option<Step> {
        (**self).reel_match(pattern, before, matched)
    }

    fn reel_timeout(&mut self) -> Option<Step> {
        (**self).reel_timeout()
    }

    fn reel_eof(&mut self) {
        (**self).reel_eof();
    }

    fn timeout(&self) -> Duration {
        (**self).timeout()
    }

    fn result(&self) -> Outcome {
        (**self).result()
    }
}

/// Phase of an interaction as tracked by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReelPhase {
    /// Handler constructed, `reel_first` not yet called.
    Created,
    /// First step issued, nothing matched yet.
    AwaitingFirstMatch,
    /// At least one match delivered, waiting for the next.
    AwaitingMatch,
    /// A terminal step was reached; no further matches are delivered.
    Terminal,
}

impl ReelPhase {
    /// The phase after a step was issued.
    ///
    /// `Terminal` is absorbing; a terminal step moves any phase to `Terminal`.
    #[must_use]
    pub fn after(self, step: Option<&Step>) -> Self {
        match (self, step) {
            (Self::Terminal, _) | (_, None) => Self::Terminal,
            (_, Some(step)) if step.is_terminal() => Self::Terminal,
            (Self::Created, Some(_)) => Self::AwaitingFirstMatch,
            (_, Some(_)) => Self::AwaitingMatch,
        }
    }

    /// Check if the interaction is finished.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal)
    }
}
