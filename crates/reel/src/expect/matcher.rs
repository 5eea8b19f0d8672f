//! Pattern matching engine for expect operations.
//!
//! The matcher combines the output buffer with the regex cache: the engine
//! appends what it reads, installs the current step's watch-set, and pulls
//! matches out one at a time.

use super::buffer::{DEFAULT_CAPACITY, RingBuffer};
use super::cache::RegexCache;
use super::pattern::PatternSet;
use crate::error::{ReelError, Result};
use crate::types::Match;

/// The pattern matching engine.
#[derive(Debug)]
pub struct Matcher {
    buffer: RingBuffer,
    cache: RegexCache,
    patterns: PatternSet,
}

impl Matcher {
    /// Create a new matcher with the specified buffer size.
    #[must_use]
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer: RingBuffer::new(buffer_size),
            cache: RegexCache::with_default_size(),
            patterns: PatternSet::new(),
        }
    }

    /// Replace the watch-set.
    ///
    /// # Errors
    ///
    /// Returns [`ReelError::InvalidPattern`] if an expression does not compile;
    /// the previous watch-set is kept in that case.
    pub fn watch<S: AsRef<str>>(&mut self, expect: &[S]) -> Result<()> {
        self.patterns = self
            .cache
            .compile_set(expect)
            .map_err(|(pattern, source)| ReelError::invalid_pattern(pattern, source))?;
        Ok(())
    }

    /// The current watch-set.
    #[must_use]
    pub const fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Append data to the buffer.
    pub fn append(&mut self, data: &[u8]) {
        self.buffer.append(data);
    }

    /// Get the current buffer.
    #[must_use]
    pub const fn buffer(&self) -> &RingBuffer {
        &self.buffer
    }

    /// Get the current buffer contents as a string.
    #[must_use]
    pub fn buffer_str(&mut self) -> String {
        self.buffer.as_str_lossy()
    }

    /// Find the earliest match of the watch-set and consume it from the buffer.
    ///
    /// Text before the match is consumed too and reported as [`Match::before`].
    pub fn next_match(&mut self) -> Option<Match> {
        let found = self.patterns.find_match(self.buffer.searchable())?;
        let pattern = self
            .patterns
            .get(found.index)
            .map(|p| p.pattern().to_string())
            .unwrap_or_default();

        let before = self.buffer.consume_str(found.start);
        let matched = self.buffer.consume_str(found.len());

        Some(Match::new(found.index, pattern, matched, before))
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
