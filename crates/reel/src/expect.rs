//! Expect pattern matching module.
//!
//! This module provides the matching machinery the engine uses to turn
//! streamed output into handler callbacks: compiled watch-sets, a regex
//! cache, and the output buffer.

mod buffer;
mod cache;
mod matcher;
mod pattern;

pub use buffer::{DEFAULT_CAPACITY, RingBuffer};
pub use cache::{DEFAULT_CACHE_SIZE, RegexCache};
pub use matcher::Matcher;
pub use pattern::{CompiledRegex, PatternMatch, PatternSet};
