//! Compiled watch-sets.
//!
//! A [`Step`](crate::types::Step) carries its expectations as plain regular
//! expression strings. The engine compiles them into a [`PatternSet`] and
//! asks the set for the earliest match in the buffered output.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

/// A compiled regular expression with its source pattern.
#[derive(Clone)]
pub struct CompiledRegex {
    pattern: String,
    regex: Arc<Regex>,
}

impl CompiledRegex {
    /// Compile `pattern`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is invalid.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self::from_regex(pattern, Arc::new(Regex::new(pattern)?)))
    }

    /// Wrap an already compiled regex.
    #[must_use]
    pub fn from_regex(pattern: impl Into<String>, regex: Arc<Regex>) -> Self {
        Self {
            pattern: pattern.into(),
            regex,
        }
    }

    /// Get the source pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Get the compiled regex.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Check if the regex matches anywhere in `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Find the first match in the text.
    #[must_use]
    pub fn find<'a>(&self, text: &'a str) -> Option<regex::Match<'a>> {
        self.regex.find(text)
    }

    /// Capture groups of the first match, `None` for groups that did not participate.
    #[must_use]
    pub fn captures<'a>(&self, text: &'a str) -> Option<Vec<Option<&'a str>>> {
        self.regex
            .captures(text)
            .map(|caps| caps.iter().skip(1).map(|m| m.map(|m| m.as_str())).collect())
    }
}

impl fmt::Debug for CompiledRegex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompiledRegex({:?})", self.pattern)
    }
}

impl PartialEq for CompiledRegex {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

/// Result of a successful pattern match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// Index of the pattern within its set.
    pub index: usize,
    /// Start position of the match in the text.
    pub start: usize,
    /// End position of the match in the text.
    pub end: usize,
}

impl PatternMatch {
    /// Get the matched text from the original input.
    #[must_use]
    pub fn as_str<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }

    /// Get the length of the match.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the match is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// An ordered set of compiled expressions.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<CompiledRegex>,
}

impl PatternSet {
    /// Create a new empty pattern set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every expression in `expect`, in order.
    ///
    /// # Errors
    ///
    /// Returns the failing expression and its error.
    pub fn compile<S: AsRef<str>>(expect: &[S]) -> Result<Self, (String, regex::Error)> {
        let patterns = expect
            .iter()
            .map(|p| CompiledRegex::new(p.as_ref()).map_err(|e| (p.as_ref().to_string(), e)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Add a compiled pattern to the set.
    pub fn add(&mut self, pattern: CompiledRegex) -> &mut Self {
        self.patterns.push(pattern);
        self
    }

    /// Get the number of patterns in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Check if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Get a pattern by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&CompiledRegex> {
        self.patterns.get(index)
    }

    /// Find the earliest match of any pattern in the text.
    ///
    /// When two patterns match at the same position the one listed first wins.
    #[must_use]
    pub fn find_match(&self, text: &str) -> Option<PatternMatch> {
        let mut best: Option<PatternMatch> = None;

        for (index, compiled) in self.patterns.iter().enumerate() {
            if let Some(m) = compiled.find(text) {
                match &best {
                    Some(current) if m.start() >= current.start => {}
                    _ => {
                        best = Some(PatternMatch {
                            index,
                            start: m.start(),
                            end: m.end(),
                        });
                    }
                }
            }
        }

        best
    }

    /// Source expressions, in order.
    #[must_use]
    pub fn sources(&self) -> Vec<String> {
        self.patterns.iter().map(|p| p.pattern().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regex_pattern_matches() {
        let pattern = CompiledRegex::new(r"\d+").unwrap();
        let m = pattern.find("test 123 value").unwrap();
        assert_eq!(m.as_str(), "123");
    }

    #[test]
    fn optional_captures() {
        let pattern = CompiledRegex::new(r"(\d+) a(?:, (\d+) b)?").unwrap();
        let caps = pattern.captures("7 a").unwrap();
        assert_eq!(caps, vec![Some("7"), None]);
    }

    #[test]
    fn pattern_set_finds_earliest() {
        let set = PatternSet::compile(&["world", "hello"]).unwrap();
        let m = set.find_match("hello world").unwrap();
        // "hello" comes first in the text
        assert_eq!(m.index, 1);
        assert_eq!(m.as_str("hello world"), "hello");
    }

    #[test]
    fn pattern_set_tie_prefers_first() {
        let set = PatternSet::compile(&["hel+", "hello"]).unwrap();
        assert_eq!(set.find_match("hello").unwrap().index, 0);
    }

    #[test]
    fn compile_reports_bad_expression() {
        let (pattern, _) = PatternSet::compile(&["ok", "(unclosed"]).unwrap_err();
        assert_eq!(pattern, "(unclosed");
    }

    #[test]
    fn sources_round_trip() {
        let set = PatternSet::compile(&["a", "b"]).unwrap();
        assert_eq!(set.sources(), vec!["a", "b"]);
        assert_eq!(set.len(), 2);
        assert!(PatternSet::new().is_empty());
    }
}
