//! Regex cache for watch-sets.
//!
//! Handlers usually return the same watch-set on every continuation step.
//! The cache keeps compiled expressions so the engine compiles each one once
//! per interaction.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use super::pattern::{CompiledRegex, PatternSet};

/// Default maximum cache size.
pub const DEFAULT_CACHE_SIZE: usize = 100;

/// A cache for compiled regular expressions with FIFO eviction.
#[derive(Debug)]
pub struct RegexCache {
    entries: HashMap<String, Arc<Regex>>,
    order: Vec<String>,
    max_size: usize,
    hits: usize,
    misses: usize,
}

impl RegexCache {
    /// Create a new regex cache with the specified maximum size.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(max_size),
            order: Vec::with_capacity(max_size),
            max_size: max_size.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Create a new regex cache with default size.
    #[must_use]
    pub fn with_default_size() -> Self {
        Self::new(DEFAULT_CACHE_SIZE)
    }

    /// Get or compile a regex pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is invalid.
    pub fn get_or_compile(&mut self, pattern: &str) -> Result<Arc<Regex>, regex::Error> {
        if let Some(regex) = self.entries.get(pattern) {
            self.hits += 1;
            return Ok(Arc::clone(regex));
        }

        self.misses += 1;
        let regex = Arc::new(Regex::new(pattern)?);

        if self.entries.len() >= self.max_size && !self.order.is_empty() {
            let oldest = self.order.remove(0);
            self.entries.remove(&oldest);
        }
        self.entries.insert(pattern.to_string(), Arc::clone(&regex));
        self.order.push(pattern.to_string());

        Ok(regex)
    }

    /// Compile a whole watch-set through the cache.
    ///
    /// # Errors
    ///
    /// Returns the failing expression and its error.
    pub fn compile_set<S: AsRef<str>>(
        &mut self,
        expect: &[S],
    ) -> Result<PatternSet, (String, regex::Error)> {
        let mut set = PatternSet::new();
        for pattern in expect {
            let pattern = pattern.as_ref();
            let regex = self
                .get_or_compile(pattern)
                .map_err(|e| (pattern.to_string(), e))?;
            set.add(CompiledRegex::from_regex(pattern, regex));
        }
        Ok(set)
    }

    /// Check if a pattern is cached.
    #[must_use]
    pub fn contains(&self, pattern: &str) -> bool {
        self.entries.contains_key(pattern)
    }

    /// Get the current number of cached patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses) since creation.
    #[must_use]
    pub const fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}

impl Default for RegexCache {
    fn default() -> Self {
        Self::with_default_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caches_compiled_patterns() {
        let mut cache = RegexCache::new(10);
        cache.get_or_compile(r"\d+").unwrap();
        cache.get_or_compile(r"\d+").unwrap();
        assert!(cache.contains(r"\d+"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn evicts_oldest() {
        let mut cache = RegexCache::new(2);
        cache.get_or_compile("a").unwrap();
        cache.get_or_compile("b").unwrap();
        cache.get_or_compile("c").unwrap();
        assert!(!cache.contains("a"));
        assert!(cache.contains("c"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn compile_set_keeps_order() {
        let mut cache = RegexCache::default();
        let set = cache.compile_set(&["x", "y"]).unwrap();
        assert_eq!(set.sources(), vec!["x", "y"]);

        let err = cache.compile_set(&["["]).unwrap_err();
        assert_eq!(err.0, "[");
        assert!(cache.is_empty() || !cache.contains("["));
    }
}
