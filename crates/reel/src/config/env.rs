//! Environment-based configuration.

use std::collections::HashMap;
use std::time::Duration;

/// Environment configuration prefix.
pub const DEFAULT_PREFIX: &str = "REEL";

/// Environment variable reader.
///
/// Values set with [`EnvConfig::with_var`] shadow the process environment,
/// which keeps tests away from the global environment.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    prefix: String,
    overrides: HashMap<String, String>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl EnvConfig {
    /// Create a new environment config reader.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            overrides: HashMap::new(),
        }
    }

    /// Shadow `name` with `value`.
    #[must_use]
    pub fn with_var(mut self, name: &str, value: impl Into<String>) -> Self {
        self.overrides.insert(self.var_name(name), value.into());
        self
    }

    /// Build the full environment variable name.
    fn var_name(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_uppercase()
        } else {
            format!("{}_{}", self.prefix, name.to_uppercase())
        }
    }

    /// Get a string value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let var_name = self.var_name(name);
        self.overrides
            .get(&var_name)
            .cloned()
            .or_else(|| std::env::var(&var_name).ok())
    }

    /// Get a parsed value.
    #[must_use]
    pub fn parse<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| v.trim().parse().ok())
    }

    /// Get a parsed value with default.
    #[must_use]
    pub fn parse_or<T: std::str::FromStr>(&self, name: &str, default: T) -> T {
        self.parse(name).unwrap_or(default)
    }

    /// Get a duration in seconds.
    #[must_use]
    pub fn duration_secs(&self, name: &str) -> Option<Duration> {
        self.parse::<u64>(name).map(Duration::from_secs)
    }

    /// Get a duration in milliseconds.
    #[must_use]
    pub fn duration_millis(&self, name: &str) -> Option<Duration> {
        self.parse::<u64>(name).map(Duration::from_millis)
    }

    /// Check if a variable is set.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Variable names read by [`ReelConfig::with_env`](super::ReelConfig::with_env).
pub mod vars {
    /// Default step timeout, in seconds.
    pub const TIMEOUT: &str = "TIMEOUT";
    /// Default step timeout, in milliseconds (wins over `TIMEOUT`).
    pub const TIMEOUT_MS: &str = "TIMEOUT_MS";
    /// Engine buffer size in bytes.
    pub const BUFFER_SIZE: &str = "BUFFER_SIZE";
    /// Step limit per interaction.
    pub const MAX_STEPS: &str = "MAX_STEPS";
    /// Probe program.
    pub const PING_PROGRAM: &str = "PING_PROGRAM";
    /// Probe count.
    pub const PING_COUNT: &str = "PING_COUNT";
}
