//! Configuration types for reel.
//!
//! [`ReelConfig`] carries the engine limits and the defaults handlers are
//! built from. It can be assembled with builder methods, read from `REEL_*`
//! environment variables, or loaded from a TOML or JSON file.
//!
//! ```toml
//! timeout_ms = 2000
//! buffer_size = 65536
//! max_steps = 500
//!
//! [ping]
//! program = "ping"
//! count = 4
//! ```

pub mod env;

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use env::EnvConfig;

use crate::error::{ReelError, Result};
use crate::expect::DEFAULT_CAPACITY;

/// Default per-step timeout (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default limit on steps in one interaction.
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// Default probe program.
pub const DEFAULT_PING_PROGRAM: &str = "ping";

/// Default probe count.
pub const DEFAULT_PING_COUNT: i32 = 1;

/// Configuration for the engine and the handlers it drives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReelConfig {
    /// Timeout used when a step carries a zero timeout.
    pub default_timeout: Duration,

    /// Maximum bytes of unmatched output kept by the engine.
    pub buffer_size: usize,

    /// Maximum steps before the engine gives up on an interaction.
    pub max_steps: usize,

    /// Probe handler defaults.
    pub ping: PingConfig,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
            buffer_size: DEFAULT_CAPACITY,
            max_steps: DEFAULT_MAX_STEPS,
            ping: PingConfig::default(),
        }
    }
}

impl ReelConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Set the buffer size.
    #[must_use]
    pub const fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Set the step limit.
    #[must_use]
    pub const fn max_steps(mut self, max: usize) -> Self {
        self.max_steps = max;
        self
    }

    /// Set the probe program.
    #[must_use]
    pub fn ping_program(mut self, program: impl Into<String>) -> Self {
        self.ping.program = program.into();
        self
    }

    /// Set the probe count.
    #[must_use]
    pub const fn ping_count(mut self, count: i32) -> Self {
        self.ping.count = count;
        self
    }

    /// Overlay `REEL_*` environment variables on the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env(&EnvConfig::default())
    }

    /// Overlay values found through `env` on this configuration.
    #[must_use]
    pub fn with_env(mut self, env: &EnvConfig) -> Self {
        if let Some(timeout) = env
            .duration_millis(env::vars::TIMEOUT_MS)
            .or_else(|| env.duration_secs(env::vars::TIMEOUT))
        {
            self.default_timeout = timeout;
        }
        self.buffer_size = env.parse_or(env::vars::BUFFER_SIZE, self.buffer_size);
        self.max_steps = env.parse_or(env::vars::MAX_STEPS, self.max_steps);
        if let Some(program) = env.get(env::vars::PING_PROGRAM) {
            self.ping.program = program;
        }
        self.ping.count = env.parse_or(env::vars::PING_COUNT, self.ping.count);
        self
    }

    /// Load a configuration file, choosing the format from its extension.
    ///
    /// `.json` files are parsed as JSON, everything else as TOML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ReelError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ReelError::config(e.to_string()))?;
        file.into_config()
    }

    /// Parse a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: ConfigFile =
            serde_json::from_str(content).map_err(|e| ReelError::config(e.to_string()))?;
        file.into_config()
    }

    /// Check the configuration for values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.default_timeout.is_zero() {
            return Err(ReelError::config("default timeout must be non-zero"));
        }
        if self.buffer_size == 0 {
            return Err(ReelError::config("buffer size must be non-zero"));
        }
        if self.max_steps == 0 {
            return Err(ReelError::config("max steps must be non-zero"));
        }
        if self.ping.program.trim().is_empty() {
            return Err(ReelError::config("ping program must not be empty"));
        }
        Ok(())
    }
}

/// Probe handler defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PingConfig {
    /// Program invoked for a probe.
    pub program: String,
    /// Echo requests per probe; zero or negative means unbounded.
    pub count: i32,
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PING_PROGRAM.to_string(),
            count: DEFAULT_PING_COUNT,
        }
    }
}

/// On-disk shape of [`ReelConfig`]; durations are in milliseconds.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    timeout_ms: Option<u64>,
    buffer_size: Option<usize>,
    max_steps: Option<usize>,
    ping: PingConfig,
}

impl ConfigFile {
    fn into_config(self) -> Result<ReelConfig> {
        let defaults = ReelConfig::default();
        let config = ReelConfig {
            default_timeout: self
                .timeout_ms
                .map_or(defaults.default_timeout, Duration::from_millis),
            buffer_size: self.buffer_size.unwrap_or(defaults.buffer_size),
            max_steps: self.max_steps.unwrap_or(defaults.max_steps),
            ping: self.ping,
        };
        config.validate()?;
        Ok(config)
    }
}
