//! Error types for reel.
//!
//! Handlers never fail: a probe that goes wrong is expressed through its
//! [`Outcome`](crate::types::Outcome). The errors here belong to the layer
//! around the contract, the engine that drives handlers and the
//! configuration that parameterizes them.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for reel operations.
#[derive(Debug, Error)]
pub enum ReelError {
    /// An I/O error occurred on the transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A handler asked the engine to watch for an expression that does not compile.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending expression, as the handler supplied it.
        pattern: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// The interaction did not reach a terminal step within the allowed number of steps.
    #[error("interaction exceeded maximum steps ({max})")]
    TooManySteps {
        /// The configured limit.
        max: usize,
    },

    /// Configuration error.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// A configuration file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    ConfigFile {
        /// Path of the file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl ReelError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Check if this error came from the transport.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Result type alias for reel operations.
pub type Result<T> = std::result::Result<T, ReelError>;
