//! Convenient re-exports for common reel usage.
//!
//! # Example
//!
//! ```ignore
//! use reel::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ReelConfig::from_env();
//!     let mut ping = Ping::from_config(&config, "192.168.1.1");
//!     let transport = spawn_somehow(&ping.arguments()).await?;
//!     let report = drive(transport, &mut ping, config).await?;
//!     println!("{}: {}", report.outcome, ping.ping_stats());
//!     Ok(())
//! }
//! ```

// Contract
pub use crate::contract::{Reel, ReelPhase};
pub use crate::types::{CTRL_C, Match, Outcome, Step};

// Configuration
pub use crate::config::{EnvConfig, PingConfig, ReelConfig};

// Error handling
pub use crate::error::{ReelError, Result};

// Engine
pub use crate::engine::{ReelEnd, ReelEngine, ReelReport, drive};

// Handlers
pub use crate::handlers::{Ping, PingStats, ping_cmd};

// Mock transport
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::{MockBuilder, MockTransport};
