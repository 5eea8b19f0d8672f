//! Concrete command handlers.
//!
//! Each handler implements [`Reel`](crate::contract::Reel) for one command.
//! The engine is generic over the contract, so adding a command means adding
//! a module here.

pub mod ping;

pub use ping::{Ping, PingStats, ping_cmd};
