//! Redis backend for the Redlink registry.
//!
//! This crate provides:
//!
//! - [`RedisConfig`] — address, credential and database selection for one
//!   named connection.
//! - [`RedisHandle`] — a [`KvHandle`](redlink_core::KvHandle) over a single
//!   multiplexed `redis` connection, created by connect-and-verify (PING).
//! - [`register`] / [`register_all`] — connect and install handles into a
//!   [`Registry`](redlink_core::Registry) under their configuration names.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use redlink_core::Registry;
//! use redlink_redis::{register, RedisConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::new();
//! let config = RedisConfig {
//!     addr: "127.0.0.1:6379".to_string(),
//!     ..Default::default()
//! };
//! register(&registry, "cache", config).await?;
//!
//! registry.set("cache", "greeting", "hello", 0).await?;
//! let value = registry.get("cache", "greeting").await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;

pub use client::{register, register_all, RedisHandle};
pub use config::RedisConfig;

// Re-export core types for convenience.
pub use redlink_core::{KvHandle, RedlinkError, Registry};
