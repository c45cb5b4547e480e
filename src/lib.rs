//! Active Cache - An in-memory key/value cache with active expiration
//!
//! Entries carry an optional time-to-live. Expired entries are hidden from
//! readers immediately and reclaimed by a background cleaner that samples
//! the table at a fixed interval, escalating when many samples are stale.

pub mod cache;
pub mod config;
pub mod error;
mod tasks;

pub use cache::{Cache, Ttl};
pub use config::CacheConfig;
pub use error::CacheError;
