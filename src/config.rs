//! Configuration Module
//!
//! Cleaner tuning parameters. Out-of-range values are never rejected: they
//! are silently replaced by the defaults so a cache can always be built.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

// == Configuration Constants ==
/// Default delay between cleaner ticks, in milliseconds
pub const DEFAULT_CLEANER_INTERVAL_MS: u64 = 200;
/// Smallest accepted delay between cleaner ticks, in milliseconds
pub const MIN_CLEANER_INTERVAL_MS: u64 = 50;
/// Default number of entries sampled per cleaner round
pub const DEFAULT_SAMPLE_SIZE_PER_CYCLE: usize = 20;
/// Smallest accepted number of entries sampled per cleaner round
pub const MIN_SAMPLE_SIZE_PER_CYCLE: usize = 5;

/// Cache configuration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Delay between cleaner ticks in milliseconds
    pub cleaner_interval_ms: u64,
    /// Number of entries the cleaner samples per round
    pub sample_size_per_cycle: usize,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `ACTIVE_CACHE_CLEANER_INTERVAL_MS` - Cleaner interval (default: 200)
    /// - `ACTIVE_CACHE_SAMPLE_SIZE` - Entries sampled per round (default: 20)
    ///
    /// The result is normalized, so values below the minimums fall back to
    /// the defaults as well.
    pub fn from_env() -> Self {
        Self {
            cleaner_interval_ms: env::var("ACTIVE_CACHE_CLEANER_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CLEANER_INTERVAL_MS),
            sample_size_per_cycle: env::var("ACTIVE_CACHE_SAMPLE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SAMPLE_SIZE_PER_CYCLE),
        }
        .normalized()
    }

    /// Sets the cleaner interval in milliseconds.
    pub fn with_cleaner_interval_ms(mut self, ms: u64) -> Self {
        self.cleaner_interval_ms = ms;
        self
    }

    /// Sets the number of entries sampled per round.
    pub fn with_sample_size_per_cycle(mut self, size: usize) -> Self {
        self.sample_size_per_cycle = size;
        self
    }

    // == Normalize ==
    /// Replaces every value below its minimum with the default.
    ///
    /// Each field is checked independently; valid fields are left untouched.
    pub fn normalized(mut self) -> Self {
        if self.cleaner_interval_ms < MIN_CLEANER_INTERVAL_MS {
            warn!(
                "cleaner_interval_ms={} is below the minimum of {}, using {}",
                self.cleaner_interval_ms, MIN_CLEANER_INTERVAL_MS, DEFAULT_CLEANER_INTERVAL_MS
            );
            self.cleaner_interval_ms = DEFAULT_CLEANER_INTERVAL_MS;
        }
        if self.sample_size_per_cycle < MIN_SAMPLE_SIZE_PER_CYCLE {
            warn!(
                "sample_size_per_cycle={} is below the minimum of {}, using {}",
                self.sample_size_per_cycle, MIN_SAMPLE_SIZE_PER_CYCLE, DEFAULT_SAMPLE_SIZE_PER_CYCLE
            );
            self.sample_size_per_cycle = DEFAULT_SAMPLE_SIZE_PER_CYCLE;
        }
        self
    }

    /// Returns the cleaner interval as a Duration.
    pub fn cleaner_interval(&self) -> Duration {
        Duration::from_millis(self.cleaner_interval_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cleaner_interval_ms: DEFAULT_CLEANER_INTERVAL_MS,
            sample_size_per_cycle: DEFAULT_SAMPLE_SIZE_PER_CYCLE,
        }
    }
}
