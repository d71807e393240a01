//! Configuration Module
//!
//! Handles loading process configuration from environment variables.

use std::env;

use crate::cache::DEFAULT_CAPACITY;

/// Default seconds between statistics reports
const DEFAULT_STATS_INTERVAL: u64 = 60;

/// Process configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Entry count at which the object cache flushes
    pub cache_capacity: usize,
    /// Seconds between statistics reports, 0 disables reporting
    pub stats_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 100, minimum: 1)
    /// - `STATS_INTERVAL` - Stats report period in seconds (default: 60)
    pub fn from_env() -> Self {
        Self {
            cache_capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(DEFAULT_CAPACITY)
                .max(1),
            stats_interval: env::var("STATS_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_STATS_INTERVAL),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CAPACITY,
            stats_interval: DEFAULT_STATS_INTERVAL,
        }
    }
}
