//! Configuration Module
//!
//! Handles loading server configuration from environment variables.

use std::env;

use crate::storage::LruOptions;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache capacity in objects or bytes; 0 applies the mode default
    pub capacity: u64,
    /// Bound the cache by total value bytes instead of entry count
    pub track_by_size: bool,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Capacity, 0 for the mode default (default: 0)
    /// - `CACHE_TRACK_BY_SIZE` - `true`/`1` to bound by bytes (default: false)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        Self {
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            track_by_size: env::var("CACHE_TRACK_BY_SIZE")
                .ok()
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        }
    }

    /// Backend options derived from this configuration.
    pub fn lru_options(&self) -> LruOptions {
        if self.track_by_size {
            LruOptions::by_size(self.capacity)
        } else {
            LruOptions::by_object_count(self.capacity)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 0,
            track_by_size: false,
            server_port: 3000,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
