//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::lru::CacheStats;
use crate::storage::CapacityMode;

/// Response body for the single-key GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: String,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Response body for the batched GET operation (POST /get)
///
/// `values[i]` belongs to the i-th requested key; `null` marks a miss.
#[derive(Debug, Clone, Serialize)]
pub struct GetManyResponse {
    pub values: Vec<Option<String>>,
}

impl GetManyResponse {
    /// Converts stored bytes to text, replacing invalid UTF-8.
    pub fn from_bytes(values: Vec<Option<Vec<u8>>>) -> Self {
        Self {
            values: values
                .into_iter()
                .map(|value| value.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
                .collect(),
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// Number of keys written
    pub count: usize,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(count: usize) -> Self {
        Self {
            message: format!("{} key(s) set successfully", count),
            count,
        }
    }
}

/// Response body for the DELETE operations (DELETE /del/:key, POST /del)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// Number of keys requested for deletion
    pub count: usize,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(count: usize) -> Self {
        Self {
            message: format!("{} key(s) deleted", count),
            count,
        }
    }
}

/// Response body for POST /truncate
#[derive(Debug, Clone, Serialize)]
pub struct TruncateResponse {
    pub message: String,
}

impl TruncateResponse {
    pub fn new() -> Self {
        Self {
            message: "Cache truncated".to_string(),
        }
    }
}

impl Default for TruncateResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response body for the stats endpoint (GET /stats)
///
/// Engine counters are flattened into the top-level object.
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Maximum total weight
    pub capacity: u64,
    /// Whether weight counts objects or bytes
    pub mode: CapacityMode,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from an engine snapshot
    pub fn new(stats: CacheStats, capacity: u64, mode: CapacityMode) -> Self {
        let hit_rate = stats.hit_rate();
        Self {
            stats,
            capacity,
            mode,
            hit_rate,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
