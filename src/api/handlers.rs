//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{CacheError, Result};
use crate::lru::LruCache;
use crate::models::{
    DeleteResponse, GetManyResponse, GetResponse, HealthResponse, KeysRequest, SetRequest,
    SetResponse, StatsResponse, TruncateResponse,
};
use crate::service::ObjectCache;
use crate::storage::{new_lru, CapacityMode, Context, LruOptions};

/// Application state shared across all handlers.
///
/// The object cache is the only write path; the engine handle is kept for
/// statistics.
#[derive(Clone)]
pub struct AppState {
    pub cache: ObjectCache,
    pub engine: Arc<LruCache>,
    pub mode: CapacityMode,
}

impl AppState {
    /// Creates a new AppState backed by an LRU engine built from `options`.
    pub fn new(options: LruOptions) -> Result<Self> {
        let factory = new_lru(Some(options));
        let cache = ObjectCache::new(&factory)?;
        Ok(Self {
            cache,
            engine: factory.cache(),
            mode: factory.mode(),
        })
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        Self::new(config.lru_options())
    }
}

/// Handler for PUT /set
///
/// Stores a batch of key-value pairs.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let (keys, values, expirations) = req.into_parts();
    state
        .cache
        .set_multi(&Context::background(), &keys, &values, &expirations)
        .await?;

    Ok(Json(SetResponse::new(keys.len())))
}

/// Handler for GET /get/:key
///
/// Retrieves a single value; a miss becomes 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let mut values = state
        .cache
        .get_multi(&Context::background(), std::slice::from_ref(&key))
        .await?;

    match values.pop().flatten() {
        Some(bytes) => {
            let value = String::from_utf8_lossy(&bytes).into_owned();
            Ok(Json(GetResponse::new(key, value)))
        }
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for POST /get
///
/// Retrieves a batch; misses are `null` at their index.
pub async fn get_many_handler(
    State(state): State<AppState>,
    Json(req): Json<KeysRequest>,
) -> Result<Json<GetManyResponse>> {
    let values = state
        .cache
        .get_multi(&Context::background(), &req.keys)
        .await?;
    Ok(Json(GetManyResponse::from_bytes(values)))
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state
        .cache
        .delete(&Context::background(), std::slice::from_ref(&key))
        .await?;
    Ok(Json(DeleteResponse::new(1)))
}

/// Handler for POST /del
pub async fn delete_many_handler(
    State(state): State<AppState>,
    Json(req): Json<KeysRequest>,
) -> Result<Json<DeleteResponse>> {
    state.cache.delete(&Context::background(), &req.keys).await?;
    Ok(Json(DeleteResponse::new(req.keys.len())))
}

/// Handler for POST /truncate
pub async fn truncate_handler(State(state): State<AppState>) -> Result<Json<TruncateResponse>> {
    state.cache.truncate(&Context::background()).await?;
    Ok(Json(TruncateResponse::new()))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.engine.stats();
    Json(StatsResponse::new(stats, state.engine.capacity(), state.mode))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
