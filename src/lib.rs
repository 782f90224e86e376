//! objcache - An in-process object cache
//!
//! A pluggable storage front ([`storage::Storage`]) with a default backend
//! bounded by object count or total bytes and evicting least recently used
//! entries.

pub mod api;
pub mod config;
pub mod error;
pub mod lru;
pub mod models;
pub mod service;
pub mod storage;

pub use api::AppState;
pub use config::Config;
pub use error::{CacheError, Result};
pub use service::ObjectCache;
pub use storage::{new_lru, CapacityMode, Context, LruOptions, Storage, StorageFactory};
