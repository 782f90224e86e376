//! LRU Module
//!
//! The default eviction engine: a capacity-bounded store that evicts the
//! least recently used entries, weighted either per item or per byte.

mod engine;
mod entry;
mod list;
mod stats;


// Re-export public types
pub use engine::LruCache;
pub use entry::CacheEntry;
pub use list::RecencyList;
pub use stats::CacheStats;
