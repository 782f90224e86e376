//! Storage Module
//!
//! The backend-agnostic cache front: the [`Storage`] capability trait every
//! backend implements, and the [`StorageFactory`] convention that lets a
//! backend report construction failure before first use.

mod context;
mod lru;

pub use context::Context;
pub use lru::{new_lru, CapacityMode, LruFactory, LruOptions, LruStorage};

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

// == Storage Trait ==
/// Batched, byte-oriented cache backend.
///
/// Keys, values and expirations are parallel sequences. A missing key is
/// never an error: `get` returns `None` in its slot, and the result always
/// has the same length and order as the requested keys. Errors from
/// backends are surfaced to callers as-is.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Stores `values[i]` under `keys[i]`. `expirations[i]`, when present,
    /// is a hint the backend may honor or ignore.
    async fn set(
        &self,
        ctx: &Context,
        keys: &[String],
        values: &[Vec<u8>],
        expirations: &[Option<Duration>],
    ) -> Result<()>;

    /// Looks up every key, `None` marking a miss.
    async fn get(&self, ctx: &Context, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>>;

    /// Removes every key. Absent keys are ignored.
    async fn delete(&self, ctx: &Context, keys: &[String]) -> Result<()>;

    /// Removes all entries.
    async fn truncate(&self, ctx: &Context) -> Result<()>;

    /// Releases backend resources. Must be safe to call more than once.
    async fn close(&self) -> Result<()>;
}

// == Storage Factory ==
/// Deferred backend constructor.
///
/// Fallible setup (dialing a server, reading credentials) happens in
/// `build`, so callers can treat every backend the same way and fail fast
/// at startup.
pub trait StorageFactory: Send + Sync {
    fn build(&self) -> Result<Box<dyn Storage>>;
}

impl<F> StorageFactory for F
where
    F: Fn() -> Result<Box<dyn Storage>> + Send + Sync,
{
    fn build(&self) -> Result<Box<dyn Storage>> {
        self()
    }
}
