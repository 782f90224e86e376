//! LRU Storage Backend
//!
//! Adapts the eviction engine to the batched [`Storage`] contract and maps
//! the configured weighting policy onto it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{CacheError, Result};
use crate::lru::LruCache;
use crate::storage::{Context, Storage, StorageFactory};

// == Defaults ==
/// Default capacity in bytes when tracking by size (64 MiB).
pub const DEFAULT_SIZE_CAPACITY: u64 = 1 << 26;

/// Default capacity in objects when tracking by count.
pub const DEFAULT_COUNT_CAPACITY: u64 = 5000;

// == Capacity Mode ==
/// How entries are charged against the capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityMode {
    /// Every entry weighs 1
    ByObjectCount,
    /// Every entry weighs its value's byte length
    ByTotalSize,
}

impl CapacityMode {
    pub fn weight_of(self, value: &[u8]) -> u64 {
        match self {
            CapacityMode::ByObjectCount => 1,
            CapacityMode::ByTotalSize => value.len() as u64,
        }
    }
}

// == LRU Options ==
/// Configuration for the LRU backend.
///
/// Fields are normalized rather than validated; see [`LruOptions::resolve`].
#[derive(Debug, Clone, Default)]
pub struct LruOptions {
    /// Capacity in objects or bytes, 0 for the mode default
    pub capacity: u64,
    /// Charge entries by byte length. Capacity is then in bytes.
    pub track_by_size: bool,
    /// Charge every entry as 1 (the default)
    pub track_by_object_count: bool,
    /// Pre-built engine, letting several backends share one eviction domain
    pub cache: Option<Arc<LruCache>>,
}

impl LruOptions {
    /// Count-bounded options. A zero capacity means 5000 objects.
    pub fn by_object_count(capacity: u64) -> Self {
        Self {
            capacity,
            track_by_object_count: true,
            ..Self::default()
        }
    }

    /// Size-bounded options. A zero capacity means 64 MiB.
    pub fn by_size(capacity: u64) -> Self {
        Self {
            capacity,
            track_by_size: true,
            ..Self::default()
        }
    }

    /// Shares an existing engine instead of creating a new one.
    pub fn with_cache(mut self, cache: Arc<LruCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Applies the default rules, first match wins:
    ///
    /// 1. by size, no capacity: 64 MiB
    /// 2. by count, no capacity: 5000 objects
    /// 3. by size or by count with a capacity: kept as given
    /// 4. neither flag: by count, 5000 objects
    pub fn resolve(mut self) -> Self {
        match (self.track_by_size, self.track_by_object_count) {
            (true, _) if self.capacity == 0 => self.capacity = DEFAULT_SIZE_CAPACITY,
            (false, true) if self.capacity == 0 => self.capacity = DEFAULT_COUNT_CAPACITY,
            (true, _) | (false, true) => {}
            (false, false) => {
                self.track_by_object_count = true;
                self.capacity = DEFAULT_COUNT_CAPACITY;
            }
        }
        self
    }

    /// Size tracking wins when both flags are set.
    pub fn mode(&self) -> CapacityMode {
        if self.track_by_size {
            CapacityMode::ByTotalSize
        } else {
            CapacityMode::ByObjectCount
        }
    }
}

// == Factory ==
/// Builds [`LruStorage`] values that all share one engine.
#[derive(Debug, Clone)]
pub struct LruFactory {
    options: LruOptions,
    cache: Arc<LruCache>,
}

/// Resolves `options` (defaults when `None`) and creates the engine unless
/// one was supplied. Building from the returned factory never fails.
pub fn new_lru(options: Option<LruOptions>) -> LruFactory {
    let mut options = options.unwrap_or_default().resolve();
    let capacity = options.capacity;
    let cache = options
        .cache
        .get_or_insert_with(|| Arc::new(LruCache::new(capacity)))
        .clone();

    info!(
        capacity = cache.capacity(),
        mode = ?options.mode(),
        "LRU storage configured"
    );

    LruFactory { options, cache }
}

impl LruFactory {
    /// The resolved options snapshot.
    pub fn options(&self) -> &LruOptions {
        &self.options
    }

    /// The engine every built backend writes to.
    pub fn cache(&self) -> Arc<LruCache> {
        self.cache.clone()
    }

    pub fn mode(&self) -> CapacityMode {
        self.options.mode()
    }
}

impl StorageFactory for LruFactory {
    fn build(&self) -> Result<Box<dyn Storage>> {
        Ok(Box::new(LruStorage::new(self.cache.clone(), self.mode())))
    }
}

// == LRU Storage ==
/// In-memory backend over a shared [`LruCache`].
///
/// Expirations are accepted but never enforced: entries leave only under
/// capacity pressure, deletion or truncation. The context is ignored since
/// nothing here blocks. Each key in a batch is applied atomically, but the
/// batch as a whole is not.
#[derive(Debug, Clone)]
pub struct LruStorage {
    cache: Arc<LruCache>,
    mode: CapacityMode,
}

impl LruStorage {
    pub fn new(cache: Arc<LruCache>, mode: CapacityMode) -> Self {
        Self { cache, mode }
    }
}

#[async_trait]
impl Storage for LruStorage {
    async fn set(
        &self,
        _ctx: &Context,
        keys: &[String],
        values: &[Vec<u8>],
        _expirations: &[Option<Duration>],
    ) -> Result<()> {
        if keys.len() != values.len() {
            return Err(CacheError::LengthMismatch {
                keys: keys.len(),
                values: values.len(),
            });
        }

        let mut evicted = 0;
        for (key, value) in keys.iter().zip(values) {
            let weight = self.mode.weight_of(value);
            evicted += self.cache.set(key.as_str(), value.clone(), weight);
        }

        if evicted > 0 {
            debug!(keys = keys.len(), evicted, "LRU batch set evicted entries");
        }
        Ok(())
    }

    async fn get(&self, _ctx: &Context, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>> {
        Ok(keys.iter().map(|key| self.cache.get(key)).collect())
    }

    async fn delete(&self, _ctx: &Context, keys: &[String]) -> Result<()> {
        for key in keys {
            self.cache.delete(key);
        }
        Ok(())
    }

    async fn truncate(&self, _ctx: &Context) -> Result<()> {
        self.cache.clear();
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.cache.clear();
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn build(options: LruOptions) -> Box<dyn Storage> {
        new_lru(Some(options)).build().unwrap()
    }

    #[test]
    fn test_resolve_defaults_to_object_count() {
        let opts = LruOptions::default().resolve();
        assert!(opts.track_by_object_count);
        assert!(!opts.track_by_size);
        assert_eq!(opts.capacity, 5000);
        assert_eq!(opts.mode(), CapacityMode::ByObjectCount);
    }

    #[test]
    fn test_resolve_size_default_capacity() {
        let opts = LruOptions::by_size(0).resolve();
        assert_eq!(opts.capacity, 67_108_864);
        assert_eq!(opts.mode(), CapacityMode::ByTotalSize);
    }

    #[test]
    fn test_resolve_count_default_capacity() {
        let opts = LruOptions::by_object_count(0).resolve();
        assert_eq!(opts.capacity, 5000);
    }

    #[test]
    fn test_resolve_keeps_explicit_capacity() {
        assert_eq!(LruOptions::by_size(1024).resolve().capacity, 1024);
        assert_eq!(LruOptions::by_object_count(7).resolve().capacity, 7);
    }

    #[test]
    fn test_resolve_capacity_without_mode_is_overridden() {
        let opts = LruOptions {
            capacity: 42,
            ..LruOptions::default()
        }
        .resolve();
        assert_eq!(opts.capacity, 5000);
        assert!(opts.track_by_object_count);
    }

    #[test]
    fn test_resolve_both_flags_prefers_size() {
        let opts = LruOptions {
            track_by_size: true,
            track_by_object_count: true,
            ..LruOptions::default()
        }
        .resolve();
        assert_eq!(opts.capacity, DEFAULT_SIZE_CAPACITY);
        assert_eq!(opts.mode(), CapacityMode::ByTotalSize);
    }

    #[test]
    fn test_new_lru_without_options() {
        let factory = new_lru(None);
        assert_eq!(factory.cache().capacity(), 5000);
        assert_eq!(factory.mode(), CapacityMode::ByObjectCount);
        assert!(factory.options().cache.is_some());
    }

    #[test]
    fn test_weight_of() {
        assert_eq!(CapacityMode::ByObjectCount.weight_of(b"hello"), 1);
        assert_eq!(CapacityMode::ByTotalSize.weight_of(b"hello"), 5);
        assert_eq!(CapacityMode::ByTotalSize.weight_of(b""), 0);
    }

    #[tokio::test]
    async fn test_count_mode_evicts_oldest() {
        let storage = build(LruOptions::by_object_count(2));
        let ctx = Context::background();

        for (key, value) in [("a", "X"), ("b", "Y"), ("c", "Z")] {
            storage
                .set(&ctx, &keys(&[key]), &[value.as_bytes().to_vec()], &[])
                .await
                .unwrap();
        }

        let values = storage.get(&ctx, &keys(&["a", "b", "c"])).await.unwrap();
        assert_eq!(values, vec![None, Some(b"Y".to_vec()), Some(b"Z".to_vec())]);
    }

    #[tokio::test]
    async fn test_size_mode_evicts_by_bytes() {
        let storage = build(LruOptions::by_size(10));
        let ctx = Context::background();

        storage
            .set(&ctx, &keys(&["x"]), &[vec![b'x'; 6]], &[None])
            .await
            .unwrap();
        storage
            .set(&ctx, &keys(&["y"]), &[vec![b'y'; 6]], &[None])
            .await
            .unwrap();

        let values = storage.get(&ctx, &keys(&["x", "y"])).await.unwrap();
        assert_eq!(values, vec![None, Some(vec![b'y'; 6])]);
    }

    #[tokio::test]
    async fn test_get_promotes_entry() {
        let storage = build(LruOptions::by_object_count(2));
        let ctx = Context::background();

        storage
            .set(&ctx, &keys(&["a", "b"]), &[b"X".to_vec(), b"Y".to_vec()], &[])
            .await
            .unwrap();
        storage.get(&ctx, &keys(&["a"])).await.unwrap();
        storage
            .set(&ctx, &keys(&["c"]), &[b"Z".to_vec()], &[])
            .await
            .unwrap();

        let values = storage.get(&ctx, &keys(&["a", "b", "c"])).await.unwrap();
        assert_eq!(values, vec![Some(b"X".to_vec()), None, Some(b"Z".to_vec())]);
    }

    #[tokio::test]
    async fn test_get_keeps_positions_on_miss() {
        let storage = build(LruOptions::default());
        let ctx = Context::background();

        storage
            .set(&ctx, &keys(&["k2"]), &[b"two".to_vec()], &[])
            .await
            .unwrap();

        let values = storage
            .get(&ctx, &keys(&["k1", "k2", "k3", "k2"]))
            .await
            .unwrap();
        assert_eq!(
            values,
            vec![None, Some(b"two".to_vec()), None, Some(b"two".to_vec())]
        );
    }

    #[tokio::test]
    async fn test_set_length_mismatch() {
        let storage = build(LruOptions::default());
        let ctx = Context::background();

        let result = storage
            .set(&ctx, &keys(&["a", "b"]), &[b"1".to_vec()], &[])
            .await;
        assert!(matches!(
            result,
            Err(CacheError::LengthMismatch { keys: 2, values: 1 })
        ));

        let values = storage.get(&ctx, &keys(&["a"])).await.unwrap();
        assert_eq!(values, vec![None]);
    }

    #[tokio::test]
    async fn test_expirations_are_ignored() {
        let storage = build(LruOptions::default());
        let ctx = Context::background();

        storage
            .set(
                &ctx,
                &keys(&["a"]),
                &[b"1".to_vec()],
                &[Some(Duration::from_millis(1))],
            )
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let values = storage.get(&ctx, &keys(&["a"])).await.unwrap();
        assert_eq!(values, vec![Some(b"1".to_vec())]);
    }

    #[tokio::test]
    async fn test_cancelled_context_is_ignored() {
        let storage = build(LruOptions::default());
        let ctx = Context::background();
        ctx.cancel();

        storage
            .set(&ctx, &keys(&["a"]), &[b"1".to_vec()], &[])
            .await
            .unwrap();
        let values = storage.get(&ctx, &keys(&["a"])).await.unwrap();
        assert_eq!(values, vec![Some(b"1".to_vec())]);
    }

    #[tokio::test]
    async fn test_delete_absent_key_is_ok() {
        let storage = build(LruOptions::default());
        let ctx = Context::background();

        storage
            .set(&ctx, &keys(&["a"]), &[b"1".to_vec()], &[])
            .await
            .unwrap();
        storage.delete(&ctx, &keys(&["missing", "a"])).await.unwrap();
        storage.delete(&ctx, &keys(&["missing"])).await.unwrap();

        let values = storage.get(&ctx, &keys(&["a"])).await.unwrap();
        assert_eq!(values, vec![None]);
    }

    #[tokio::test]
    async fn test_truncate_empties_cache() {
        let factory = new_lru(None);
        let storage = factory.build().unwrap();
        let ctx = Context::background();

        storage
            .set(&ctx, &keys(&["a", "b"]), &[b"1".to_vec(), b"2".to_vec()], &[])
            .await
            .unwrap();
        storage.truncate(&ctx).await.unwrap();

        assert!(factory.cache().is_empty());
        let values = storage.get(&ctx, &keys(&["a", "b"])).await.unwrap();
        assert_eq!(values, vec![None, None]);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let factory = new_lru(None);
        let storage = factory.build().unwrap();
        let ctx = Context::background();

        storage
            .set(&ctx, &keys(&["a"]), &[b"1".to_vec()], &[])
            .await
            .unwrap();

        storage.close().await.unwrap();
        storage.close().await.unwrap();
        assert!(factory.cache().is_empty());
    }

    #[tokio::test]
    async fn test_backends_share_injected_engine() {
        let shared = Arc::new(LruCache::new(3));
        let first = build(LruOptions::by_object_count(3).with_cache(shared.clone()));
        let second = build(LruOptions::by_object_count(3).with_cache(shared.clone()));
        let ctx = Context::background();

        first
            .set(&ctx, &keys(&["a"]), &[b"1".to_vec()], &[])
            .await
            .unwrap();

        let values = second.get(&ctx, &keys(&["a"])).await.unwrap();
        assert_eq!(values, vec![Some(b"1".to_vec())]);
        assert_eq!(shared.len(), 1);
    }

    #[tokio::test]
    async fn test_builds_from_one_factory_share_engine() {
        let factory = new_lru(Some(LruOptions::by_object_count(10)));
        let first = factory.build().unwrap();
        let second = factory.build().unwrap();
        let ctx = Context::background();

        first
            .set(&ctx, &keys(&["a"]), &[b"1".to_vec()], &[])
            .await
            .unwrap();
        second.truncate(&ctx).await.unwrap();

        let values = first.get(&ctx, &keys(&["a"])).await.unwrap();
        assert_eq!(values, vec![None]);
    }
}
