//! Object Cache Service
//!
//! Holds one storage backend and adds typed single-key access on top of the
//! batched byte contract. Values are encoded as JSON.

use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::storage::{Context, Storage, StorageFactory};

// == Object Cache ==
/// Cache front handed to application code.
///
/// Cloning is cheap; clones share the backend. Backend errors are returned
/// unchanged and never retried.
#[derive(Clone)]
pub struct ObjectCache {
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for ObjectCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectCache").finish_non_exhaustive()
    }
}

impl ObjectCache {
    // == Constructors ==
    /// Builds the backend, surfacing construction failures immediately.
    pub fn new(factory: &dyn StorageFactory) -> Result<Self> {
        let storage = factory.build()?;
        info!("Object cache backend ready");
        Ok(Self::from_storage(storage))
    }

    pub fn from_storage(storage: Box<dyn Storage>) -> Self {
        Self {
            storage: Arc::from(storage),
        }
    }

    // == Typed Access ==
    /// Encodes `value` and stores it under `key`.
    pub async fn set<T>(
        &self,
        ctx: &Context,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let encoded = serde_json::to_vec(value)?;
        self.storage
            .set(ctx, &[key.to_string()], &[encoded], &[ttl])
            .await
    }

    /// Fetches and decodes `key`. A miss is `Ok(None)`.
    pub async fn get<T>(&self, ctx: &Context, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let mut values = self.storage.get(ctx, &[key.to_string()]).await?;
        match values.pop().flatten() {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    // == Raw Batches ==
    pub async fn set_multi(
        &self,
        ctx: &Context,
        keys: &[String],
        values: &[Vec<u8>],
        expirations: &[Option<Duration>],
    ) -> Result<()> {
        debug!(keys = keys.len(), "set_multi");
        self.storage.set(ctx, keys, values, expirations).await
    }

    /// Result is index-aligned with `keys`, `None` marking a miss.
    pub async fn get_multi(&self, ctx: &Context, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>> {
        debug!(keys = keys.len(), "get_multi");
        self.storage.get(ctx, keys).await
    }

    pub async fn delete(&self, ctx: &Context, keys: &[String]) -> Result<()> {
        self.storage.delete(ctx, keys).await
    }

    pub async fn truncate(&self, ctx: &Context) -> Result<()> {
        info!("Truncating object cache");
        self.storage.truncate(ctx).await
    }

    pub async fn close(&self) -> Result<()> {
        info!("Closing object cache");
        self.storage.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::storage::{new_lru, LruOptions};
    use async_trait::async_trait;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Product {
        sku: String,
        price_cents: u64,
    }

    fn lru_cache() -> ObjectCache {
        ObjectCache::new(&new_lru(Some(LruOptions::by_object_count(10)))).unwrap()
    }

    /// Backend that stands in for one with a real external dependency.
    struct Unreachable;

    #[async_trait]
    impl Storage for Unreachable {
        async fn set(
            &self,
            _ctx: &Context,
            _keys: &[String],
            _values: &[Vec<u8>],
            _expirations: &[Option<Duration>],
        ) -> Result<()> {
            Err(CacheError::Backend("connection reset".to_string()))
        }

        async fn get(&self, ctx: &Context, _keys: &[String]) -> Result<Vec<Option<Vec<u8>>>> {
            match ctx.err() {
                Some(err) => Err(err),
                None => Err(CacheError::Backend("connection reset".to_string())),
            }
        }

        async fn delete(&self, _ctx: &Context, _keys: &[String]) -> Result<()> {
            Ok(())
        }

        async fn truncate(&self, _ctx: &Context) -> Result<()> {
            Ok(())
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_typed_roundtrip() {
        let cache = lru_cache();
        let ctx = Context::background();
        let product = Product {
            sku: "A-1".to_string(),
            price_cents: 1999,
        };

        cache.set(&ctx, "product:A-1", &product, None).await.unwrap();
        let loaded: Option<Product> = cache.get(&ctx, "product:A-1").await.unwrap();

        assert_eq!(loaded, Some(product));
    }

    #[tokio::test]
    async fn test_typed_miss_is_none() {
        let cache = lru_cache();
        let loaded: Option<Product> = cache
            .get(&Context::background(), "product:missing")
            .await
            .unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_value_is_codec_error() {
        let cache = lru_cache();
        let ctx = Context::background();

        cache
            .set_multi(&ctx, &["bad".to_string()], &[b"not json".to_vec()], &[])
            .await
            .unwrap();
        let result: Result<Option<Product>> = cache.get(&ctx, "bad").await;

        assert!(matches!(result, Err(CacheError::Codec(_))));
    }

    #[tokio::test]
    async fn test_raw_batches_pass_through() {
        let cache = lru_cache();
        let ctx = Context::background();
        let keys = vec!["a".to_string(), "b".to_string()];

        cache
            .set_multi(&ctx, &keys, &[b"1".to_vec(), b"2".to_vec()], &[None, None])
            .await
            .unwrap();
        cache.delete(&ctx, &keys[..1]).await.unwrap();

        let values = cache.get_multi(&ctx, &keys).await.unwrap();
        assert_eq!(values, vec![None, Some(b"2".to_vec())]);

        cache.truncate(&ctx).await.unwrap();
        let values = cache.get_multi(&ctx, &keys).await.unwrap();
        assert_eq!(values, vec![None, None]);
    }

    #[test]
    fn test_factory_failure_is_surfaced() {
        let factory = || -> Result<Box<dyn Storage>> {
            Err(CacheError::Unavailable("no endpoint configured".to_string()))
        };

        let result = ObjectCache::new(&factory);
        assert!(matches!(result, Err(CacheError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_backend_errors_are_not_translated() {
        let factory = || -> Result<Box<dyn Storage>> { Ok(Box::new(Unreachable)) };
        let cache = ObjectCache::new(&factory).unwrap();
        let ctx = Context::background();

        let result = cache.set(&ctx, "k", &1u32, None).await;
        assert!(matches!(result, Err(CacheError::Backend(msg)) if msg == "connection reset"));

        ctx.cancel();
        let result: Result<Option<u32>> = cache.get(&ctx, "k").await;
        assert!(matches!(result, Err(CacheError::Cancelled)));
    }

    #[tokio::test]
    async fn test_clones_share_backend() {
        let cache = lru_cache();
        let clone = cache.clone();
        let ctx = Context::background();

        cache.set(&ctx, "n", &7u32, None).await.unwrap();
        let loaded: Option<u32> = clone.get(&ctx, "n").await.unwrap();
        assert_eq!(loaded, Some(7));

        clone.close().await.unwrap();
        let loaded: Option<u32> = cache.get(&ctx, "n").await.unwrap();
        assert_eq!(loaded, None);
    }
}
