//! Two-tier TTL cache.
//!
//! Values are JSON strings in both tiers. The remote tier (Redis) is tried
//! first when configured; any remote failure degrades to the in-process map
//! and is logged, never returned to the caller.

mod memory;
mod remote;

pub use memory::MemoryStore;
pub use remote::{RedisStore, RemoteStore};

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Errors from the remote tier. Only seen by `RemoteStore` implementors.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Remote store unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Point-in-time cache statistics.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub memory_entries: usize,
    pub remote_enabled: bool,
}

/// Two-tier cache shared by the market data service.
pub struct Cache {
    memory: MemoryStore,
    remote: Option<Arc<dyn RemoteStore>>,
}

impl Cache {
    /// Memory-only cache.
    pub fn memory_only() -> Self {
        Self {
            memory: MemoryStore::new(),
            remote: None,
        }
    }

    /// Cache backed by the given remote tier.
    pub fn with_remote(remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            memory: MemoryStore::new(),
            remote: Some(remote),
        }
    }

    /// Connect to Redis, falling back to memory-only if it is unreachable.
    pub async fn connect(redis_url: &str) -> Self {
        match RedisStore::connect(redis_url).await {
            Ok(store) => {
                info!("Cache: Redis connected at {}", redis_url);
                Self::with_remote(Arc::new(store))
            }
            Err(e) => {
                warn!(
                    "Cache: Redis unavailable ({}), using in-memory cache only",
                    e
                );
                Self::memory_only()
            }
        }
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    /// Raw lookup: remote first, then memory.
    pub async fn get_raw(&self, key: &str) -> Option<String> {
        if let Some(remote) = &self.remote {
            match remote.get(key).await {
                Ok(Some(value)) => return Some(value),
                Ok(None) => {}
                Err(e) => warn!("Cache: remote get failed for {}: {}", key, e),
            }
        }
        self.memory.get(key)
    }

    /// Raw store: remote first, memory when the remote write fails or no
    /// remote is configured.
    pub async fn set_raw(&self, key: &str, value: String, ttl: Duration) {
        if let Some(remote) = &self.remote {
            match remote.set_ex(key, &value, ttl).await {
                Ok(()) => return,
                Err(e) => warn!("Cache: remote set failed for {}, using memory: {}", key, e),
            }
        }
        self.memory.set(key, value, ttl);
    }

    /// Typed lookup. A value that no longer deserializes is a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_raw(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Cache: discarding undecodable entry {}: {}", key, e);
                None
            }
        }
    }

    /// Typed store.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_string(value) {
            Ok(raw) => self.set_raw(key, raw, ttl).await,
            Err(e) => warn!("Cache: failed to serialize {}: {}", key, e),
        }
    }

    /// Remove a key from both tiers.
    pub async fn delete(&self, key: &str) {
        if let Some(remote) = &self.remote {
            if let Err(e) = remote.delete(key).await {
                warn!("Cache: remote delete failed for {}: {}", key, e);
            }
        }
        self.memory.delete(key);
    }

    /// Remove every key starting with `prefix` from both tiers.
    pub async fn clear_pattern(&self, prefix: &str) -> usize {
        let mut removed = 0;
        if let Some(remote) = &self.remote {
            match remote.clear_prefix(prefix).await {
                Ok(n) => removed += n,
                Err(e) => warn!("Cache: remote clear failed for {}*: {}", prefix, e),
            }
        }
        removed + self.memory.clear_prefix(prefix)
    }

    /// Drop expired in-process entries. The remote tier expires on its own.
    pub fn purge_expired(&self) -> usize {
        let removed = self.memory.purge_expired();
        if removed > 0 {
            debug!("Cache: purged {} expired entries", removed);
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            memory_entries: self.memory.len(),
            remote_enabled: self.remote_enabled(),
        }
    }

    /// Periodically purge expired entries until `shutdown` flips to true.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        every: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        cache.purge_expired();
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            debug!("Cache sweeper stopped");
                            break;
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Remote tier that is always down.
    struct DownRemote {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RemoteStore for DownRemote {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn set_ex(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn clear_prefix(&self, _prefix: &str) -> Result<usize, CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
    }

    /// Healthy remote tier backed by a map (ignores TTL).
    #[derive(Default)]
    struct MapRemote {
        data: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl RemoteStore for MapRemote {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            Ok(self.data.lock().unwrap().get(key).cloned())
        }

        async fn set_ex(&self, key: &str, value: &str, _ttl: Duration) -> Result<(), CacheError> {
            self.data
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), CacheError> {
            self.data.lock().unwrap().remove(key);
            Ok(())
        }

        async fn clear_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
            let mut data = self.data.lock().unwrap();
            let before = data.len();
            data.retain(|k, _| !k.starts_with(prefix));
            Ok(before - data.len())
        }
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Payload {
        price: f64,
        source: String,
    }

    fn payload() -> Payload {
        Payload {
            price: 189.5,
            source: "YAHOO".to_string(),
        }
    }

    #[tokio::test]
    async fn test_typed_round_trip_memory_only() {
        let cache = Cache::memory_only();
        cache.set("quote:AAPL", &payload(), Duration::from_secs(60)).await;

        assert_eq!(cache.get::<Payload>("quote:AAPL").await, Some(payload()));
        assert_eq!(cache.get::<Payload>("quote:AAPL").await, Some(payload()));
        assert!(!cache.stats().remote_enabled);
    }

    #[tokio::test]
    async fn test_unbounded_ttl_is_stored() {
        let cache = Cache::memory_only();
        cache
            .set("quote:AAPL", &1u32, Duration::from_secs(u64::MAX))
            .await;
        assert_eq!(cache.get::<u32>("quote:AAPL").await, Some(1));
    }

    #[tokio::test]
    async fn test_remote_down_degrades_to_memory() {
        let remote = Arc::new(DownRemote {
            calls: AtomicUsize::new(0),
        });
        let cache = Cache::with_remote(remote.clone());

        cache.set("quote:AAPL", &payload(), Duration::from_secs(60)).await;
        assert_eq!(cache.get::<Payload>("quote:AAPL").await, Some(payload()));
        assert_eq!(remote.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.stats().memory_entries, 1);

        cache.delete("quote:AAPL").await;
        assert!(cache.get::<Payload>("quote:AAPL").await.is_none());
    }

    #[tokio::test]
    async fn test_healthy_remote_is_primary() {
        let remote = Arc::new(MapRemote::default());
        let cache = Cache::with_remote(remote.clone());

        cache.set("news:AAPL", &vec!["a", "b"], Duration::from_secs(60)).await;
        assert!(remote.data.lock().unwrap().contains_key("news:AAPL"));
        assert_eq!(cache.stats().memory_entries, 0);
        assert_eq!(
            cache.get::<Vec<String>>("news:AAPL").await,
            Some(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[tokio::test]
    async fn test_clear_pattern_both_tiers() {
        let remote = Arc::new(MapRemote::default());
        let cache = Cache::with_remote(remote.clone());
        cache.set("news:AAPL", &1, Duration::from_secs(60)).await;
        cache.memory.set("news:MSFT", "2".to_string(), Duration::from_secs(60));
        cache.set("quote:AAPL", &3, Duration::from_secs(60)).await;

        assert_eq!(cache.clear_pattern("news:").await, 2);
        assert!(cache.get::<i32>("news:AAPL").await.is_none());
        assert!(cache.get::<i32>("news:MSFT").await.is_none());
        assert_eq!(cache.get::<i32>("quote:AAPL").await, Some(3));
    }

    #[tokio::test]
    async fn test_undecodable_value_is_miss() {
        let cache = Cache::memory_only();
        cache
            .set_raw("quote:AAPL", "not json".to_string(), Duration::from_secs(60))
            .await;
        assert!(cache.get::<Payload>("quote:AAPL").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_miss() {
        let cache = Cache::memory_only();
        cache.set("k", &1, Duration::from_millis(10)).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get::<i32>("k").await.is_none());
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_shutdown() {
        let cache = Arc::new(Cache::memory_only());
        cache.set("k", &1, Duration::from_millis(1)).await;
        let (tx, rx) = watch::channel(false);

        let handle = cache.spawn_sweeper(Duration::from_millis(5), rx);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.stats().memory_entries, 0);

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
