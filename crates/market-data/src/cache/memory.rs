//! In-process TTL map, the always-available cache tier.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::warn;

/// Longest expiry the in-process tier will hold an entry for.
pub const MAX_MEMORY_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// Thread-safe key/value map with per-entry expiry.
///
/// Expiry is enforced on read; [`purge_expired`](Self::purge_expired) drops
/// stale entries proactively.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("Memory cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<String> {
        let mut entries = self.lock_entries();
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or overwrite; last write wins. TTLs are capped at
    /// [`MAX_MEMORY_TTL`].
    pub fn set(&self, key: &str, value: String, ttl: Duration) {
        let now = Instant::now();
        let ttl = ttl.min(MAX_MEMORY_TTL);
        let expires_at = now.checked_add(ttl).unwrap_or(now);
        self.lock_entries()
            .insert(key.to_string(), Entry { value, expires_at });
    }

    pub fn delete(&self, key: &str) -> bool {
        self.lock_entries().remove(key).is_some()
    }

    /// Remove every key starting with `prefix`. Returns the number removed.
    pub fn clear_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.lock_entries();
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        before - entries.len()
    }

    /// Drop expired entries. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    fn purge_expired_at(&self, now: Instant) -> usize {
        let mut entries = self.lock_entries();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let store = MemoryStore::new();
        store.set("quote:AAPL", "189.5".to_string(), Duration::from_secs(60));
        assert_eq!(store.get("quote:AAPL").as_deref(), Some("189.5"));
        assert_eq!(store.get("quote:AAPL").as_deref(), Some("189.5"));
    }

    #[test]
    fn test_expired_entry_is_absent_and_removed() {
        let store = MemoryStore::new();
        store.set("quote:AAPL", "1".to_string(), Duration::from_secs(60));

        let later = Instant::now() + Duration::from_secs(61);
        assert!(store.get_at("quote:AAPL", later).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_huge_ttl_is_capped() {
        let store = MemoryStore::new();
        store.set("quote:AAPL", "1".to_string(), Duration::from_secs(u64::MAX));
        assert_eq!(store.get("quote:AAPL").as_deref(), Some("1"));

        let past_cap = Instant::now() + MAX_MEMORY_TTL + Duration::from_secs(1);
        assert!(store.get_at("quote:AAPL", past_cap).is_none());
    }

    #[test]
    fn test_overwrite_last_write_wins() {
        let store = MemoryStore::new();
        store.set("k", "a".to_string(), Duration::from_secs(60));
        store.set("k", "b".to_string(), Duration::from_secs(60));
        assert_eq!(store.get("k").as_deref(), Some("b"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear_prefix() {
        let store = MemoryStore::new();
        store.set("news:AAPL", "[]".to_string(), Duration::from_secs(60));
        store.set("news:MSFT", "[]".to_string(), Duration::from_secs(60));
        store.set("quote:AAPL", "1".to_string(), Duration::from_secs(60));

        assert_eq!(store.clear_prefix("news:"), 2);
        assert!(store.get("quote:AAPL").is_some());
    }

    #[test]
    fn test_purge_expired() {
        let store = MemoryStore::new();
        store.set("short", "1".to_string(), Duration::from_secs(1));
        store.set("long", "2".to_string(), Duration::from_secs(600));

        let later = Instant::now() + Duration::from_secs(5);
        assert_eq!(store.purge_expired_at(later), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_concurrent_writers() {
        use std::sync::Arc;

        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for j in 0..100 {
                        store.set(&format!("k{}", j % 10), i.to_string(), Duration::from_secs(60));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 10);
    }
}
