use crate::core::cache::Cache;
use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct Entry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|expiry| expiry <= now)
    }
}

/// In-process cache; expired entries are evicted on read.
pub struct MemoryCache<K, V> {
    inner: Arc<Mutex<HashMap<K, Entry<V>>>>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, V> Default for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + std::fmt::Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.inner.lock().await;
        if entries
            .get(key)
            .is_some_and(|entry| entry.is_expired(Instant::now()))
        {
            debug!("Cache entry expired for key: {:?}", key);
            entries.remove(key);
            return None;
        }
        match entries.get(key) {
            Some(entry) => {
                debug!("Cache HIT for key: {:?}", key);
                Some(entry.value.clone())
            }
            None => {
                debug!("Cache MISS for key: {:?}", key);
                None
            }
        }
    }

    async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        let expires_at = ttl.map(|duration| Instant::now() + duration);
        let mut entries = self.inner.lock().await;
        debug!("Cache PUT for key: {:?}", key);
        entries.insert(key, Entry { value, expires_at });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_get_put() {
        let cache = MemoryCache::<Vec<String>, usize>::new();
        let key = vec!["PETR4".to_string(), "VALE3".to_string()];

        assert!(cache.get(&key).await.is_none());
        cache.put(key.clone(), 2, None).await;
        assert_eq!(cache.get(&key).await, Some(2));

        // Order of identifiers is part of the key
        let reversed: Vec<String> = key.iter().rev().cloned().collect();
        assert!(cache.get(&reversed).await.is_none());
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = MemoryCache::<String, i32>::new();

        cache
            .put("key1".to_string(), 123, Some(Duration::from_millis(10)))
            .await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(123));

        sleep(Duration::from_millis(20)).await;
        assert!(cache.get(&"key1".to_string()).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_replaced() {
        let cache = MemoryCache::<String, i32>::new();

        cache.put("key1".to_string(), 1, Some(Duration::ZERO)).await;
        assert!(cache.get(&"key1".to_string()).await.is_none());

        cache.put("key1".to_string(), 2, None).await;
        assert_eq!(cache.get(&"key1".to_string()).await, Some(2));
    }
}
