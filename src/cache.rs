use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct CachedEntry<V> {
    fetched_at: Instant,
    value: Arc<V>,
}

/// Memoized fetch results keyed by the literal query text, valid for a fixed TTL.
pub struct QueryCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedEntry<V>>>,
}

impl<V> QueryCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<V>> {
        self.get_at(key, Instant::now()).await
    }

    pub async fn get_at(&self, key: &str, now: Instant) -> Option<Arc<V>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if now.duration_since(entry.fetched_at) < self.ttl => {
                Some(Arc::clone(&entry.value))
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub async fn insert_at(&self, key: String, value: V, now: Instant) -> Arc<V> {
        let value = Arc::new(value);
        self.entries.lock().await.insert(
            key,
            CachedEntry {
                fetched_at: now,
                value: Arc::clone(&value),
            },
        );
        value
    }

    /// Returns the cached value for `key`, running `fetch` only on a miss or
    /// after the entry expired. Failed fetches are not cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key).await {
            debug!(key, "query cache hit");
            return Ok(value);
        }
        debug!(key, "query cache miss");
        let value = fetch().await?;
        Ok(self.insert_at(key.to_string(), value, Instant::now()).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn same_key_within_ttl_reuses_result() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new(Duration::from_secs(600));
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_fetch("select 1", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, std::io::Error>(vec![1, 2, 3])
                })
                .await
                .unwrap();
            assert_eq!(*value, vec![1, 2, 3]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_query_text_is_a_different_entry() {
        let cache: QueryCache<u32> = QueryCache::new(Duration::from_secs(600));
        let now = Instant::now();
        cache.insert_at("select a".to_string(), 1, now).await;
        assert!(cache.get_at("select b", now).await.is_none());
        assert_eq!(cache.get_at("select a", now).await.as_deref(), Some(&1));
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache: QueryCache<u32> = QueryCache::new(Duration::from_secs(600));
        let now = Instant::now();
        cache.insert_at("q".to_string(), 7, now).await;

        let before = now + Duration::from_secs(599);
        assert!(cache.get_at("q", before).await.is_some());
        let after = now + Duration::from_secs(600);
        assert!(cache.get_at("q", after).await.is_none());
    }

    #[tokio::test]
    async fn failed_fetch_is_not_cached() {
        let cache: QueryCache<u32> = QueryCache::new(Duration::from_secs(600));
        let err = cache
            .get_or_fetch("q", || async { Err::<u32, _>("boom") })
            .await;
        assert!(err.is_err());
        let ok = cache.get_or_fetch("q", || async { Ok::<_, &str>(5) }).await;
        assert_eq!(*ok.unwrap(), 5);
    }
}
