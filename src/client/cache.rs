//! Keyed query cache
//!
//! Holds the last successful response per query key. Entries go stale after
//! a fixed age and are refetched on the next read. Invalidating a key bumps
//! its generation so a fetch already in flight cannot overwrite the
//! invalidation with an older answer.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

struct Slot<V> {
    value: Option<(Arc<V>, Instant)>,
    generation: u64,
}

impl<V> Default for Slot<V> {
    fn default() -> Self {
        Self {
            value: None,
            generation: 0,
        }
    }
}

/// Response cache keyed by query name
pub struct QueryCache<V> {
    slots: RwLock<HashMap<String, Slot<V>>>,
    stale_after: Duration,
}

impl<V> QueryCache<V> {
    /// Create a cache whose entries go stale after `stale_after`
    pub fn new(stale_after: Duration) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            stale_after,
        }
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    /// Cached value if present and not stale
    pub async fn get_fresh(&self, key: &str) -> Option<Arc<V>> {
        let slots = self.slots.read().await;
        slots.get(key).and_then(|slot| match &slot.value {
            Some((value, fetched_at)) if fetched_at.elapsed() < self.stale_after => {
                Some(Arc::clone(value))
            }
            _ => None,
        })
    }

    /// Cached value regardless of age
    pub async fn peek(&self, key: &str) -> Option<Arc<V>> {
        let slots = self.slots.read().await;
        slots
            .get(key)
            .and_then(|slot| slot.value.as_ref().map(|(value, _)| Arc::clone(value)))
    }

    /// Return the fresh cached value or run `fetch` and cache its result.
    ///
    /// Errors are returned to the caller and never cached. A result whose
    /// key was invalidated while the fetch was running is returned but not
    /// stored.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get_fresh(key).await {
            tracing::trace!(key, "Query cache hit");
            return Ok(value);
        }

        let generation = self.generation(key).await;
        let value = Arc::new(fetch().await?);

        let mut slots = self.slots.write().await;
        let slot = slots.entry(key.to_string()).or_default();
        if slot.generation == generation {
            slot.value = Some((Arc::clone(&value), Instant::now()));
        } else {
            tracing::debug!(key, "Discarding superseded query result");
        }

        Ok(value)
    }

    /// Drop the cached value for `key` and supersede in-flight fetches
    pub async fn invalidate(&self, key: &str) {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(key.to_string()).or_default();
        slot.value = None;
        slot.generation += 1;
        tracing::debug!(key, generation = slot.generation, "Query invalidated");
    }

    /// Invalidate every key
    pub async fn clear(&self) {
        let mut slots = self.slots.write().await;
        for slot in slots.values_mut() {
            slot.value = None;
            slot.generation += 1;
        }
    }

    /// Number of keys holding a value
    pub async fn len(&self) -> usize {
        let slots = self.slots.read().await;
        slots.values().filter(|slot| slot.value.is_some()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn generation(&self, key: &str) -> u64 {
        let slots = self.slots.read().await;
        slots.get(key).map(|slot| slot.generation).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_hit_skips_fetch() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);
        let calls = &calls;

        for _ in 0..3 {
            let value = cache
                .get_or_fetch("trends", || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, String>(42)
                })
                .await
                .unwrap();
            assert_eq!(*value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_stale_entry_refetches() {
        let cache = QueryCache::new(Duration::ZERO);

        cache.get_or_fetch("k", || async { Ok::<_, String>(1) }).await.unwrap();
        let value = cache.get_or_fetch("k", || async { Ok::<_, String>(2) }).await.unwrap();

        assert_eq!(*value, 2);
        assert!(cache.get_fresh("k").await.is_none());
        assert_eq!(cache.peek("k").await.as_deref(), Some(&2));
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: QueryCache<u32> = QueryCache::new(Duration::from_secs(60));

        let err = cache
            .get_or_fetch("k", || async { Err::<u32, _>("boom".to_string()) })
            .await
            .unwrap_err();
        assert_eq!(err, "boom");
        assert!(cache.is_empty().await);

        let value = cache.get_or_fetch("k", || async { Ok::<_, String>(5) }).await.unwrap();
        assert_eq!(*value, 5);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.get_or_fetch("k", || async { Ok::<_, String>(1) }).await.unwrap();

        cache.invalidate("k").await;
        assert!(cache.peek("k").await.is_none());

        let value = cache.get_or_fetch("k", || async { Ok::<_, String>(2) }).await.unwrap();
        assert_eq!(*value, 2);
    }

    #[tokio::test]
    async fn test_invalidation_during_fetch_discards_result() {
        let cache = Arc::new(QueryCache::new(Duration::from_secs(60)));
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let fetching = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                cache
                    .get_or_fetch("k", || async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok::<_, String>("old")
                    })
                    .await
            })
        };

        started_rx.await.unwrap();
        cache.invalidate("k").await;
        release_tx.send(()).unwrap();

        let value = fetching.await.unwrap().unwrap();
        assert_eq!(*value, "old");
        assert!(cache.peek("k").await.is_none());
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = QueryCache::new(Duration::from_secs(60));
        cache.get_or_fetch("a", || async { Ok::<_, String>(1) }).await.unwrap();
        cache.get_or_fetch("b", || async { Ok::<_, String>(2) }).await.unwrap();

        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
