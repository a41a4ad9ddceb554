//! Time-bounded cache of rendered feed pages, keyed by page number.
//!
//! # Invariants
//! - A stored page is returned unchanged until its TTL elapses or the
//!   cache is explicitly invalidated; writes to storage do not evict it.
//! - A zero TTL never stores or serves a page.
//! - At most `max_pages` pages are held at once.

use log::debug;
use moka::sync::Cache;
use std::time::Duration;

/// Upper bound on cached pages per feed.
pub const DEFAULT_MAX_PAGES: u64 = 64;

pub struct PageCache<V> {
    ttl: Duration,
    inner: Option<Cache<u32, V>>,
}

impl<V: Clone + Send + Sync + 'static> PageCache<V> {
    pub fn new(ttl: Duration, max_pages: u64) -> Self {
        let inner = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(max_pages)
                .time_to_live(ttl)
                .build()
        });
        Self { ttl, inner }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, number: u32) -> Option<V> {
        let value = self.inner.as_ref()?.get(&number)?;
        debug!("event=cache_hit module=feed page={number}");
        Some(value)
    }

    pub fn put(&self, number: u32, value: V) {
        if let Some(inner) = &self.inner {
            inner.insert(number, value);
        }
    }

    /// Drops every page.
    pub fn invalidate(&self) {
        if let Some(inner) = &self.inner {
            debug!(
                "event=cache_invalidate module=feed entries={}",
                inner.entry_count()
            );
            inner.invalidate_all();
        }
    }

    /// Number of pages currently held, after pending evictions are applied.
    pub fn len(&self) -> u64 {
        match &self.inner {
            Some(inner) => {
                inner.run_pending_tasks();
                inner.entry_count()
            }
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::{PageCache, DEFAULT_MAX_PAGES};
    use std::time::Duration;

    #[test]
    fn live_pages_are_served_until_invalidated() {
        let cache = PageCache::new(Duration::from_secs(60), DEFAULT_MAX_PAGES);
        cache.put(1, vec![1, 2, 3]);
        assert_eq!(cache.get(1), Some(vec![1, 2, 3]));
        assert_eq!(cache.get(2), None);

        cache.invalidate();
        assert_eq!(cache.get(1), None);
    }

    #[test]
    fn zero_ttl_stores_nothing() {
        let cache = PageCache::new(Duration::ZERO, DEFAULT_MAX_PAGES);
        cache.put(1, 1);
        assert_eq!(cache.get(1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn expired_pages_are_not_served() {
        let cache = PageCache::new(Duration::from_millis(5), DEFAULT_MAX_PAGES);
        cache.put(1, 1);
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.get(1), None);
    }

    #[test]
    fn held_pages_stay_within_capacity() {
        let cache = PageCache::new(Duration::from_secs(60), 8);
        for number in 0..1_000 {
            cache.put(number, number);
        }
        assert!(cache.len() <= 8);
    }
}
