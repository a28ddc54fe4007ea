//! Drawing cache with LRU eviction and an optional time-to-live
//!
//! Generated SVGs are expensive (the backend can take minutes), so identical requests
//! are served from memory. The cache is shared through an `Arc` and locks internally.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use geruest_core::models::{DrawingKind, DrawingRequest, DrawingSubject};
use indexmap::IndexMap;
use serde::Serialize;
use tokio::time::Instant;

/// Identity of a generated drawing
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DrawingKey {
    pub kind: DrawingKind,
    /// Address, or the label of an explicit geometry
    pub address: String,
    /// Fingerprint of explicit geometry; `None` for address drawings
    pub geometry: Option<u64>,
    pub width_px: u32,
    pub height_px: u32,
    /// Manual eave/ridge overrides in millimetres
    pub manual_heights: (Option<i64>, Option<i64>),
    pub professional: bool,
    pub high_fidelity: bool,
}

impl DrawingKey {
    pub fn for_request(request: &DrawingRequest) -> Self {
        let geometry = match &request.subject {
            DrawingSubject::Address(_) => None,
            DrawingSubject::Geometry { sides, polygon, .. } => {
                let mut hasher = DefaultHasher::new();
                for side in sides {
                    side.index.hash(&mut hasher);
                    side.start.map(f64::to_bits).hash(&mut hasher);
                    side.end.map(f64::to_bits).hash(&mut hasher);
                }
                for vertex in polygon {
                    vertex.map(f64::to_bits).hash(&mut hasher);
                }
                Some(hasher.finish())
            }
        };

        Self {
            kind: request.kind,
            address: request.subject.label().to_string(),
            geometry,
            width_px: request.width_px,
            height_px: request.height_px,
            manual_heights: request.manual_heights.map(|m| m.as_millimetres()).unwrap_or_default(),
            professional: request.professional,
            high_fidelity: request.high_fidelity,
        }
    }
}

/// Counters since the cache was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub entries: usize,
}

#[derive(Debug)]
struct Entry {
    svg: Arc<str>,
    inserted_at: Instant,
}

type MillimetreHeights = (Option<i64>, Option<i64>);

#[derive(Debug, Default)]
struct Inner {
    // Least recently used first
    entries: IndexMap<DrawingKey, Entry>,
    // Manual heights last requested per address, oldest first
    manual_heights: IndexMap<String, MillimetreHeights>,
    stats: CacheStats,
}

/// LRU cache of generated SVG drawings
#[derive(Debug)]
pub struct DrawingCache {
    capacity: usize,
    ttl: Option<Duration>,
    inner: Mutex<Inner>,
}

impl DrawingCache {
    /// A capacity of zero disables caching
    pub fn new(capacity: usize, ttl: Option<Duration>) -> Self {
        Self { capacity, ttl, inner: Mutex::new(Inner::default()) }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    pub fn get(&self, key: &DrawingKey) -> Option<Arc<str>> {
        let mut inner = self.lock();

        let Some(entry) = inner.entries.shift_remove(key) else {
            inner.stats.misses += 1;
            return None;
        };

        if self.is_expired(&entry) {
            inner.stats.expirations += 1;
            inner.stats.misses += 1;
            tracing::debug!(kind = %key.kind, address = %key.address, "Cached drawing expired");
            return None;
        }

        let svg = entry.svg.clone();
        inner.entries.insert(key.clone(), entry);
        inner.stats.hits += 1;
        Some(svg)
    }

    pub fn insert(&self, key: DrawingKey, svg: impl Into<Arc<str>>) {
        if self.capacity == 0 {
            return;
        }

        let mut inner = self.lock();
        inner.entries.shift_remove(&key);
        inner.entries.insert(key, Entry { svg: svg.into(), inserted_at: Instant::now() });

        while inner.entries.len() > self.capacity {
            if let Some((evicted, _)) = inner.entries.shift_remove_index(0) {
                tracing::debug!(kind = %evicted.kind, address = %evicted.address, "Evicted drawing");
                inner.stats.evictions += 1;
            }
        }
    }

    /// Drop every drawing for an address; returns how many were removed
    pub fn invalidate_address(&self, address: &str) -> usize {
        let mut inner = self.lock();
        let before = inner.entries.len();
        inner.entries.retain(|key, _| key.address != address);
        let removed = before - inner.entries.len();

        if removed > 0 {
            tracing::debug!(address, removed, "Invalidated cached drawings");
        }
        removed
    }

    /// Record the manual heights of `key`; true when they differ from the last ones seen
    /// for its address.
    ///
    /// At most `capacity` addresses are remembered, the least recently requested is
    /// forgotten first.
    pub fn manual_heights_changed(&self, key: &DrawingKey) -> bool {
        if self.capacity == 0 {
            return false;
        }

        let mut inner = self.lock();
        let previous = inner.manual_heights.shift_remove(&key.address);
        inner.manual_heights.insert(key.address.clone(), key.manual_heights);
        while inner.manual_heights.len() > self.capacity {
            inner.manual_heights.shift_remove_index(0);
        }

        match previous {
            Some(previous) => previous != key.manual_heights,
            None => key.manual_heights != (None, None),
        }
    }

    /// Remove expired entries eagerly
    pub fn purge_expired(&self) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };

        let mut inner = self.lock();
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
        let removed = before - inner.entries.len();
        inner.stats.expirations += removed as u64;
        removed
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.manual_heights.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats { entries: inner.entries.len(), ..inner.stats }
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        self.ttl.is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geruest_core::models::ManualHeights;

    fn key(kind: DrawingKind, address: &str) -> DrawingKey {
        DrawingKey::for_request(&DrawingRequest::for_address(kind, address))
    }

    #[test]
    fn test_hit_and_miss() {
        let cache = DrawingCache::new(4, None);
        let k = key(DrawingKind::CrossSection, "Bahnhofstrasse 1, Zürich");

        assert!(cache.get(&k).is_none());
        cache.insert(k.clone(), "<svg/>");
        assert_eq!(cache.get(&k).as_deref(), Some("<svg/>"));

        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[test]
    fn test_key_distinguishes_parameters() {
        let base = DrawingRequest::for_address(DrawingKind::Elevation, "Hauptgasse 5, Bern");
        let other_size = base.clone().with_size(1600, 1200);
        let with_heights = base.clone().with_manual_heights(ManualHeights::new(Some(6.5), None));
        let professional = base.clone().with_professional(true);

        let k = DrawingKey::for_request(&base);
        assert_ne!(k, DrawingKey::for_request(&other_size));
        assert_ne!(k, DrawingKey::for_request(&with_heights));
        assert_ne!(k, DrawingKey::for_request(&professional));
        assert_eq!(k, DrawingKey::for_request(&base.clone()));
    }

    #[test]
    fn test_lru_eviction_keeps_recently_used() {
        let cache = DrawingCache::new(2, None);
        let a = key(DrawingKind::CrossSection, "A");
        let b = key(DrawingKind::CrossSection, "B");
        let c = key(DrawingKind::CrossSection, "C");

        cache.insert(a.clone(), "a");
        cache.insert(b.clone(), "b");
        // Touch A so B becomes least recently used
        assert!(cache.get(&a).is_some());
        cache.insert(c.clone(), "c");

        assert!(cache.get(&a).is_some());
        assert!(cache.get(&b).is_none());
        assert!(cache.get(&c).is_some());
        assert_eq!(cache.stats().evictions, 1);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let cache = DrawingCache::new(0, None);
        let k = key(DrawingKind::FloorPlan, "A");
        cache.insert(k.clone(), "svg");
        assert!(cache.is_empty());
        assert!(cache.get(&k).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expiry() {
        let cache = DrawingCache::new(8, Some(Duration::from_secs(60)));
        let k = key(DrawingKind::CrossSection, "A");
        cache.insert(k.clone(), "svg");

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(cache.get(&k).is_some());

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(cache.get(&k).is_none());
        assert_eq!(cache.stats().expirations, 1);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let cache = DrawingCache::new(8, Some(Duration::from_secs(10)));
        cache.insert(key(DrawingKind::CrossSection, "A"), "a");
        tokio::time::advance(Duration::from_secs(11)).await;
        cache.insert(key(DrawingKind::CrossSection, "B"), "b");

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalidate_address() {
        let cache = DrawingCache::new(8, None);
        for kind in DrawingKind::ALL {
            cache.insert(key(kind, "A"), "a");
        }
        cache.insert(key(DrawingKind::CrossSection, "B"), "b");

        assert_eq!(cache.invalidate_address("A"), 3);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_manual_heights_changed() {
        let cache = DrawingCache::new(8, None);
        let plain = key(DrawingKind::CrossSection, "A");
        let corrected = DrawingKey::for_request(
            &DrawingRequest::for_address(DrawingKind::CrossSection, "A")
                .with_manual_heights(ManualHeights::new(Some(7.0), None)),
        );

        assert!(!cache.manual_heights_changed(&plain));
        assert!(cache.manual_heights_changed(&corrected));
        assert!(!cache.manual_heights_changed(&corrected));
        assert!(cache.manual_heights_changed(&plain));
    }

    #[test]
    fn test_manual_heights_tracking_is_bounded() {
        let cache = DrawingCache::new(2, None);
        let with_heights = |address: &str| {
            DrawingKey::for_request(
                &DrawingRequest::for_address(DrawingKind::Elevation, address)
                    .with_manual_heights(ManualHeights::new(Some(9.0), Some(12.0))),
            )
        };

        assert!(cache.manual_heights_changed(&with_heights("A")));
        assert!(cache.manual_heights_changed(&with_heights("B")));
        assert!(cache.manual_heights_changed(&with_heights("C")));

        // A was forgotten, so its heights count as new again; C is still known
        assert!(!cache.manual_heights_changed(&with_heights("C")));
        assert!(cache.manual_heights_changed(&with_heights("A")));
    }
}
