use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

use crate::models::NeighborhoodRecord;

/// Shared, immutable view of part of the catalog
pub type Snapshot = Arc<Vec<NeighborhoodRecord>>;

/// In-memory cache of candidate snapshots
///
/// Entries are keyed by city filter and expire after the configured TTL.
/// Writes through the store call [`SnapshotCache::invalidate_all`], so the
/// TTL only bounds staleness from writers outside this process.
pub struct SnapshotCache {
    snapshots: Cache<String, Snapshot>,
}

impl SnapshotCache {
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let snapshots = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        tracing::debug!("Snapshot cache ready (capacity: {}, TTL: {}s)", capacity, ttl_secs);
        Self { snapshots }
    }

    pub async fn get(&self, key: &str) -> Option<Snapshot> {
        let hit = self.snapshots.get(key).await;
        if hit.is_some() {
            tracing::trace!("Snapshot cache hit: {}", key);
        } else {
            tracing::trace!("Snapshot cache miss: {}", key);
        }
        hit
    }

    pub async fn insert(&self, key: String, snapshot: Snapshot) {
        self.snapshots.insert(key, snapshot).await;
    }

    pub async fn invalidate(&self, key: &str) {
        self.snapshots.invalidate(key).await;
    }

    /// Drop every cached snapshot
    pub fn invalidate_all(&self) {
        self.snapshots.invalidate_all();
        tracing::debug!("Invalidated all candidate snapshots");
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a candidate snapshot
    pub fn candidates(city: Option<&str>) -> String {
        match city {
            Some(city) => format!("candidates:city:{}", city),
            None => "candidates:all".to_string(),
        }
    }
}
