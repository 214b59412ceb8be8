use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NeighborhoodPatch, NeighborhoodRecord, NewNeighborhood};
use crate::services::cache::{CacheKey, Snapshot, SnapshotCache};
use crate::services::memory::MemoryStore;
use crate::services::postgres::{PostgresClient, PostgresError};

/// Errors surfaced by the candidate store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Postgres(#[from] PostgresError),

    #[error("Failed to read seed file: {0}")]
    SeedIo(#[from] std::io::Error),

    #[error("Failed to parse seed file: {0}")]
    SeedFormat(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Where the catalog lives
pub enum StoreBackend {
    Postgres(PostgresClient),
    Memory(MemoryStore),
}

impl StoreBackend {
    fn name(&self) -> &'static str {
        match self {
            StoreBackend::Postgres(_) => "postgres",
            StoreBackend::Memory(_) => "memory",
        }
    }
}

/// Candidate store accessor
///
/// Serves point-in-time snapshots of the catalog to the matcher and carries
/// the administrative operations. Every successful write invalidates the
/// snapshot cache.
///
/// A write generation counter guards the gap between a backend read and the
/// cache insert: a snapshot read before a write completed is never left in
/// the cache after that write returns.
pub struct CandidateStore {
    backend: StoreBackend,
    cache: SnapshotCache,
    generation: AtomicU64,
}

impl CandidateStore {
    pub fn new(backend: StoreBackend, cache: SnapshotCache) -> Self {
        tracing::info!("Candidate store using {} backend", backend.name());
        Self {
            backend,
            cache,
            generation: AtomicU64::new(0),
        }
    }

    /// Fetch all neighborhoods, or exactly those in `city`
    ///
    /// An empty result is not an error.
    pub async fn fetch_candidates(&self, city: Option<&str>) -> Result<Snapshot, StoreError> {
        let key = CacheKey::candidates(city);
        if let Some(snapshot) = self.cache.get(&key).await {
            return Ok(snapshot);
        }

        let seen = self.generation.load(Ordering::SeqCst);
        let snapshot = Arc::new(self.read_backend(city).await?);
        self.cache_snapshot(key, Arc::clone(&snapshot), seen).await;

        Ok(snapshot)
    }

    async fn read_backend(&self, city: Option<&str>) -> Result<Vec<NeighborhoodRecord>, StoreError> {
        match &self.backend {
            StoreBackend::Postgres(pg) => Ok(pg.fetch_candidates(city).await?),
            StoreBackend::Memory(mem) => Ok(mem.fetch_candidates(city).await),
        }
    }

    /// Cache a snapshot read at generation `seen`
    ///
    /// A write that bumped the generation before the re-check is handled by
    /// dropping the entry here; one that bumps it after the re-check runs its
    /// own `invalidate_all` after the insert.
    async fn cache_snapshot(&self, key: String, snapshot: Snapshot, seen: u64) {
        if self.generation.load(Ordering::SeqCst) != seen {
            return;
        }

        self.cache.insert(key.clone(), snapshot).await;

        if self.generation.load(Ordering::SeqCst) != seen {
            tracing::debug!("Discarding snapshot {} raced by a write", key);
            self.cache.invalidate(&key).await;
        }
    }

    fn after_write(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate_all();
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<NeighborhoodRecord>, StoreError> {
        match &self.backend {
            StoreBackend::Postgres(pg) => Ok(pg.get_by_id(id).await?),
            StoreBackend::Memory(mem) => Ok(mem.get_by_id(id).await),
        }
    }

    pub async fn create(&self, new: NewNeighborhood) -> Result<NeighborhoodRecord, StoreError> {
        let record = match &self.backend {
            StoreBackend::Postgres(pg) => pg.create(new).await?,
            StoreBackend::Memory(mem) => mem.create(new).await,
        };

        self.after_write();
        tracing::debug!("Created neighborhood {} ({})", record.id, record.name);

        Ok(record)
    }

    /// Apply a partial update; `None` when the id is unknown
    pub async fn update(
        &self,
        id: Uuid,
        patch: NeighborhoodPatch,
    ) -> Result<Option<NeighborhoodRecord>, StoreError> {
        let record = match &self.backend {
            StoreBackend::Postgres(pg) => pg.update(id, patch).await?,
            StoreBackend::Memory(mem) => mem.update(id, patch).await,
        };

        if record.is_some() {
            self.after_write();
            tracing::debug!("Updated neighborhood {}", id);
        }

        Ok(record)
    }

    /// Delete a neighborhood; `false` when the id is unknown
    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let deleted = match &self.backend {
            StoreBackend::Postgres(pg) => pg.delete(id).await?,
            StoreBackend::Memory(mem) => mem.delete(id).await,
        };

        if deleted {
            self.after_write();
            tracing::debug!("Deleted neighborhood {}", id);
        }

        Ok(deleted)
    }

    pub async fn health_check(&self) -> bool {
        match &self.backend {
            StoreBackend::Postgres(pg) => match pg.health_check().await {
                Ok(healthy) => healthy,
                Err(e) => {
                    tracing::warn!("PostgreSQL health check failed: {}", e);
                    false
                }
            },
            StoreBackend::Memory(_) => true,
        }
    }
}
