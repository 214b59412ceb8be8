use chrono::Utc;
use std::path::Path;
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::Validate;

use crate::models::{NeighborhoodPatch, NeighborhoodRecord, NewNeighborhood};
use crate::services::store::StoreError;

/// In-process neighborhood catalog
///
/// Records are kept in insertion order, which is also the order returned by
/// [`MemoryStore::fetch_candidates`]. Reads clone the matching records while
/// holding the read lock, so every caller gets its own snapshot.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<NeighborhoodRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from new-record definitions, validating each one
    pub fn with_records(seed: Vec<NewNeighborhood>) -> Result<Self, StoreError> {
        let records = seed
            .into_iter()
            .map(|new| {
                new.validate()
                    .map_err(|e| StoreError::InvalidRecord(format!("{}: {}", new.name, e)))?;
                Ok(into_record(new))
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(Self {
            records: RwLock::new(records),
        })
    }

    /// Load seed data from a JSON array of new-record objects
    pub fn from_seed_file<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let seed: Vec<NewNeighborhood> = serde_json::from_str(&contents)?;

        tracing::info!(
            "Loaded {} seed neighborhoods from {}",
            seed.len(),
            path.as_ref().display()
        );

        Self::with_records(seed)
    }

    pub async fn fetch_candidates(&self, city: Option<&str>) -> Vec<NeighborhoodRecord> {
        let records = self.records.read().await;
        records
            .iter()
            .filter(|record| city.map_or(true, |c| record.city == c))
            .cloned()
            .collect()
    }

    pub async fn get_by_id(&self, id: Uuid) -> Option<NeighborhoodRecord> {
        let records = self.records.read().await;
        records.iter().find(|record| record.id == id).cloned()
    }

    pub async fn create(&self, new: NewNeighborhood) -> NeighborhoodRecord {
        let record = into_record(new);
        self.records.write().await.push(record.clone());
        record
    }

    pub async fn update(&self, id: Uuid, patch: NeighborhoodPatch) -> Option<NeighborhoodRecord> {
        let mut records = self.records.write().await;
        let record = records.iter_mut().find(|record| record.id == id)?;

        patch.apply(record);
        record.last_updated = Utc::now();

        Some(record.clone())
    }

    pub async fn delete(&self, id: Uuid) -> bool {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|record| record.id != id);
        records.len() < before
    }
}

fn into_record(new: NewNeighborhood) -> NeighborhoodRecord {
    NeighborhoodRecord {
        id: Uuid::new_v4(),
        name: new.name,
        city: new.city,
        safety: new.safety,
        pollution: new.pollution,
        cleanliness: new.cleanliness,
        greenery: new.greenery,
        budget: new.budget,
        data_sources: new.data_sources,
        last_updated: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_neighborhood(name: &str, city: &str) -> NewNeighborhood {
        NewNeighborhood {
            name: name.to_string(),
            city: city.to_string(),
            safety: 70,
            pollution: 40,
            cleanliness: 65,
            greenery: 55,
            budget: 25000.0,
            data_sources: vec!["Swachh Survekshan".to_string()],
        }
    }

    #[tokio::test]
    async fn test_fetch_by_city_keeps_insertion_order() {
        let store = MemoryStore::with_records(vec![
            new_neighborhood("Bandra", "Mumbai"),
            new_neighborhood("Aundh", "Pune"),
            new_neighborhood("Andheri", "Mumbai"),
        ])
        .unwrap();

        let mumbai = store.fetch_candidates(Some("Mumbai")).await;
        let names: Vec<&str> = mumbai.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Bandra", "Andheri"]);

        assert_eq!(store.fetch_candidates(None).await.len(), 3);
        assert!(store.fetch_candidates(Some("Atlantis")).await.is_empty());
    }

    #[tokio::test]
    async fn test_update_stamps_last_updated() {
        let store = MemoryStore::new();
        let created = store.create(new_neighborhood("Saket", "Delhi")).await;

        let patch = NeighborhoodPatch {
            safety: Some(90),
            ..Default::default()
        };
        let updated = store.update(created.id, patch).await.unwrap();

        assert_eq!(updated.safety, 90);
        assert_eq!(updated.id, created.id);
        assert!(updated.last_updated >= created.last_updated);
        assert!(store.update(Uuid::new_v4(), NeighborhoodPatch::default()).await.is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryStore::new();
        let created = store.create(new_neighborhood("Saket", "Delhi")).await;

        assert!(store.delete(created.id).await);
        assert!(!store.delete(created.id).await);
        assert!(store.fetch_candidates(None).await.is_empty());
    }

    #[test]
    fn test_invalid_seed_rejected() {
        let mut bad = new_neighborhood("Nowhere", "Delhi");
        bad.greenery = 150;

        assert!(matches!(
            MemoryStore::with_records(vec![bad]),
            Err(StoreError::InvalidRecord(_))
        ));
    }
}
