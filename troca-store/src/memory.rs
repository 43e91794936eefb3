//! In-memory store implementation
//!
//! Used for testing and development without a database.
//! Thread-safe using RwLock for concurrent access.

use crate::error::StoreError;
use crate::repository::{CenterRepository, LedgerRepository, Store};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use troca_domain::{CenterId, CommunityCenter, ExchangeRecord};

/// In-memory store for testing
pub struct MemoryStore {
    centers: RwLock<HashMap<CenterId, CommunityCenter>>,
    ledger: RwLock<Vec<ExchangeRecord>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store
    pub fn new() -> Self {
        Self {
            centers: RwLock::new(HashMap::new()),
            ledger: RwLock::new(Vec::new()),
        }
    }

    /// Get the number of centers
    pub fn center_count(&self) -> usize {
        self.centers.read().unwrap().len()
    }

    /// Get the number of ledger records
    pub fn ledger_count(&self) -> usize {
        self.ledger.read().unwrap().len()
    }

    /// Clear all data (useful for test setup)
    pub fn clear(&self) {
        self.centers.write().unwrap().clear();
        self.ledger.write().unwrap().clear();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Center Repository Implementation
// =============================================================================

#[async_trait]
impl CenterRepository for MemoryStore {
    async fn save(&self, center: &CommunityCenter) -> Result<CommunityCenter, StoreError> {
        let mut centers = self.centers.write().unwrap();
        centers.insert(center.id, center.clone());
        Ok(center.clone())
    }

    async fn find_by_id(&self, id: CenterId) -> Result<Option<CommunityCenter>, StoreError> {
        let centers = self.centers.read().unwrap();
        Ok(centers.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<CommunityCenter>, StoreError> {
        let centers = self.centers.read().unwrap();
        Ok(centers.values().cloned().collect())
    }
}

// =============================================================================
// Ledger Repository Implementation
// =============================================================================

#[async_trait]
impl LedgerRepository for MemoryStore {
    async fn append(&self, record: &ExchangeRecord) -> Result<ExchangeRecord, StoreError> {
        let mut ledger = self.ledger.write().unwrap();
        // Ledger is append-only: a second write of the same id is a bug
        if ledger.iter().any(|r| r.id == record.id) {
            return Err(StoreError::duplicate("exchange_record", record.id.to_string()));
        }
        ledger.push(record.clone());
        Ok(record.clone())
    }

    async fn find_by_center(
        &self,
        center_id: CenterId,
    ) -> Result<Vec<ExchangeRecord>, StoreError> {
        let ledger = self.ledger.read().unwrap();
        Ok(ledger
            .iter()
            .filter(|r| r.center_one_id == center_id || r.center_two_id == center_id)
            .cloned()
            .collect())
    }

    async fn find_all(&self) -> Result<Vec<ExchangeRecord>, StoreError> {
        let ledger = self.ledger.read().unwrap();
        Ok(ledger.clone())
    }
}

// =============================================================================
// Store Implementation
// =============================================================================

#[async_trait]
impl Store for MemoryStore {
    fn centers(&self) -> &dyn CenterRepository {
        self
    }

    fn ledger(&self) -> &dyn LedgerRepository {
        self
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use troca_domain::{GeoLocation, Resource, ResourceType};
    use uuid::Uuid;

    fn create_test_center(name: &str) -> CommunityCenter {
        CommunityCenter::new(
            name,
            Some("Rua das Flores, 100".to_string()),
            GeoLocation::new(-23.55, -46.63).unwrap(),
            Some(100),
            20,
            vec![Resource::new(ResourceType::CestaBasica, 10)],
        )
        .unwrap()
    }

    fn create_test_record(center_one: CenterId, center_two: CenterId) -> ExchangeRecord {
        ExchangeRecord::new(
            center_one,
            center_two,
            vec![Resource::new(ResourceType::CestaBasica, 5)],
            vec![Resource::new(ResourceType::Voluntario, 2)],
            true,
        )
    }

    // Center Repository Tests
    #[tokio::test]
    async fn test_center_save_and_find() {
        let store = MemoryStore::new();
        let center = create_test_center("Centro Norte");
        let id = center.id;

        let stored = CenterRepository::save(&store, &center).await.unwrap();
        assert_eq!(stored.id, id);

        let found = CenterRepository::find_by_id(&store, id).await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().name, "Centro Norte");
    }

    #[tokio::test]
    async fn test_center_save_is_upsert() {
        let store = MemoryStore::new();
        let mut center = create_test_center("Centro Norte");

        CenterRepository::save(&store, &center).await.unwrap();
        center.set_occupation(90).unwrap();
        CenterRepository::save(&store, &center).await.unwrap();

        assert_eq!(store.center_count(), 1);
        let found = CenterRepository::find_by_id(&store, center.id).await.unwrap().unwrap();
        assert_eq!(found.current_occupation, 90);
    }

    #[tokio::test]
    async fn test_center_find_missing_returns_none() {
        let store = MemoryStore::new();
        let found = CenterRepository::find_by_id(&store, Uuid::now_v7()).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_center_find_all() {
        let store = MemoryStore::new();
        CenterRepository::save(&store, &create_test_center("Centro A")).await.unwrap();
        CenterRepository::save(&store, &create_test_center("Centro B")).await.unwrap();

        let all = CenterRepository::find_all(&store).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    // Ledger Repository Tests
    #[tokio::test]
    async fn test_ledger_append_and_find() {
        let store = MemoryStore::new();
        let record = create_test_record(Uuid::now_v7(), Uuid::now_v7());

        let stored = LedgerRepository::append(&store, &record).await.unwrap();
        assert_eq!(stored.id, record.id);
        assert_eq!(store.ledger_count(), 1);
    }

    #[tokio::test]
    async fn test_ledger_rejects_duplicate_id() {
        let store = MemoryStore::new();
        let record = create_test_record(Uuid::now_v7(), Uuid::now_v7());

        LedgerRepository::append(&store, &record).await.unwrap();
        let result = LedgerRepository::append(&store, &record).await;
        assert!(matches!(result, Err(StoreError::Duplicate { .. })));
        assert_eq!(store.ledger_count(), 1);
    }

    #[tokio::test]
    async fn test_ledger_find_by_center_matches_either_side() {
        let store = MemoryStore::new();
        let center_a = Uuid::now_v7();
        let center_b = Uuid::now_v7();
        let center_c = Uuid::now_v7();

        LedgerRepository::append(&store, &create_test_record(center_a, center_b))
            .await
            .unwrap();
        LedgerRepository::append(&store, &create_test_record(center_c, center_a))
            .await
            .unwrap();
        LedgerRepository::append(&store, &create_test_record(center_b, center_c))
            .await
            .unwrap();

        let found = LedgerRepository::find_by_center(&store, center_a).await.unwrap();
        assert_eq!(found.len(), 2);

        let found = LedgerRepository::find_by_center(&store, Uuid::now_v7()).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_ledger_find_all_preserves_order() {
        let store = MemoryStore::new();
        let first = create_test_record(Uuid::now_v7(), Uuid::now_v7());
        let second = create_test_record(Uuid::now_v7(), Uuid::now_v7());

        LedgerRepository::append(&store, &first).await.unwrap();
        LedgerRepository::append(&store, &second).await.unwrap();

        let all = LedgerRepository::find_all(&store).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, first.id);
        assert_eq!(all[1].id, second.id);
    }

    // Store Tests
    #[tokio::test]
    async fn test_store_clear() {
        let store = MemoryStore::new();
        CenterRepository::save(&store, &create_test_center("Centro")).await.unwrap();
        LedgerRepository::append(&store, &create_test_record(Uuid::now_v7(), Uuid::now_v7()))
            .await
            .unwrap();

        assert_eq!(store.center_count(), 1);
        assert_eq!(store.ledger_count(), 1);

        store.clear();

        assert_eq!(store.center_count(), 0);
        assert_eq!(store.ledger_count(), 0);
    }
}
