//! Repository trait definitions (Ports)
//!
//! These traits define the storage interface for the domain.
//! Implementations can be PostgreSQL, in-memory, or mock for testing.

use crate::error::StoreError;
use async_trait::async_trait;
use troca_domain::{CenterId, CommunityCenter, ExchangeRecord};

/// Repository for CommunityCenter aggregates
#[async_trait]
pub trait CenterRepository: Send + Sync {
    /// Save a center (insert or update), returning the stored form
    async fn save(&self, center: &CommunityCenter) -> Result<CommunityCenter, StoreError>;

    /// Find a center by ID
    async fn find_by_id(&self, id: CenterId) -> Result<Option<CommunityCenter>, StoreError>;

    /// Find all centers
    async fn find_all(&self) -> Result<Vec<CommunityCenter>, StoreError>;
}

/// Repository for ExchangeRecord entries (append-only ledger)
///
/// Records are immutable once written; there is deliberately no update
/// or delete operation.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Append a record to the ledger, returning the stored form
    async fn append(&self, record: &ExchangeRecord) -> Result<ExchangeRecord, StoreError>;

    /// Find all records involving a center (either side)
    async fn find_by_center(&self, center_id: CenterId)
        -> Result<Vec<ExchangeRecord>, StoreError>;

    /// Find all records, oldest first
    async fn find_all(&self) -> Result<Vec<ExchangeRecord>, StoreError>;
}

/// Combined store interface
#[async_trait]
pub trait Store: Send + Sync {
    /// Get center repository
    fn centers(&self) -> &dyn CenterRepository;

    /// Get ledger repository
    fn ledger(&self) -> &dyn LedgerRepository;

    /// Begin a transaction (for implementations that support it)
    async fn begin_transaction(&self) -> Result<(), StoreError> {
        Ok(()) // Default no-op for non-transactional stores
    }

    /// Commit the current transaction
    async fn commit(&self) -> Result<(), StoreError> {
        Ok(()) // Default no-op
    }

    /// Rollback the current transaction
    async fn rollback(&self) -> Result<(), StoreError> {
        Ok(()) // Default no-op
    }
}
