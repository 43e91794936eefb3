//! PostgreSQL store implementation.
//!
//! Centers are stored one row per aggregate with the resource list as a
//! JSONB column; the ledger is an append-only table (insert only, no
//! update path exists in code).
//!
//! This module uses dynamic queries (sqlx::query) instead of compile-time
//! checked macros (sqlx::query!) to allow compilation without DATABASE_URL.

use crate::error::StoreError;
use crate::repository::{CenterRepository, LedgerRepository, Store};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::sync::Arc;
use troca_domain::{CenterId, CommunityCenter, ExchangeRecord, GeoLocation, Resource};

/// PostgreSQL-backed store.
///
/// Wraps a connection pool; cloneable via `Arc` sharing.
pub struct PgStore {
    /// PostgreSQL connection pool
    pool: Arc<PgPool>,
}

impl PgStore {
    /// Create a new PostgreSQL store.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool (for testing).
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Decode a JSONB resource list column.
fn resources_from_json(value: serde_json::Value, column: &str) -> Result<Vec<Resource>, StoreError> {
    serde_json::from_value(value)
        .map_err(|e| StoreError::Deserialization(format!("Invalid {} column: {}", column, e)))
}

/// Encode a resource list for a JSONB column.
fn resources_to_json(resources: &[Resource]) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(resources).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Parse one `community_centers` row.
fn parse_center_row(row: &sqlx::postgres::PgRow) -> Result<CommunityCenter, StoreError> {
    let max_capacity: Option<i32> = row.try_get("max_capacity")?;
    let current_occupation: i32 = row.try_get("current_occupation")?;
    let latitude: f64 = row.try_get("latitude")?;
    let longitude: f64 = row.try_get("longitude")?;
    let resources: serde_json::Value = row.try_get("resources")?;

    let location = GeoLocation::new(latitude, longitude)
        .map_err(|e| StoreError::Deserialization(format!("Invalid location: {}", e)))?;

    Ok(CommunityCenter {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        location,
        max_capacity: max_capacity.map(|c| c as u32),
        current_occupation: current_occupation as u32,
        resources: resources_from_json(resources, "resources")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Parse one `exchange_ledger` row.
fn parse_record_row(row: &sqlx::postgres::PgRow) -> Result<ExchangeRecord, StoreError> {
    let points_center_one: i64 = row.try_get("points_center_one")?;
    let points_center_two: i64 = row.try_get("points_center_two")?;
    let points_exchanged: i64 = row.try_get("points_exchanged")?;

    Ok(ExchangeRecord {
        id: row.try_get("id")?,
        center_one_id: row.try_get("center_one_id")?,
        center_two_id: row.try_get("center_two_id")?,
        offered_by_center_one: resources_from_json(
            row.try_get("offered_by_center_one")?,
            "offered_by_center_one",
        )?,
        received_by_center_one: resources_from_json(
            row.try_get("received_by_center_one")?,
            "received_by_center_one",
        )?,
        offered_by_center_two: resources_from_json(
            row.try_get("offered_by_center_two")?,
            "offered_by_center_two",
        )?,
        received_by_center_two: resources_from_json(
            row.try_get("received_by_center_two")?,
            "received_by_center_two",
        )?,
        points_center_one: points_center_one as u64,
        points_center_two: points_center_two as u64,
        high_occupancy_exemption_applied: row.try_get("high_occupancy_exemption_applied")?,
        exchanged_at: row.try_get("exchanged_at")?,
        points_exchanged: points_exchanged as u64,
    })
}

// =============================================================================
// Center Repository Implementation
// =============================================================================

#[async_trait]
impl CenterRepository for PgStore {
    async fn save(&self, center: &CommunityCenter) -> Result<CommunityCenter, StoreError> {
        let resources = resources_to_json(&center.resources)?;

        sqlx::query(
            r#"
            INSERT INTO community_centers (
                id, name, address, latitude, longitude,
                max_capacity, current_occupation, resources,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                address = EXCLUDED.address,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                max_capacity = EXCLUDED.max_capacity,
                current_occupation = EXCLUDED.current_occupation,
                resources = EXCLUDED.resources,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(center.id)
        .bind(&center.name)
        .bind(&center.address)
        .bind(center.location.latitude)
        .bind(center.location.longitude)
        .bind(center.max_capacity.map(|c| c as i32))
        .bind(center.current_occupation as i32)
        .bind(resources)
        .bind(center.created_at)
        .bind(center.updated_at)
        .execute(&*self.pool)
        .await?;

        Ok(center.clone())
    }

    async fn find_by_id(&self, id: CenterId) -> Result<Option<CommunityCenter>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, address, latitude, longitude,
                   max_capacity, current_occupation, resources,
                   created_at, updated_at
            FROM community_centers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&*self.pool)
        .await?;

        row.map(|r| parse_center_row(&r)).transpose()
    }

    async fn find_all(&self) -> Result<Vec<CommunityCenter>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, address, latitude, longitude,
                   max_capacity, current_occupation, resources,
                   created_at, updated_at
            FROM community_centers
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        rows.iter().map(parse_center_row).collect()
    }
}

// =============================================================================
// Ledger Repository Implementation
// =============================================================================

#[async_trait]
impl LedgerRepository for PgStore {
    async fn append(&self, record: &ExchangeRecord) -> Result<ExchangeRecord, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO exchange_ledger (
                id, center_one_id, center_two_id,
                offered_by_center_one, received_by_center_one,
                offered_by_center_two, received_by_center_two,
                points_center_one, points_center_two,
                high_occupancy_exemption_applied,
                exchanged_at, points_exchanged
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(record.id)
        .bind(record.center_one_id)
        .bind(record.center_two_id)
        .bind(resources_to_json(&record.offered_by_center_one)?)
        .bind(resources_to_json(&record.received_by_center_one)?)
        .bind(resources_to_json(&record.offered_by_center_two)?)
        .bind(resources_to_json(&record.received_by_center_two)?)
        .bind(record.points_center_one as i64)
        .bind(record.points_center_two as i64)
        .bind(record.high_occupancy_exemption_applied)
        .bind(record.exchanged_at)
        .bind(record.points_exchanged as i64)
        .execute(&*self.pool)
        .await?;

        Ok(record.clone())
    }

    async fn find_by_center(
        &self,
        center_id: CenterId,
    ) -> Result<Vec<ExchangeRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, center_one_id, center_two_id,
                   offered_by_center_one, received_by_center_one,
                   offered_by_center_two, received_by_center_two,
                   points_center_one, points_center_two,
                   high_occupancy_exemption_applied,
                   exchanged_at, points_exchanged
            FROM exchange_ledger
            WHERE center_one_id = $1 OR center_two_id = $1
            ORDER BY exchanged_at ASC
            "#,
        )
        .bind(center_id)
        .fetch_all(&*self.pool)
        .await?;

        rows.iter().map(parse_record_row).collect()
    }

    async fn find_all(&self) -> Result<Vec<ExchangeRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, center_one_id, center_two_id,
                   offered_by_center_one, received_by_center_one,
                   offered_by_center_two, received_by_center_two,
                   points_center_one, points_center_two,
                   high_occupancy_exemption_applied,
                   exchanged_at, points_exchanged
            FROM exchange_ledger
            ORDER BY exchanged_at ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        rows.iter().map(parse_record_row).collect()
    }
}

// =============================================================================
// Store Implementation
// =============================================================================

#[async_trait]
impl Store for PgStore {
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
