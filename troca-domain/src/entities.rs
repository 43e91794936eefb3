//! Domain Entities for Troca
//!
//! Core business entities with lifecycle management.
//! All entities have identity and validated state transitions.

use crate::value_objects::{total_points, DomainError, GeoLocation, Resource, ResourceType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a CommunityCenter
pub type CenterId = Uuid;

/// Unique identifier for an ExchangeRecord
pub type ExchangeRecordId = Uuid;

// =============================================================================
// CommunityCenter
// =============================================================================

/// A physical site with a resource inventory and occupancy state.
///
/// # Invariants
/// - `current_occupation <= max_capacity` when capacity is set
/// - `max_capacity >= 1` when set (a zero-capacity center is meaningless)
/// - At most one inventory entry per `ResourceType`; entries that reach
///   quantity 0 are removed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityCenter {
    /// Stable unique id
    pub id: CenterId,
    /// Display name, non-blank
    pub name: String,
    /// Street address, if known
    pub address: Option<String>,
    /// Geographic coordinates
    pub location: GeoLocation,
    /// Maximum occupancy; `None` means uncapped
    pub max_capacity: Option<u32>,
    /// Current number of people at the center
    pub current_occupation: u32,
    /// Inventory, coalesced by type
    pub resources: Vec<Resource>,

    // Audit
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: Option<DateTime<Utc>>,
}

impl CommunityCenter {
    /// Create a new center, validating all invariants.
    ///
    /// The initial inventory is coalesced by type and zero-quantity
    /// entries are dropped.
    ///
    /// # Errors
    /// - `DomainError::InvalidName` when the name is blank
    /// - `DomainError::InvalidOccupation` when capacity is 0 or
    ///   occupation exceeds capacity
    pub fn new(
        name: impl Into<String>,
        address: Option<String>,
        location: GeoLocation,
        max_capacity: Option<u32>,
        current_occupation: u32,
        resources: Vec<Resource>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::InvalidName("Center name cannot be blank".to_string()));
        }

        if let Some(capacity) = max_capacity {
            if capacity < 1 {
                return Err(DomainError::InvalidOccupation(
                    "Max capacity must be at least 1".to_string(),
                ));
            }
            if current_occupation > capacity {
                return Err(DomainError::InvalidOccupation(format!(
                    "Occupation {} exceeds max capacity {}",
                    current_occupation, capacity
                )));
            }
        }

        Ok(Self {
            id: Uuid::now_v7(),
            name,
            address,
            location,
            max_capacity,
            current_occupation,
            resources: coalesce(resources),
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    /// Ratio-based occupancy check: occupation / capacity >= 0.90.
    ///
    /// A center with no capacity limit is never high-occupancy.
    /// Integer arithmetic, so 90% exactly counts as high.
    pub fn is_high_occupancy(&self) -> bool {
        match self.max_capacity {
            Some(capacity) => {
                u64::from(self.current_occupation) * 10 >= u64::from(capacity) * 9
            },
            None => false,
        }
    }

    /// True when occupation has reached or exceeded a defined capacity.
    pub fn is_at_capacity(&self) -> bool {
        match self.max_capacity {
            Some(capacity) => self.current_occupation >= capacity,
            None => false,
        }
    }

    /// Current inventory quantity of a type (0 when absent).
    pub fn quantity_of(&self, resource_type: ResourceType) -> u32 {
        self.resources
            .iter()
            .find(|r| r.resource_type == resource_type)
            .map(|r| r.quantity)
            .unwrap_or(0)
    }

    /// Set the current occupation, re-validating against capacity.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidOccupation` when the new occupation
    /// exceeds a defined capacity.
    pub fn set_occupation(&mut self, occupation: u32) -> Result<(), DomainError> {
        if let Some(capacity) = self.max_capacity {
            if occupation > capacity {
                return Err(DomainError::InvalidOccupation(format!(
                    "New occupation {} exceeds max capacity {} of center {}",
                    occupation, capacity, self.name
                )));
            }
        }
        self.current_occupation = occupation;
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    /// Apply one side of a completed exchange to the inventory.
    ///
    /// Decrements each offered entry, merges each received entry
    /// (creating it when absent), then removes entries at quantity 0.
    /// Sufficiency and receive-side headroom must have been checked
    /// against this inventory before calling; decrements and increments
    /// saturate rather than wrap.
    pub fn apply_exchange(&mut self, offered: &[Resource], received: &[Resource]) {
        for give in offered {
            if let Some(existing) = self
                .resources
                .iter_mut()
                .find(|r| r.resource_type == give.resource_type)
            {
                existing.quantity = existing.quantity.saturating_sub(give.quantity);
            }
        }

        for take in received {
            match self
                .resources
                .iter_mut()
                .find(|r| r.resource_type == take.resource_type)
            {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(take.quantity)
                },
                None => self.resources.push(*take),
            }
        }

        self.resources.retain(|r| r.quantity > 0);
        self.updated_at = Some(Utc::now());
    }
}

/// Merge duplicate entries by type and drop zero quantities,
/// preserving first-seen order. Merged quantities saturate at
/// `u32::MAX` rather than wrap.
fn coalesce(resources: Vec<Resource>) -> Vec<Resource> {
    let mut merged: Vec<Resource> = Vec::with_capacity(resources.len());
    for r in resources {
        match merged.iter_mut().find(|m| m.resource_type == r.resource_type) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(r.quantity),
            None => merged.push(r),
        }
    }
    merged.retain(|r| r.quantity > 0);
    merged
}

// =============================================================================
// ExchangeRecord
// =============================================================================

/// Immutable snapshot of a completed trade.
///
/// Built from pre-mutation offer snapshots so the record reflects what
/// was actually traded, not the post-mutation inventories. Created only
/// by a successful exchange; never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    /// Record id
    pub id: ExchangeRecordId,
    /// First center involved
    pub center_one_id: CenterId,
    /// Second center involved
    pub center_two_id: CenterId,
    /// Resources center one gave up
    pub offered_by_center_one: Vec<Resource>,
    /// Resources center one received
    pub received_by_center_one: Vec<Resource>,
    /// Resources center two gave up
    pub offered_by_center_two: Vec<Resource>,
    /// Resources center two received
    pub received_by_center_two: Vec<Resource>,
    /// Point total of center one's offer
    pub points_center_one: u64,
    /// Point total of center two's offer
    pub points_center_two: u64,
    /// Whether the high-occupancy exemption waived point parity
    pub high_occupancy_exemption_applied: bool,
    /// When the trade completed
    pub exchanged_at: DateTime<Utc>,
    /// Net trade value: max of both totals under exemption, else the
    /// common total
    pub points_exchanged: u64,
}

impl ExchangeRecord {
    /// Build a record from pre-mutation offer snapshots.
    ///
    /// Each side's received list is the counterpart's offer. When the
    /// exemption applied, `points_exchanged` is the larger total;
    /// otherwise the totals are equal by the parity rule and
    /// center one's total is recorded.
    pub fn new(
        center_one_id: CenterId,
        center_two_id: CenterId,
        offered_by_center_one: Vec<Resource>,
        offered_by_center_two: Vec<Resource>,
        high_occupancy_exemption_applied: bool,
    ) -> Self {
        let points_center_one = total_points(&offered_by_center_one);
        let points_center_two = total_points(&offered_by_center_two);
        let points_exchanged = if high_occupancy_exemption_applied {
            points_center_one.max(points_center_two)
        } else {
            points_center_one
        };

        Self {
            id: Uuid::now_v7(),
            center_one_id,
            center_two_id,
            received_by_center_one: offered_by_center_two.clone(),
            received_by_center_two: offered_by_center_one.clone(),
            offered_by_center_one,
            offered_by_center_two,
            points_center_one,
            points_center_two,
            high_occupancy_exemption_applied,
            exchanged_at: Utc::now(),
            points_exchanged,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
