//! Engine layer error types.

use thiserror::Error;
use troca_domain::{CenterId, ResourceType};

/// Errors surfaced by the exchange engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Request malformed: same center on both sides, empty offer list,
    /// or non-positive offered quantity
    #[error("Invalid exchange: {0}")]
    InvalidExchange(String),

    /// Either center id could not be resolved
    #[error("Community center not found: {0}")]
    CenterNotFound(CenterId),

    /// Offering center lacks the required quantity of a type
    #[error(
        "Center {center} lacks sufficient {resource_type}: requires {required}, has {available}"
    )]
    InsufficientResources {
        /// Name of the offering center
        center: String,
        /// Resource type that fell short
        resource_type: ResourceType,
        /// Quantity the offer requires
        required: u32,
        /// Quantity actually held
        available: u32,
    },

    /// Point totals differ and no high-occupancy exemption applies
    #[error(
        "Exchange requires equal points unless a center is at high occupancy. \
         Center one: {points_center_one}, center two: {points_center_two}"
    )]
    UnbalancedExchange {
        /// Point total of center one's offer
        points_center_one: u64,
        /// Point total of center two's offer
        points_center_two: u64,
    },

    /// Store error (opaque infrastructure failure, not retried)
    #[error("Store error: {0}")]
    Store(#[from] troca_store::StoreError),

    /// Domain error
    #[error("Domain error: {0}")]
    Domain(#[from] troca_domain::DomainError),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
