//! Troca Domain Layer
//!
//! Pure domain logic with zero I/O dependencies.
//! Contains entities, value objects, and domain rules.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
pub mod entities;
pub mod value_objects;

// Re-export commonly used types
pub use entities::{CenterId, CommunityCenter, ExchangeRecord, ExchangeRecordId};
pub use value_objects::{total_points, DomainError, GeoLocation, Resource, ResourceType};
