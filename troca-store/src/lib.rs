//! Troca Storage Layer
//!
//! Provides persistence for community centers and the exchange ledger.
//!
//! # Architecture
//!
//! - **Repository traits**: Define the storage interface (ports)
//! - **In-memory store**: Fast implementation for testing
//! - **PostgreSQL store**: Production implementation (feature `postgres`)
//!
//! # Usage
//!
//! ```rust
//! use troca_store::{CenterRepository, MemoryStore};
//! use troca_domain::{CommunityCenter, GeoLocation};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryStore::new();
//!
//!     let center = CommunityCenter::new(
//!         "Centro Zona Sul",
//!         None,
//!         GeoLocation::new(-23.65, -46.64).unwrap(),
//!         Some(100),
//!         20,
//!         vec![],
//!     )
//!     .unwrap();
//!
//!     let stored = store.save(&center).await.unwrap();
//!     println!("Saved center {}", stored.id);
//! }
//! ```

#![warn(clippy::all)]

// Modules
mod error;
mod memory;
#[cfg(feature = "postgres")]
mod postgres;
mod repository;

// Re-exports
pub use error::StoreError;
pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PgStore;
pub use repository::{CenterRepository, LedgerRepository, Store};
