//! Troca Exchange Engine
//!
//! Validates two-sided resource offers, enforces point parity with the
//! high-occupancy exemption, atomically mutates both inventories, and
//! records an immutable ledger entry.
//!
//! # Architecture
//!
//! ```text
//! ExchangeRequest → ExchangeEngine → Store (centers + ledger)
//!                                  → NotifierPort (fire-and-forget)
//! ```
//!
//! # Components
//!
//! - **ExchangeEngine**: orchestration with per-center-id critical sections
//! - **NotifierPort**: trait for occupancy/exemption alerts, with a
//!   log-only stub for tests
//! - **EngineError**: typed errors for each rejection reason
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use troca_engine::{ExchangeEngine, ExchangeRequest, LogNotifier};
//! use troca_store::MemoryStore;
//!
//! let engine = ExchangeEngine::new(Arc::new(MemoryStore::new()), Arc::new(LogNotifier::new()));
//! let record = engine.exchange(request).await?;
//! ```

#![warn(clippy::all)]

pub mod error;
pub mod exchange;
pub mod notifier;

// Re-exports for convenience
pub use error::{EngineError, EngineResult};
pub use exchange::{ExchangeEngine, ExchangeRequest};
pub use notifier::{LogNotifier, NotifierPort, NotifyError};
