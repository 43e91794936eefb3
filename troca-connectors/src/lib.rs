//! Troca Notification Connectors
//!
//! Outbound adapters for alert delivery.
//! Implements the engine's `NotifierPort` over Discord webhooks.

#![warn(clippy::all)]

// Public modules
pub mod discord;

// Re-exports
pub use discord::{DiscordNotifier, NotifierConfig};
