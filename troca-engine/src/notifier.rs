//! Notifier port definition.
//!
//! The engine only decides *whether* to notify; delivery belongs to an
//! adapter behind this port. All notifications are fire-and-forget:
//! delivery failure is logged by the caller and never fails the
//! triggering operation.

use async_trait::async_trait;
use thiserror::Error;
use troca_domain::CenterId;

/// Errors a notifier adapter can report.
///
/// These never propagate past the engine; they exist so adapters can
/// describe what went wrong in the log.
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    /// Delivery to the downstream channel failed
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// Adapter misconfigured (for example, malformed webhook URL)
    #[error("Notifier configuration error: {0}")]
    Config(String),
}

/// Port for occupancy and exchange alerts.
///
/// Implementations:
/// - `LogNotifier` - tracing only, for tests and development
/// - `DiscordNotifier` (troca-connectors) - Discord webhooks
#[async_trait]
pub trait NotifierPort: Send + Sync {
    /// A high-occupancy exemption was applied during an exchange.
    ///
    /// Sent once per high-occupancy center, with that center's offered
    /// and received point totals and the counterparty's name.
    async fn notify_exemption_used(
        &self,
        center_id: CenterId,
        center_name: &str,
        points_offered: u64,
        points_received: u64,
        other_center_name: &str,
    ) -> Result<(), NotifyError>;

    /// A center's occupation reached or exceeded its max capacity.
    async fn notify_capacity_reached(
        &self,
        center_id: CenterId,
        center_name: &str,
        max_capacity: u32,
    ) -> Result<(), NotifyError>;

    /// A center crossed the high-occupancy threshold (>= 90%).
    async fn notify_high_occupancy(
        &self,
        center_id: CenterId,
        center_name: &str,
        current_occupation: u32,
        max_capacity: u32,
    ) -> Result<(), NotifyError>;
}

/// Notifier that only writes to the log.
///
/// Used in tests and development where no webhook is configured.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl LogNotifier {
    /// Create a new log-only notifier.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotifierPort for LogNotifier {
    async fn notify_exemption_used(
        &self,
        center_id: CenterId,
        center_name: &str,
        points_offered: u64,
        points_received: u64,
        other_center_name: &str,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            %center_id,
            center_name,
            points_offered,
            points_received,
            other_center_name,
            "High-occupancy exemption applied in exchange"
        );
        Ok(())
    }

    async fn notify_capacity_reached(
        &self,
        center_id: CenterId,
        center_name: &str,
        max_capacity: u32,
    ) -> Result<(), NotifyError> {
        tracing::warn!(%center_id, center_name, max_capacity, "Center reached max capacity");
        Ok(())
    }

    async fn notify_high_occupancy(
        &self,
        center_id: CenterId,
        center_name: &str,
        current_occupation: u32,
        max_capacity: u32,
    ) -> Result<(), NotifyError> {
        tracing::warn!(
            %center_id,
            center_name,
            current_occupation,
            max_capacity,
            "Center at high occupancy"
        );
        Ok(())
    }
}
