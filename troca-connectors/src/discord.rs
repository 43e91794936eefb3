//! Discord Webhook Notifier
//!
//! Delivers occupancy and exchange alerts as Discord webhook embeds:
//! - Capacity and high-occupancy alerts go to the general-alerts channel
//! - Exemption-use notifications go to the exchange-alerts channel
//!
//! Deliveries are fire-and-forget from the engine's point of view: an
//! unconfigured webhook URL is skipped with a warning, and HTTP failures
//! are reported as `NotifyError` for the caller to log.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use troca_domain::CenterId;
use troca_engine::{NotifierPort, NotifyError};

// =============================================================================
// Constants
// =============================================================================

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Embed color for capacity alerts (red)
const COLOR_CAPACITY: u32 = 16_711_680;

/// Embed color for high-occupancy warnings (yellow)
const COLOR_OCCUPANCY: u32 = 16_776_960;

/// Embed color for exemption notifications (light blue)
const COLOR_EXEMPTION: u32 = 65_535;

/// Placeholder marker left in unconfigured webhook URL templates
const PLACEHOLDER_MARKER: &str = "ID_WEBHOOK";

// =============================================================================
// Configuration
// =============================================================================

/// Webhook URLs for the two alert channels.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Channel for capacity and occupancy alerts
    pub general_webhook_url: String,
    /// Channel for exchange exemption notifications
    pub exchange_webhook_url: String,
}

impl NotifierConfig {
    /// Load webhook URLs from environment variables.
    ///
    /// Reads `TROCA_WEBHOOK_GENERAL` and `TROCA_WEBHOOK_EXCHANGE`,
    /// loading a `.env` file first if one is present. Missing variables
    /// yield empty URLs, which disable the corresponding channel.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            general_webhook_url: std::env::var("TROCA_WEBHOOK_GENERAL").unwrap_or_default(),
            exchange_webhook_url: std::env::var("TROCA_WEBHOOK_EXCHANGE").unwrap_or_default(),
        }
    }
}

// =============================================================================
// Webhook payload
// =============================================================================

/// Top-level Discord webhook payload.
#[derive(Debug, Clone, Serialize)]
struct DiscordWebhookMessage {
    username: String,
    embeds: Vec<Embed>,
}

/// One Discord embed block.
#[derive(Debug, Clone, Serialize)]
struct Embed {
    title: String,
    description: String,
    /// Decimal-encoded RGB color
    color: u32,
    fields: Vec<Field>,
    /// RFC 3339 timestamp
    timestamp: String,
}

/// Key/value pair rendered inside an embed.
#[derive(Debug, Clone, Serialize)]
struct Field {
    name: String,
    value: String,
    inline: bool,
}

impl Field {
    fn inline(name: &str, value: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            inline: true,
        }
    }
}

// =============================================================================
// Discord Notifier
// =============================================================================

/// `NotifierPort` adapter that posts alerts to Discord webhooks.
pub struct DiscordNotifier {
    client: Client,
    config: NotifierConfig,
}

impl DiscordNotifier {
    /// Create a notifier with explicit webhook URLs.
    ///
    /// # Errors
    /// Returns `NotifyError::Config` when the HTTP client cannot be
    /// constructed.
    pub fn new(config: NotifierConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| NotifyError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create a notifier configured from the environment.
    ///
    /// # Errors
    /// Returns `NotifyError::Config` when the HTTP client cannot be
    /// constructed.
    pub fn from_env() -> Result<Self, NotifyError> {
        Self::new(NotifierConfig::from_env())
    }

    /// Post one webhook message.
    ///
    /// A blank or placeholder URL means the channel is not configured;
    /// the message is dropped with a warning rather than failing.
    async fn post(&self, message: &DiscordWebhookMessage, webhook_url: &str) -> Result<(), NotifyError> {
        if webhook_url.trim().is_empty() || webhook_url.contains(PLACEHOLDER_MARKER) {
            warn!(username = %message.username, "Discord webhook URL not configured, notification skipped");
            return Ok(());
        }

        let response = self
            .client
            .post(webhook_url)
            .json(message)
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(format!("Discord webhook request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(NotifyError::Delivery(format!(
                "Discord webhook returned status {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl NotifierPort for DiscordNotifier {
    async fn notify_exemption_used(
        &self,
        center_id: CenterId,
        center_name: &str,
        points_offered: u64,
        points_received: u64,
        other_center_name: &str,
    ) -> Result<(), NotifyError> {
        let message = DiscordWebhookMessage {
            username: "Exchange Alerts".to_string(),
            embeds: vec![Embed {
                title: "High-Occupancy Exemption Applied".to_string(),
                description: format!(
                    "A high-occupancy exemption was applied during a resource exchange.\n\
                     **Center:** {}\n**Other center:** {}",
                    center_name, other_center_name
                ),
                color: COLOR_EXEMPTION,
                fields: vec![
                    Field::inline("Center ID", center_id),
                    Field::inline("Points offered", points_offered),
                    Field::inline("Points received", points_received),
                ],
                timestamp: Utc::now().to_rfc3339(),
            }],
        };

        self.post(&message, &self.config.exchange_webhook_url).await?;
        info!(center_id = %center_id, center_name, "Exemption notification sent to Discord");
        Ok(())
    }

    async fn notify_capacity_reached(
        &self,
        center_id: CenterId,
        center_name: &str,
        max_capacity: u32,
    ) -> Result<(), NotifyError> {
        let message = DiscordWebhookMessage {
            username: "Capacity Alerts".to_string(),
            embeds: vec![Embed {
                title: "MAXIMUM CAPACITY REACHED".to_string(),
                description: format!(
                    "Community center **{}** has reached or exceeded its maximum capacity.",
                    center_name
                ),
                color: COLOR_CAPACITY,
                fields: vec![
                    Field::inline("Center ID", center_id),
                    Field::inline("Max capacity", max_capacity),
                ],
                timestamp: Utc::now().to_rfc3339(),
            }],
        };

        self.post(&message, &self.config.general_webhook_url).await?;
        info!(center_id = %center_id, center_name, "Capacity alert sent to Discord");
        Ok(())
    }

    async fn notify_high_occupancy(
        &self,
        center_id: CenterId,
        center_name: &str,
        current_occupation: u32,
        max_capacity: u32,
    ) -> Result<(), NotifyError> {
        let message = DiscordWebhookMessage {
            username: "Occupancy Alerts".to_string(),
            embeds: vec![Embed {
                title: "HIGH OCCUPANCY DETECTED".to_string(),
                description: format!(
                    "Community center **{}** is at high occupancy.",
                    center_name
                ),
                color: COLOR_OCCUPANCY,
                fields: vec![
                    Field::inline("Center ID", center_id),
                    Field::inline("Current occupation", current_occupation),
                    Field::inline("Max capacity", max_capacity),
                ],
                timestamp: Utc::now().to_rfc3339(),
            }],
        };

        self.post(&message, &self.config.general_webhook_url).await?;
        info!(center_id = %center_id, center_name, "High-occupancy warning sent to Discord");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn unconfigured() -> DiscordNotifier {
        DiscordNotifier::new(NotifierConfig {
            general_webhook_url: String::new(),
            exchange_webhook_url: "https://discord.com/api/webhooks/ID_WEBHOOK/token".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_blank_url_skips_delivery() {
        let notifier = unconfigured();
        // No server involved: blank URL short-circuits to Ok
        notifier
            .notify_capacity_reached(Uuid::now_v7(), "Centro A", 100)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_placeholder_url_skips_delivery() {
        let notifier = unconfigured();
        notifier
            .notify_exemption_used(Uuid::now_v7(), "Centro A", 2, 4, "Centro B")
            .await
            .unwrap();
    }

    #[test]
    fn test_payload_shape() {
        let message = DiscordWebhookMessage {
            username: "Capacity Alerts".to_string(),
            embeds: vec![Embed {
                title: "t".to_string(),
                description: "d".to_string(),
                color: COLOR_CAPACITY,
                fields: vec![Field::inline("Max capacity", 100)],
                timestamp: "2026-01-01T00:00:00Z".to_string(),
            }],
        };

        let json: serde_json::Value = serde_json::to_value(&message).unwrap();
        assert_eq!(json["username"], "Capacity Alerts");
        assert_eq!(json["embeds"][0]["color"], 16_711_680);
        assert_eq!(json["embeds"][0]["fields"][0]["inline"], true);
    }

    #[test]
    fn test_config_defaults_to_empty_urls() {
        // Without the env vars set, both channels come back disabled
        std::env::remove_var("TROCA_WEBHOOK_GENERAL");
        std::env::remove_var("TROCA_WEBHOOK_EXCHANGE");
        let config = NotifierConfig::from_env();
        assert!(config.general_webhook_url.is_empty());
        assert!(config.exchange_webhook_url.is_empty());
    }
}
