//! Payment processor client.
//!
//! Thin wrapper over the processor's checkout-session API: the server
//! creates a session with the priced line items and redirects the
//! customer to the hosted payment page; the processor calls back on the
//! webhook when the session completes. Only what checkout needs - this
//! is not a general SDK.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use frantoio_core::types::SubscriptionInterval;

use crate::config::PaymentConfig;

// =============================================================================
// Types
// =============================================================================

/// Session mode: single payment or recurring subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutMode {
    Payment,
    Subscription,
}

/// One priced line of a checkout session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionLineItem {
    pub name: String,
    /// Gross unit amount in euro cents.
    pub unit_amount_cents: i64,
    pub quantity: i64,
    /// Recurrence for subscription mode, omitted for one-time items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<SubscriptionInterval>,
}

/// Request body for session creation.
#[derive(Debug, Clone, Serialize)]
pub struct CreateSessionRequest {
    pub mode: CheckoutMode,
    pub currency: &'static str,
    pub line_items: Vec<SessionLineItem>,
    /// Shipping charged as its own line on the processor side.
    pub shipping_amount_cents: i64,
    pub customer_email: String,
    pub success_url: String,
    pub cancel_url: String,
    /// Our order id, echoed back in webhook events.
    pub client_reference_id: String,
}

/// A created checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Processor session id (e.g. "cs_...").
    pub id: String,
    /// Hosted payment page the customer is redirected to.
    pub url: String,
}

/// Webhook event envelope posted by the processor.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    /// Event type, e.g. "checkout.session.completed".
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    pub object: WebhookSessionObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookSessionObject {
    /// Session id the event refers to.
    pub id: String,
}

/// Session-completed event type.
pub const EVENT_SESSION_COMPLETED: &str = "checkout.session.completed";

// =============================================================================
// Errors
// =============================================================================

/// Payment client errors.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The HTTP request never completed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The processor answered with a non-success status.
    #[error("Processor returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The processor's response did not parse.
    #[error("Invalid processor response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        PaymentError::Transport(err.to_string())
    }
}

// =============================================================================
// Client
// =============================================================================

/// Per-request timeout towards the processor.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Checkout-session client.
pub struct PaymentClient {
    client: Client,
    config: PaymentConfig,
}

impl PaymentClient {
    /// Creates a new payment client.
    pub fn new(config: PaymentConfig) -> Self {
        PaymentClient {
            client: Client::new(),
            config,
        }
    }

    /// Creates a checkout session and returns its id + redirect URL.
    pub async fn create_checkout_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!(
            "{}/v1/checkout/sessions",
            self.config.api_url.trim_end_matches('/')
        );

        debug!(
            mode = ?request.mode,
            lines = request.line_items.len(),
            order = %request.client_reference_id,
            "Creating checkout session"
        );

        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(&self.config.secret_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| PaymentError::InvalidResponse(e.to_string()))
    }

    /// Checks the webhook shared secret sent by the processor.
    ///
    /// Comparison walks the whole string regardless of where the first
    /// mismatch is.
    pub fn verify_webhook_secret(&self, presented: &str) -> bool {
        let expected = self.config.webhook_secret.as_bytes();
        let presented = presented.as_bytes();

        if expected.len() != presented.len() {
            return false;
        }
        let mut diff = 0u8;
        for (a, b) in expected.iter().zip(presented.iter()) {
            diff |= a ^ b;
        }
        diff == 0
    }

    /// The configured success redirect.
    pub fn success_url(&self) -> &str {
        &self.config.success_url
    }

    /// The configured cancel redirect.
    pub fn cancel_url(&self) -> &str {
        &self.config.cancel_url
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PaymentClient {
        PaymentClient::new(PaymentConfig {
            api_url: "https://api.payments.example".into(),
            secret_key: "sk_test".into(),
            webhook_secret: "whsec_abc".into(),
            success_url: "http://localhost/grazie".into(),
            cancel_url: "http://localhost/carrello".into(),
        })
    }

    #[test]
    fn test_verify_webhook_secret() {
        let client = client();
        assert!(client.verify_webhook_secret("whsec_abc"));
        assert!(!client.verify_webhook_secret("whsec_abd"));
        assert!(!client.verify_webhook_secret("whsec_ab"));
        assert!(!client.verify_webhook_secret(""));
    }

    #[test]
    fn test_webhook_event_parses() {
        let event: WebhookEvent = serde_json::from_str(
            r#"{
                "type": "checkout.session.completed",
                "data": { "object": { "id": "cs_test_123" } }
            }"#,
        )
        .unwrap();

        assert_eq!(event.event_type, EVENT_SESSION_COMPLETED);
        assert_eq!(event.data.object.id, "cs_test_123");
    }

    #[test]
    fn test_line_item_omits_interval_when_one_time() {
        let json = serde_json::to_value(SessionLineItem {
            name: "Olio EVO 500ml".into(),
            unit_amount_cents: 1850,
            quantity: 2,
            interval: None,
        })
        .unwrap();

        assert!(json.get("interval").is_none());
    }
}
