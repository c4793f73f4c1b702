//! Stripe Checkout client.
//!
//! Creates hosted checkout sessions through Stripe's form-encoded REST
//! API. The session carries one line item priced in cents, redirect URLs
//! derived from the caller's origin, and metadata tying it back to the
//! local transaction record.

use crate::config::StripeConfig;
use crate::models::Plan;
use anyhow::{anyhow, Result};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;

/// Checkout sessions expire 30 minutes after creation.
const SESSION_EXPIRY_SECS: i64 = 30 * 60;

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    config: StripeConfig,
    app_id: String,
}

/// The subset of a Checkout Session this service consumes.
#[derive(Debug, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted payment page the caller is redirected to.
    pub url: String,
}

/// Stripe API error response.
#[derive(Debug, Deserialize)]
pub struct StripeError {
    pub error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct StripeErrorDetail {
    #[serde(rename = "type")]
    pub error_type: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
}

impl StripeClient {
    pub fn new(config: StripeConfig, app_id: String) -> Self {
        Self {
            client: Client::new(),
            config,
            app_id,
        }
    }

    /// Check if Stripe is configured (secret key is set).
    pub fn is_configured(&self) -> bool {
        !self.config.secret_key.expose_secret().is_empty()
    }

    /// Create a hosted checkout session for a plan purchase.
    ///
    /// `origin` is the base URL the success/cancel redirects point at;
    /// `transaction_id` lands in the session metadata so the out-of-band
    /// confirmation flow can find the local record.
    pub async fn create_checkout_session(
        &self,
        plan: &Plan,
        transaction_id: &str,
        origin: &str,
    ) -> Result<CheckoutSession> {
        if !self.is_configured() {
            return Err(anyhow!("Stripe credentials not configured"));
        }

        let expires_at = chrono::Utc::now().timestamp() + SESSION_EXPIRY_SECS;
        let form = session_form(plan, transaction_id, origin, &self.app_id, expires_at);

        let url = format!("{}/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.secret_key.expose_secret())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!(status = %status, "Stripe checkout session response");

        if status.is_success() {
            let session: CheckoutSession = serde_json::from_str(&body)?;
            tracing::info!(
                session_id = %session.id,
                plan_id = %plan.id,
                "Stripe checkout session created"
            );
            Ok(session)
        } else {
            let error: StripeError = serde_json::from_str(&body).unwrap_or_else(|_| StripeError {
                error: StripeErrorDetail {
                    error_type: None,
                    code: None,
                    message: Some(body.clone()),
                },
            });
            let message = error
                .error
                .message
                .unwrap_or_else(|| "unknown Stripe error".to_string());
            tracing::error!(
                code = ?error.error.code,
                message = %message,
                "Stripe checkout session creation failed"
            );
            Err(anyhow!("Stripe error: {}", message))
        }
    }
}

/// Build the form-encoded Checkout Session parameters.
///
/// The line item amount is the plan price converted to the smallest
/// currency unit (cents), quantity 1, one-time payment mode.
fn session_form(
    plan: &Plan,
    transaction_id: &str,
    origin: &str,
    app_id: &str,
    expires_at: i64,
) -> Vec<(String, String)> {
    let unit_amount = (plan.price * 100.0).round() as u64;
    vec![
        ("payment_method_types[0]".to_string(), "card".to_string()),
        (
            "line_items[0][price_data][currency]".to_string(),
            "usd".to_string(),
        ),
        (
            "line_items[0][price_data][unit_amount]".to_string(),
            unit_amount.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]".to_string(),
            plan.name.clone(),
        ),
        ("line_items[0][quantity]".to_string(), "1".to_string()),
        ("mode".to_string(), "payment".to_string()),
        ("success_url".to_string(), format!("{}/success", origin)),
        ("cancel_url".to_string(), format!("{}/cancel", origin)),
        (
            "metadata[transactionId]".to_string(),
            transaction_id.to_string(),
        ),
        ("metadata[appId]".to_string(), app_id.to_string()),
        ("expires_at".to_string(), expires_at.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::find_plan;
    use secrecy::Secret;

    fn test_config() -> StripeConfig {
        StripeConfig {
            secret_key: Secret::new("sk_test_123".to_string()),
            api_base_url: "https://api.stripe.com/v1".to_string(),
        }
    }

    fn form_value<'a>(form: &'a [(String, String)], key: &str) -> &'a str {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or_else(|| panic!("missing form key {}", key))
    }

    #[test]
    fn test_is_configured() {
        let client = StripeClient::new(test_config(), "sparkchat".to_string());
        assert!(client.is_configured());

        let empty = StripeConfig {
            secret_key: Secret::new("".to_string()),
            api_base_url: "".to_string(),
        };
        let client = StripeClient::new(empty, "sparkchat".to_string());
        assert!(!client.is_configured());
    }

    #[test]
    fn pro_plan_prices_in_cents_with_quantity_one() {
        let plan = find_plan("pro").unwrap();
        let form = session_form(plan, "tx-1", "https://app.example.com", "sparkchat", 1_000);

        assert_eq!(
            form_value(&form, "line_items[0][price_data][unit_amount]"),
            "2000"
        );
        assert_eq!(form_value(&form, "line_items[0][quantity]"), "1");
        assert_eq!(form_value(&form, "line_items[0][price_data][currency]"), "usd");
        assert_eq!(
            form_value(&form, "line_items[0][price_data][product_data][name]"),
            "Pro"
        );
        assert_eq!(form_value(&form, "mode"), "payment");
    }

    #[test]
    fn redirects_and_metadata_derive_from_inputs() {
        let plan = find_plan("basic").unwrap();
        let form = session_form(plan, "tx-42", "http://localhost:3000", "sparkchat", 99);

        assert_eq!(
            form_value(&form, "success_url"),
            "http://localhost:3000/success"
        );
        assert_eq!(
            form_value(&form, "cancel_url"),
            "http://localhost:3000/cancel"
        );
        assert_eq!(form_value(&form, "metadata[transactionId]"), "tx-42");
        assert_eq!(form_value(&form, "metadata[appId]"), "sparkchat");
        assert_eq!(form_value(&form, "expires_at"), "99");
    }

    #[test]
    fn session_expiry_is_thirty_minutes() {
        assert_eq!(SESSION_EXPIRY_SECS, 1800);
    }
}
