//! HTTP client for the payment provider's checkout-session endpoint.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::PaymentError;
use crate::session::CheckoutSessionRequest;

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// The provider's answer to a session request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted checkout page the shopper is redirected to.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorEnvelope {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default, rename = "type")]
    kind: String,
    #[serde(default)]
    message: String,
}

#[derive(Clone)]
pub struct CheckoutClient {
    client: Client,
    secret_key: String,
    base_url: String,
}

impl std::fmt::Debug for CheckoutClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutClient")
            .field("secret_key", &"[redacted]")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl CheckoutClient {
    /// # Errors
    ///
    /// Returns [`PaymentError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        secret_key: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, PaymentError> {
        Self::with_base_url(secret_key, DEFAULT_API_BASE, timeout_secs, user_agent)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        secret_key: &str,
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, PaymentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            secret_key: secret_key.to_owned(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a hosted checkout session.
    ///
    /// # Errors
    ///
    /// - [`PaymentError::Authentication`] on HTTP 401 or an `authentication_error`.
    /// - [`PaymentError::Card`] on a `card_error`.
    /// - [`PaymentError::Provider`] on any other non-2xx response.
    /// - [`PaymentError::Http`] on network failure.
    /// - [`PaymentError::Deserialize`] if the success body is not a session.
    pub async fn create_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret_key)
            .form(&request.to_form())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = classify_error(status, &body);
            tracing::error!(
                status = status.as_u16(),
                error = %err,
                "checkout session creation failed"
            );
            return Err(err);
        }

        let session: CheckoutSession =
            serde_json::from_str(&body).map_err(|e| PaymentError::Deserialize {
                context: url,
                source: e,
            })?;
        tracing::info!(session_id = %session.id, "checkout session created");
        Ok(session)
    }
}

fn classify_error(status: StatusCode, body: &str) -> PaymentError {
    let (kind, message) = match serde_json::from_str::<ProviderErrorEnvelope>(body) {
        Ok(envelope) => (envelope.error.kind, envelope.error.message),
        Err(_) => (String::new(), body.to_string()),
    };

    if status == StatusCode::UNAUTHORIZED || kind == "authentication_error" {
        return PaymentError::Authentication(message);
    }
    if kind == "card_error" {
        return PaymentError::Card(message);
    }
    PaymentError::Provider {
        status: status.as_u16(),
        message,
    }
}
