use thiserror::Error;

/// Errors from building or creating a checkout session.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The provider rejected our credentials.
    #[error("payment provider authentication failed: {0}")]
    Authentication(String),

    /// The provider declined or could not process the card.
    #[error("card error: {0}")]
    Card(String),

    /// Any other provider-side failure.
    #[error("payment provider returned HTTP {status}: {message}")]
    Provider { status: u16, message: String },

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The cart cannot be turned into a session request.
    #[error("invalid checkout request: {0}")]
    InvalidRequest(String),
}
