use thiserror::Error;

/// Errors returned by the external product API client.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API has no product with this id. It answers either 404 or an empty
    /// 200 body.
    #[error("product {0} not found")]
    NotFound(i64),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid product API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
