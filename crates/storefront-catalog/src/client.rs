//! HTTP client for the external product API (`GET /products`,
//! `GET /products/{id}`).

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use storefront_core::Product;

use crate::error::CatalogError;

pub const DEFAULT_BASE_URL: &str = "https://fakestoreapi.com/";

/// Client for the external product API.
///
/// Use [`ProductApiClient::new`] for the production API or
/// [`ProductApiClient::with_base_url`] to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct ProductApiClient {
    client: Client,
    base_url: Url,
}

impl ProductApiClient {
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, CatalogError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout_secs, user_agent)
    }

    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CatalogError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // A trailing slash makes Url::join append to the base path instead of
        // replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| CatalogError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Fetches the full product list.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Http`] on network failure.
    /// - [`CatalogError::UnexpectedStatus`] on a non-2xx status.
    /// - [`CatalogError::Deserialize`] if the body is not a product array.
    pub async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        let url = self.endpoint("products")?;
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let products: Vec<Product> =
            serde_json::from_str(&body).map_err(|e| CatalogError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        tracing::debug!(count = products.len(), "fetched products from product API");
        Ok(products)
    }

    /// Fetches one product by id.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::NotFound`] on 404 or an empty/`null` body.
    /// - [`CatalogError::Http`] on network failure.
    /// - [`CatalogError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`CatalogError::Deserialize`] if the body is not a product.
    pub async fn fetch_product(&self, id: i64) -> Result<Product, CatalogError> {
        let url = self.endpoint(&format!("products/{id}"))?;
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id));
        }
        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Err(CatalogError::NotFound(id));
        }

        serde_json::from_str(trimmed).map_err(|e| CatalogError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogError> {
        self.base_url
            .join(path)
            .map_err(|e| CatalogError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
