//! Client for the external product API that supplies the base catalog.

pub mod client;
pub mod error;

pub use client::ProductApiClient;
pub use error::CatalogError;
