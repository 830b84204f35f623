pub mod app_config;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod orders;
pub mod products;
pub mod reviews;

pub use app_config::{AppConfig, DatastoreKind, Environment};
pub use cart::{reduce, CartAction, CartLine, CartState};
pub use catalog::{active_only, merge_catalog, next_product_id, search_products, CategoryFilter};
pub use config::{load_app_config, load_app_config_from_env};
pub use orders::{
    sort_orders_newest_first, Address, CardBrand, NewOrder, Order, OrderItem, OrderStatus,
    PaymentInfo, ESTIMATED_DELIVERY_DAYS,
};
pub use products::{
    bundled_supplemental_products, load_supplemental_products, Product, Rating,
};
pub use reviews::{sort_newest_first, NewReview, RatingSummary, Review, ReviewAuthor, ReviewImage};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read supplemental products file {path}: {source}")]
    SupplementalFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse supplemental products: {0}")]
    SupplementalFileParse(#[from] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}

/// Validation failures for records submitted by users or admins.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("{field} is too long (max {max} characters)")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("price must not be negative")]
    NegativePrice,

    #[error("order must contain at least one item")]
    EmptyOrder,

    #[error("card last four must be exactly four digits")]
    InvalidCardLastFour,

    #[error("unknown order status: {0}")]
    UnknownOrderStatus(String),

    #[error("order total is out of range")]
    TotalOutOfRange,
}
