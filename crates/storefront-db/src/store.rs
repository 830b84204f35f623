//! The datastore seam shared by every backend.

use std::future::Future;

use async_trait::async_trait;
use storefront_core::{NewOrder, NewReview, Order, OrderStatus, Product, Review};

use crate::StoreError;

/// Requested ordering for collection queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOrder {
    /// Sorted by `createdAt` descending on the server. May fail with
    /// [`StoreError::MissingIndex`] on backends that need an index for it.
    NewestFirst,
    /// Backend order. Never needs an index.
    Unordered,
}

/// Record-level operations against the products, reviews and orders
/// collections. Each call is an independent request; nothing is grouped
/// into a transaction.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Short backend name for logs and the health endpoint.
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), StoreError>;

    /// Persists a review and returns it with its assigned id and timestamp.
    async fn insert_review(&self, review: &NewReview) -> Result<Review, StoreError>;

    /// Reviews for one product, or every review when `product_id` is `None`.
    async fn query_reviews(
        &self,
        product_id: Option<i64>,
        order: QueryOrder,
    ) -> Result<Vec<Review>, StoreError>;

    async fn delete_review(&self, id: &str) -> Result<(), StoreError>;

    async fn insert_order(&self, order: &NewOrder) -> Result<Order, StoreError>;

    async fn get_order(&self, id: &str) -> Result<Option<Order>, StoreError>;

    /// Orders for one user, or every order when `user_id` is `None`.
    async fn query_orders(
        &self,
        user_id: Option<&str>,
        order: QueryOrder,
    ) -> Result<Vec<Order>, StoreError>;

    async fn update_order_status(&self, id: &str, status: OrderStatus)
        -> Result<Order, StoreError>;

    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    async fn get_product(&self, id: i64) -> Result<Option<Product>, StoreError>;

    /// Writes the full product record, replacing any record with the same id.
    async fn upsert_product(&self, product: &Product) -> Result<(), StoreError>;
}

/// Runs a newest-first query, retrying unordered with an in-memory sort when
/// the backend reports a missing index. Other errors propagate unchanged.
pub(crate) async fn newest_first_with_fallback<T, F, Fut>(
    collection: &'static str,
    query: F,
    sort: fn(&mut [T]),
) -> Result<Vec<T>, StoreError>
where
    F: Fn(QueryOrder) -> Fut,
    Fut: Future<Output = Result<Vec<T>, StoreError>>,
{
    match query(QueryOrder::NewestFirst).await {
        Err(StoreError::MissingIndex(message)) => {
            tracing::warn!(
                collection,
                error = %message,
                "sorted query needs a missing index; falling back to in-memory sort"
            );
            let mut records = query(QueryOrder::Unordered).await?;
            sort(&mut records);
            Ok(records)
        }
        other => other,
    }
}
