//! Datastore doubles for unit tests.

use async_trait::async_trait;
use storefront_core::{NewOrder, NewReview, Order, OrderStatus, Product, Review};

use crate::store::{Datastore, QueryOrder};
use crate::StoreError;

/// Fails every call the way an unreachable backend would.
pub(crate) struct UnavailableStore;

fn unavailable() -> StoreError {
    StoreError::UnexpectedStatus {
        status: 503,
        message: "backend unavailable".to_string(),
    }
}

#[async_trait]
impl Datastore for UnavailableStore {
    fn backend(&self) -> &'static str {
        "unavailable"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn insert_review(&self, _review: &NewReview) -> Result<Review, StoreError> {
        Err(unavailable())
    }

    async fn query_reviews(
        &self,
        _product_id: Option<i64>,
        _order: QueryOrder,
    ) -> Result<Vec<Review>, StoreError> {
        Err(unavailable())
    }

    async fn delete_review(&self, _id: &str) -> Result<(), StoreError> {
        Err(unavailable())
    }

    async fn insert_order(&self, _order: &NewOrder) -> Result<Order, StoreError> {
        Err(unavailable())
    }

    async fn get_order(&self, _id: &str) -> Result<Option<Order>, StoreError> {
        Err(unavailable())
    }

    async fn query_orders(
        &self,
        _user_id: Option<&str>,
        _order: QueryOrder,
    ) -> Result<Vec<Order>, StoreError> {
        Err(unavailable())
    }

    async fn update_order_status(
        &self,
        _id: &str,
        _status: OrderStatus,
    ) -> Result<Order, StoreError> {
        Err(unavailable())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Err(unavailable())
    }

    async fn get_product(&self, _id: i64) -> Result<Option<Product>, StoreError> {
        Err(unavailable())
    }

    async fn upsert_product(&self, _product: &Product) -> Result<(), StoreError> {
        Err(unavailable())
    }
}
