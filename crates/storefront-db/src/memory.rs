//! Process-local datastore for development and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use storefront_core::{
    orders::sort_orders_newest_first, sort_newest_first, NewOrder, NewReview, Order, OrderStatus,
    Product, Review,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{Datastore, QueryOrder};
use crate::StoreError;

#[derive(Debug, Default)]
struct Collections {
    products: BTreeMap<i64, Product>,
    reviews: Vec<Review>,
    orders: Vec<Order>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
    sort_index_missing: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose newest-first queries fail with
    /// [`StoreError::MissingIndex`], the way a document store does before its
    /// composite index is built.
    #[must_use]
    pub fn without_sort_index() -> Self {
        Self {
            inner: RwLock::default(),
            sort_index_missing: true,
        }
    }

    fn check_index(&self, order: QueryOrder) -> Result<(), StoreError> {
        if self.sort_index_missing && order == QueryOrder::NewestFirst {
            return Err(StoreError::MissingIndex(
                "createdAt descending index has not been built".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert_review(&self, review: &NewReview) -> Result<Review, StoreError> {
        let review = review
            .clone()
            .into_review(Uuid::new_v4().to_string(), Utc::now());
        self.inner.write().await.reviews.push(review.clone());
        Ok(review)
    }

    async fn query_reviews(
        &self,
        product_id: Option<i64>,
        order: QueryOrder,
    ) -> Result<Vec<Review>, StoreError> {
        self.check_index(order)?;
        let mut reviews: Vec<Review> = self
            .inner
            .read()
            .await
            .reviews
            .iter()
            .filter(|r| product_id.map_or(true, |id| r.product_id == id))
            .cloned()
            .collect();
        if order == QueryOrder::NewestFirst {
            sort_newest_first(&mut reviews);
        }
        Ok(reviews)
    }

    async fn delete_review(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.reviews.len();
        inner.reviews.retain(|r| r.id != id);
        if inner.reviews.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
        let order = order
            .clone()
            .into_order(Uuid::new_v4().to_string(), Utc::now());
        self.inner.write().await.orders.push(order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .orders
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    async fn query_orders(
        &self,
        user_id: Option<&str>,
        order: QueryOrder,
    ) -> Result<Vec<Order>, StoreError> {
        self.check_index(order)?;
        let mut orders: Vec<Order> = self
            .inner
            .read()
            .await
            .orders
            .iter()
            .filter(|o| user_id.map_or(true, |id| o.user_id == id))
            .cloned()
            .collect();
        if order == QueryOrder::NewestFirst {
            sort_orders_newest_first(&mut orders);
        }
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Order, StoreError> {
        let mut inner = self.inner.write().await;
        let order = inner
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(StoreError::NotFound)?;
        order.status = status;
        Ok(order.clone())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.inner.read().await.products.values().cloned().collect())
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>, StoreError> {
        Ok(self.inner.read().await.products.get(&id).cloned())
    }

    async fn upsert_product(&self, product: &Product) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .products
            .insert(product.id, product.clone());
        Ok(())
    }
}
