//! Postgres backend. Snapshots and addresses are stored as JSONB; ordered
//! queries are served by the `(…, created_at DESC)` indexes, so this backend
//! never reports a missing index.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use storefront_core::{
    Address, NewOrder, NewReview, Order, OrderItem, OrderStatus, PaymentInfo, Product, Rating,
    Review, ReviewImage,
};
use uuid::Uuid;

use crate::store::{Datastore, QueryOrder};
use crate::StoreError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `products` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub title: String,
    pub price: Decimal,
    pub description: String,
    pub category: String,
    pub image: Option<String>,
    pub rating_rate: f64,
    pub rating_count: i32,
    pub is_active: bool,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            title: row.title,
            price: row.price,
            description: row.description,
            category: row.category,
            image: row.image,
            rating: Rating {
                rate: row.rating_rate,
                count: u32::try_from(row.rating_count).unwrap_or(0),
            },
            is_active: row.is_active,
        }
    }
}

/// A row from the `reviews` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: Uuid,
    pub product_id: i64,
    pub user_id: String,
    pub user_name: String,
    pub user_image: Option<String>,
    pub review_image: Option<Json<ReviewImage>>,
    /// `CHECK (rating BETWEEN 1 AND 5)`.
    pub rating: i16,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Review {
            id: row.id.to_string(),
            product_id: row.product_id,
            user_id: row.user_id,
            user_name: row.user_name,
            user_image: row.user_image,
            review_image: row.review_image.map(|Json(image)| image),
            rating: u8::try_from(row.rating).unwrap_or(0),
            comment: row.comment,
            created_at: row.created_at,
        }
    }
}

/// A row from the `orders` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub user_id: String,
    pub user_name: String,
    pub items: Json<Vec<OrderItem>>,
    pub total_amount: Decimal,
    pub shipping_address: Json<Address>,
    pub billing_address: Json<Address>,
    pub payment_method: String,
    pub payment_info: Option<Json<PaymentInfo>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id.to_string(),
            user_id: row.user_id,
            user_name: row.user_name,
            items: row.items.0,
            total_amount: row.total_amount,
            shipping_address: row.shipping_address.0,
            billing_address: row.billing_address.0,
            payment_method: row.payment_method,
            payment_info: row.payment_info.map(|Json(info)| info),
            status: row.status.parse::<OrderStatus>()?,
            created_at: row.created_at,
            estimated_delivery: row.estimated_delivery,
        })
    }
}

const REVIEW_COLUMNS: &str =
    "id, product_id, user_id, user_name, user_image, review_image, rating, comment, created_at";

const ORDER_COLUMNS: &str = "id, user_id, user_name, items, total_amount, shipping_address, \
     billing_address, payment_method, payment_info, status, created_at, estimated_delivery";

const PRODUCT_COLUMNS: &str =
    "id, title, price, description, category, image, rating_rate, rating_count, is_active";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn order_by(order: QueryOrder) -> &'static str {
    match order {
        QueryOrder::NewestFirst => " ORDER BY created_at DESC",
        QueryOrder::Unordered => "",
    }
}

fn parse_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}

#[async_trait]
impl Datastore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        crate::ping(&self.pool).await?;
        Ok(())
    }

    async fn insert_review(&self, review: &NewReview) -> Result<Review, StoreError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "INSERT INTO reviews \
                 (id, product_id, user_id, user_name, user_image, review_image, rating, comment) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(review.product_id)
        .bind(&review.user_id)
        .bind(&review.user_name)
        .bind(&review.user_image)
        .bind(review.review_image.as_ref().map(Json))
        .bind(i16::from(review.rating))
        .bind(&review.comment)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn query_reviews(
        &self,
        product_id: Option<i64>,
        order: QueryOrder,
    ) -> Result<Vec<Review>, StoreError> {
        let rows = match product_id {
            Some(product_id) => {
                sqlx::query_as::<_, ReviewRow>(&format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews WHERE product_id = $1{}",
                    order_by(order)
                ))
                .bind(product_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ReviewRow>(&format!(
                    "SELECT {REVIEW_COLUMNS} FROM reviews{}",
                    order_by(order)
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn delete_review(&self, id: &str) -> Result<(), StoreError> {
        let id = parse_id(id).ok_or(StoreError::NotFound)?;
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders \
                 (id, user_id, user_name, items, total_amount, shipping_address, \
                  billing_address, payment_method, payment_info, status, estimated_delivery) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&order.user_id)
        .bind(&order.user_name)
        .bind(Json(&order.items))
        .bind(order.total_amount)
        .bind(Json(&order.shipping_address))
        .bind(Json(&order.billing_address))
        .bind(&order.payment_method)
        .bind(order.payment_info.as_ref().map(Json))
        .bind(order.status.as_str())
        .bind(order.estimated_delivery)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn get_order(&self, id: &str) -> Result<Option<Order>, StoreError> {
        let Some(id) = parse_id(id) else {
            return Ok(None);
        };
        sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Order::try_from)
            .transpose()
    }

    async fn query_orders(
        &self,
        user_id: Option<&str>,
        order: QueryOrder,
    ) -> Result<Vec<Order>, StoreError> {
        let rows = match user_id {
            Some(user_id) => {
                sqlx::query_as::<_, OrderRow>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1{}",
                    order_by(order)
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, OrderRow>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders{}",
                    order_by(order)
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(Order::try_from).collect()
    }

    async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Order, StoreError> {
        let id = parse_id(id).ok_or(StoreError::NotFound)?;
        sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE orders SET status = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?
        .try_into()
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn upsert_product(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO products \
                 (id, title, price, description, category, image, rating_rate, rating_count, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (id) DO UPDATE SET \
                 title        = EXCLUDED.title, \
                 price        = EXCLUDED.price, \
                 description  = EXCLUDED.description, \
                 category     = EXCLUDED.category, \
                 image        = EXCLUDED.image, \
                 rating_rate  = EXCLUDED.rating_rate, \
                 rating_count = EXCLUDED.rating_count, \
                 is_active    = EXCLUDED.is_active, \
                 updated_at   = NOW()",
        )
        .bind(product.id)
        .bind(&product.title)
        .bind(product.price)
        .bind(&product.description)
        .bind(&product.category)
        .bind(&product.image)
        .bind(product.rating.rate)
        .bind(i32::try_from(product.rating.count).unwrap_or(i32::MAX))
        .bind(product.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
