//! Router test harness: an in-memory datastore, a mocked product API and an
//! optional mocked payment provider.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use rust_decimal::Decimal;
use storefront_catalog::ProductApiClient;
use storefront_core::{NewOrder, NewReview, Order, OrderStatus, Product, Rating, Review};
use storefront_db::{Datastore, MemoryStore, QueryOrder, StoreError};
use storefront_payments::{CheckoutClient, SessionSettings};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{build_app, default_rate_limit_state, AppState};
use crate::middleware::{AuthState, RateLimitState};

pub(crate) const ADMIN_KEY: &str = "admin-test-key";

pub(crate) struct TestApp {
    pub state: AppState,
    pub product_api: MockServer,
    auth: AuthState,
}

impl TestApp {
    /// Memory store, product API serving [`api_products`], admin auth off.
    pub async fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new())).await
    }

    pub async fn with_unavailable_store() -> Self {
        Self::with_store(Arc::new(DownStore)).await
    }

    pub async fn with_store(store: Arc<dyn Datastore>) -> Self {
        let product_api = MockServer::start().await;
        mount_product_api(&product_api).await;

        let state = AppState {
            store,
            product_api: ProductApiClient::with_base_url(&product_api.uri(), 5, "storefront-test")
                .expect("product api client"),
            supplemental: Arc::new(vec![product(101, "Pixel Phone", "Mobiles", 49900)]),
            checkout: None,
            session_settings: Arc::new(SessionSettings {
                public_url: "https://shop.example.com".to_string(),
                currency: "usd".to_string(),
                shipping_countries: vec!["US".to_string()],
            }),
            new_releases_count: 2,
            deals_count: 1,
        };

        Self {
            state,
            product_api,
            auth: AuthState::from_keys(&[], "salt", true).expect("dev auth"),
        }
    }

    /// Requires `Bearer ADMIN_KEY` on admin routes.
    #[must_use]
    pub fn with_admin_auth(mut self) -> Self {
        self.auth =
            AuthState::from_keys(&[ADMIN_KEY.to_string()], "salt", false).expect("auth");
        self
    }

    #[must_use]
    pub fn with_checkout(mut self, base_url: &str) -> Self {
        self.state.checkout = Some(
            CheckoutClient::with_base_url("sk_test_123", base_url, 5, "storefront-test")
                .expect("checkout client"),
        );
        self
    }

    pub fn router(&self) -> Router {
        self.router_with_rate_limit(default_rate_limit_state())
    }

    pub fn router_with_rate_limit(&self, rate_limit: RateLimitState) -> Router {
        build_app(self.state.clone(), self.auth.clone(), rate_limit)
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router().oneshot(request).await.expect("response")
    }
}

pub(crate) fn product(id: i64, title: &str, category: &str, price_cents: i64) -> Product {
    Product {
        id,
        title: title.to_string(),
        price: Decimal::new(price_cents, 2),
        description: format!("{title} description"),
        category: category.to_string(),
        image: Some(format!("https://img.example.com/{id}.jpg")),
        rating: Rating { rate: 4.0, count: 10 },
        is_active: true,
    }
}

/// What the mocked product API serves, in order.
pub(crate) fn api_products() -> Vec<Product> {
    vec![
        product(1, "Fjallraven Backpack", "men's clothing", 10995),
        product(2, "Slim Fit T-Shirt", "men's clothing", 2230),
        product(9, "WD 2TB Portable Drive", "electronics", 6400),
    ]
}

async fn mount_product_api(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(api_products()))
        .mount(server)
        .await;

    for p in api_products() {
        Mock::given(method("GET"))
            .and(path(format!("/products/{}", p.id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(&p))
            .mount(server)
            .await;
    }
}

pub(crate) fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub(crate) fn json_request(method: Method, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

/// Adds the gateway identity headers for `user_id`.
pub(crate) fn as_user(mut request: Request<Body>, user_id: &str) -> Request<Body> {
    let headers = request.headers_mut();
    headers.insert("x-user-id", user_id.parse().expect("header"));
    headers.insert("x-user-name", "Test Shopper".parse().expect("header"));
    request
}

pub(crate) fn as_admin(mut request: Request<Body>) -> Request<Body> {
    request.headers_mut().insert(
        "authorization",
        format!("Bearer {ADMIN_KEY}").parse().expect("header"),
    );
    request
}

pub(crate) async fn json_body(response: Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

/// A datastore whose every call fails the way an unreachable backend does.
struct DownStore;

fn unavailable() -> StoreError {
    StoreError::UnexpectedStatus {
        status: 503,
        message: "datastore unavailable".to_string(),
    }
}

#[async_trait]
impl Datastore for DownStore {
    fn backend(&self) -> &'static str {
        "down"
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
