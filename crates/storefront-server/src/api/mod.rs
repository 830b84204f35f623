mod admin;
mod cart;
mod catalog;
mod checkout;
mod orders;
mod products;
mod reviews;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use storefront_catalog::ProductApiClient;
use storefront_core::{AppConfig, Product};
use storefront_db::{Datastore, StoreError};
use storefront_payments::{CheckoutClient, SessionSettings};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{
    enforce_rate_limit, request_id, require_admin_auth, AuthState, RateLimitState, RequestId,
    USER_ID_HEADER, USER_IMAGE_HEADER, USER_NAME_HEADER,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Datastore>,
    pub product_api: ProductApiClient,
    pub supplemental: Arc<Vec<Product>>,
    /// `None` when no payment provider key is configured.
    pub checkout: Option<CheckoutClient>,
    pub session_settings: Arc<SessionSettings>,
    pub new_releases_count: usize,
    pub deals_count: usize,
}

impl AppState {
    /// Wires the outbound clients and catalog settings from config around an
    /// already-opened datastore.
    pub fn from_config(config: &AppConfig, store: Arc<dyn Datastore>) -> anyhow::Result<Self> {
        let product_api = ProductApiClient::with_base_url(
            &config.product_api_url,
            config.http_timeout_secs,
            &config.user_agent,
        )?;

        let supplemental = storefront_core::load_supplemental_products(
            config.supplemental_products_path.as_deref(),
        )?;

        let checkout = match config.stripe_secret_key.as_deref() {
            Some(key) => Some(CheckoutClient::with_base_url(
                key,
                &config.stripe_api_base,
                config.http_timeout_secs,
                &config.user_agent,
            )?),
            None => {
                tracing::warn!("STRIPE_SECRET_KEY not set; checkout sessions are disabled");
                None
            }
        };

        Ok(Self {
            store,
            product_api,
            supplemental: Arc::new(supplemental),
            checkout,
            session_settings: Arc::new(SessionSettings::from_app_config(config)),
            new_releases_count: config.new_releases_count,
            deals_count: config.deals_count,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    datastore: &'static str,
    backend: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" | "card_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_store_error(request_id: String, error: &StoreError) -> ApiError {
    match error {
        StoreError::NotFound => ApiError::new(request_id, "not_found", "record not found"),
        StoreError::Invalid(e) => ApiError::new(request_id, "validation_error", e.to_string()),
        _ => {
            tracing::error!(error = %error, "datastore request failed");
            ApiError::new(request_id, "internal_error", "datastore request failed")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(USER_NAME_HEADER),
            HeaderName::from_static(USER_IMAGE_HEADER),
        ])
}

fn storefront_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/products", get(products::list_products))
        .route("/api/v1/products/{id}", get(products::get_product))
        .route(
            "/api/v1/products/{id}/reviews",
            get(reviews::list_product_reviews).post(reviews::create_product_review),
        )
        .route("/api/v1/search", get(products::search_products))
        .route("/api/v1/cart/reduce", post(cart::reduce_cart))
        .route(
            "/api/v1/orders",
            get(orders::list_my_orders).post(orders::place_order),
        )
        .route("/api/v1/orders/{id}", get(orders::get_my_order))
        .route(
            "/api/v1/checkout/session",
            post(checkout::create_checkout_session),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

fn admin_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/admin/products",
            get(admin::list_all_products).post(admin::create_product),
        )
        .route(
            "/api/v1/admin/products/{id}",
            put(admin::update_product),
        )
        .route(
            "/api/v1/admin/products/{id}/active",
            patch(admin::set_product_active),
        )
        .route("/api/v1/admin/reviews", get(admin::list_reviews))
        .route("/api/v1/admin/reviews/{id}", delete(admin::delete_review))
        .route("/api/v1/admin/orders", get(admin::list_orders))
        .route(
            "/api/v1/admin/orders/{id}/status",
            patch(admin::update_order_status),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_admin_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(storefront_router(rate_limit.clone()))
        .merge(admin_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let backend = state.store.backend();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::new(
                req_id.0,
                HealthData {
                    status: "ok",
                    datastore: "ok",
                    backend,
                },
            )),
        ),
        Err(e) => {
            tracing::warn!(backend, error = %e, "health check: datastore unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::new(
                    req_id.0,
                    HealthData {
                        status: "degraded",
                        datastore: "unavailable",
                        backend,
                    },
                )),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
pub(crate) mod test_support;
