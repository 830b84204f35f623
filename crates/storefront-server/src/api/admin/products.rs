use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use storefront_core::{merge_catalog, next_product_id, Product, Rating};

use crate::middleware::RequestId;

use super::super::catalog::{find_product, merged_catalog};
use super::super::{map_store_error, ApiError, ApiResponse, AppState};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct ProductInput {
    pub title: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl ProductInput {
    fn into_product(self, id: i64, existing: Option<&Product>) -> Product {
        Product {
            id,
            title: self.title.trim().to_string(),
            price: self.price,
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            image: self.image.filter(|url| !url.trim().is_empty()),
            rating: self
                .rating
                .or_else(|| existing.map(|p| p.rating))
                .unwrap_or_default(),
            is_active: self
                .is_active
                .or_else(|| existing.map(|p| p.is_active))
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct SetActiveRequest {
    pub is_active: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/products
pub(in crate::api) async fn list_all_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<Product>>> {
    Json(ApiResponse::new(req_id.0, merged_catalog(&state).await))
}

/// POST /api/v1/admin/products: allocates one past the highest id across
/// every product source.
pub(in crate::api) async fn create_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ProductInput>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    let rid = &req_id.0;

    // Both reads must succeed here; a partial view could hand out an id
    // that is already taken.
    let api = state.product_api.fetch_products().await.map_err(|e| {
        tracing::error!(error = %e, "product API fetch failed; cannot allocate product id");
        ApiError::new(rid, "internal_error", "product catalog unavailable")
    })?;
    let custom = state
        .store
        .list_products()
        .await
        .map_err(|e| map_store_error(rid.clone(), &e))?;

    let id = next_product_id(&merge_catalog(
        api,
        state.supplemental.as_ref().clone(),
        custom,
    ));
    let product = body.into_product(id, None);

    storefront_db::save_product(state.store.as_ref(), &product)
        .await
        .map_err(|e| map_store_error(rid.clone(), &e))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(req_id.0, product))))
}

/// PUT /api/v1/admin/products/{id}: stores the full record as a custom
/// product, overriding any API or supplemental entry with the same id.
pub(in crate::api) async fn update_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<ProductInput>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let existing = find_product(&state, id)
        .await
        .ok_or_else(|| ApiError::new(&req_id.0, "not_found", format!("product {id} not found")))?;
    let product = body.into_product(id, Some(&existing));

    storefront_db::save_product(state.store.as_ref(), &product)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, product)))
}

/// PATCH /api/v1/admin/products/{id}/active
pub(in crate::api) async fn set_product_active(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<SetActiveRequest>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let mut product = find_product(&state, id)
        .await
        .ok_or_else(|| ApiError::new(&req_id.0, "not_found", format!("product {id} not found")))?;
    product.is_active = body.is_active;

    storefront_db::save_product(state.store.as_ref(), &product)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, product)))
}
