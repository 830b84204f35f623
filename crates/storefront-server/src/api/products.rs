use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use storefront_core::{active_only, CategoryFilter, Product, RatingSummary, Review};

use crate::middleware::RequestId;

use super::catalog::{find_product, merged_catalog};
use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ProductListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ProductDetail {
    pub product: Product,
    pub reviews: Vec<Review>,
    pub rating_summary: RatingSummary,
}

/// GET /api/v1/products: active catalog, optionally filtered by `category`.
pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ProductListQuery>,
) -> Json<ApiResponse<Vec<Product>>> {
    let filter = CategoryFilter::parse(
        params.category.as_deref(),
        state.new_releases_count,
        state.deals_count,
    );
    let products = filter.apply(active_only(merged_catalog(&state).await));

    Json(ApiResponse::new(req_id.0, products))
}

/// GET /api/v1/search?q=: substring search over the active catalog.
pub(super) async fn search_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<SearchQuery>,
) -> Json<ApiResponse<Vec<Product>>> {
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return Json(ApiResponse::new(req_id.0, Vec::new()));
    }

    let catalog = active_only(merged_catalog(&state).await);
    let results = storefront_core::search_products(&catalog, &query);

    Json(ApiResponse::new(req_id.0, results))
}

/// GET /api/v1/products/{id}: product with its reviews and rating summary.
pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ProductDetail>>, ApiError> {
    let product = find_product(&state, id)
        .await
        .filter(|p| p.is_active)
        .ok_or_else(|| ApiError::new(&req_id.0, "not_found", format!("product {id} not found")))?;

    let reviews = storefront_db::list_reviews_for_display(state.store.as_ref(), id).await;
    let rating_summary = RatingSummary::from_reviews(&reviews);

    Ok(Json(ApiResponse::new(
        req_id.0,
        ProductDetail {
            product,
            reviews,
            rating_summary,
        },
    )))
}
