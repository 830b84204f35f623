use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use storefront_core::{RatingSummary, Review};

use crate::middleware::RequestId;

use super::super::{map_store_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(in crate::api) struct ReviewDashboard {
    pub reviews: Vec<Review>,
    pub summary: RatingSummary,
}

/// GET /api/v1/admin/reviews
pub(in crate::api) async fn list_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<ReviewDashboard>>, ApiError> {
    let reviews = storefront_db::list_all_reviews(state.store.as_ref())
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    let summary = RatingSummary::from_reviews(&reviews);

    Ok(Json(ApiResponse::new(
        req_id.0,
        ReviewDashboard { reviews, summary },
    )))
}

/// DELETE /api/v1/admin/reviews/{id}
pub(in crate::api) async fn delete_review(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    storefront_db::delete_review(state.store.as_ref(), &id)
        .await
        .map_err(|e| map_store_error(req_id.0, &e))?;

    Ok(StatusCode::NO_CONTENT)
}
