use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use storefront_core::{NewReview, Review, ReviewAuthor, ReviewImage};

use crate::middleware::{CurrentUser, RequestId};

use super::{map_store_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateReviewRequest {
    pub rating: u8,
    pub comment: String,
    #[serde(default)]
    pub review_image: Option<ReviewImage>,
}

/// GET /api/v1/products/{id}/reviews: newest first.
pub(super) async fn list_product_reviews(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(product_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<Review>>>, ApiError> {
    let reviews = storefront_db::list_reviews_by_product(state.store.as_ref(), product_id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, reviews)))
}

/// POST /api/v1/products/{id}/reviews: signed-in shoppers only.
pub(super) async fn create_product_review(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    user: CurrentUser,
    Path(product_id): Path<i64>,
    Json(body): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Review>>), ApiError> {
    let author = ReviewAuthor {
        user_id: user.id,
        user_name: user.name,
        user_image: user.image,
    };
    let review = NewReview::new(
        product_id,
        author,
        body.rating,
        body.comment,
        body.review_image,
    );

    let saved = storefront_db::create_review(state.store.as_ref(), review)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(req_id.0, saved))))
}
