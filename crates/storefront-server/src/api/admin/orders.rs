use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use storefront_core::{Order, OrderStatus};

use crate::middleware::RequestId;

use super::super::{map_store_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(in crate::api) struct UpdateStatusRequest {
    pub status: String,
}

/// GET /api/v1/admin/orders
pub(in crate::api) async fn list_orders(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<Order>>>, ApiError> {
    let orders = storefront_db::list_all_orders(state.store.as_ref())
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, orders)))
}

/// PATCH /api/v1/admin/orders/{id}/status: any known status may replace any
/// other; unknown status strings are rejected.
pub(in crate::api) async fn update_order_status(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    let status: OrderStatus = body
        .status
        .parse()
        .map_err(|e: storefront_core::CoreError| {
            ApiError::new(&req_id.0, "validation_error", e.to_string())
        })?;

    let order = storefront_db::update_order_status(state.store.as_ref(), &id, status)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, order)))
}
