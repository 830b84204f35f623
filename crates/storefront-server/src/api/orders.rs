use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use storefront_core::{Address, CartLine, NewOrder, Order, PaymentInfo};

use crate::middleware::{CurrentUser, RequestId};

use super::{map_store_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PlaceOrderRequest {
    pub items: Vec<CartLine>,
    pub shipping_address: Address,
    #[serde(default)]
    pub billing_address: Option<Address>,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
    #[serde(default)]
    pub payment_info: Option<PaymentInfo>,
}

fn default_payment_method() -> String {
    "card".to_string()
}

/// POST /api/v1/orders: snapshot the posted cart lines into a pending order.
pub(super) async fn place_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    user: CurrentUser,
    Json(body): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), ApiError> {
    let order = NewOrder::from_cart(
        &user.id,
        &user.name,
        &body.items,
        body.shipping_address,
        body.billing_address,
        &body.payment_method,
        body.payment_info,
        Utc::now(),
    )
    .map_err(|e| ApiError::new(&req_id.0, "validation_error", e.to_string()))?;

    let saved = storefront_db::create_order(state.store.as_ref(), order)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(req_id.0, saved))))
}

/// GET /api/v1/orders: the caller's orders, newest first.
pub(super) async fn list_my_orders(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    user: CurrentUser,
) -> Result<Json<ApiResponse<Vec<Order>>>, ApiError> {
    let orders = storefront_db::list_orders_by_user(state.store.as_ref(), &user.id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(req_id.0, orders)))
}

/// GET /api/v1/orders/{id}: 404 unless the order belongs to the caller.
pub(super) async fn get_my_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    let order = storefront_db::get_order(state.store.as_ref(), &id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?
        .filter(|o| o.user_id == user.id)
        .ok_or_else(|| ApiError::new(&req_id.0, "not_found", format!("order {id} not found")))?;

    Ok(Json(ApiResponse::new(req_id.0, order)))
}
