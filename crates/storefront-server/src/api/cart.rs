use axum::{Extension, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_core::{reduce, CartAction, CartState};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse};

#[derive(Debug, Deserialize)]
pub(super) struct ReduceCartRequest {
    #[serde(default)]
    pub state: CartState,
    pub action: CartAction,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ReduceCartResponse {
    pub state: CartState,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    pub item_count: u64,
}

/// POST /api/v1/cart/reduce: applies one action to a client-held cart.
/// Nothing is stored server-side. Duplicate or zero-quantity lines in the
/// posted state are normalized before the action runs.
pub(super) async fn reduce_cart(
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ReduceCartRequest>,
) -> Result<Json<ApiResponse<ReduceCartResponse>>, ApiError> {
    let state = reduce(body.state, body.action);
    let subtotal = state.subtotal().ok_or_else(|| {
        ApiError::new(&req_id.0, "validation_error", "cart subtotal is out of range")
    })?;

    Ok(Json(ApiResponse::new(
        req_id.0,
        ReduceCartResponse {
            subtotal,
            item_count: state.item_count(),
            state,
        },
    )))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::api::test_support::{json_body, json_request, TestApp};

    fn line(id: i64, price: f64, quantity: u32) -> serde_json::Value {
        json!({ "id": id, "title": format!("Product {id}"), "price": price, "quantity": quantity })
    }

    #[tokio::test]
    async fn adding_same_product_twice_merges_lines() {
        let app = TestApp::new().await;
        let first = json_body(
            app.send(json_request(
                Method::POST,
                "/api/v1/cart/reduce",
                &json!({ "action": { "type": "addToCart", "payload": line(1, 10.0, 1) } }),
            ))
            .await,
        )
        .await;

        let response = app
            .send(json_request(
                Method::POST,
                "/api/v1/cart/reduce",
                &json!({
                    "state": first["data"]["state"],
                    "action": { "type": "addToCart", "payload": line(1, 10.0, 1) }
                }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["data"]["state"]["items"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["data"]["state"]["items"][0]["quantity"], 2);
        assert_eq!(json["data"]["itemCount"], 2);
        assert_eq!(json["data"]["subtotal"], 20.0);
    }

    #[tokio::test]
    async fn decrease_at_one_removes_line() {
        let app = TestApp::new().await;
        let response = app
            .send(json_request(
                Method::POST,
                "/api/v1/cart/reduce",
                &json!({
                    "state": { "items": [line(1, 10.0, 1), line(2, 5.0, 3)] },
                    "action": { "type": "decreaseQuantity", "payload": 1 }
                }),
            ))
            .await;

        let json = json_body(response).await;
        assert_eq!(json["data"]["state"]["items"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["data"]["subtotal"], 15.0);
    }

    #[tokio::test]
    async fn posted_state_is_normalized_before_reducing() {
        let app = TestApp::new().await;
        let response = app
            .send(json_request(
                Method::POST,
                "/api/v1/cart/reduce",
                &json!({
                    "state": { "items": [line(1, 10.0, 0), line(2, 5.0, 1), line(2, 5.0, 1)] },
                    "action": { "type": "increaseQuantity", "payload": 2 }
                }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["data"]["state"]["items"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["data"]["state"]["items"][0]["id"], 2);
        assert_eq!(json["data"]["state"]["items"][0]["quantity"], 3);
        assert_eq!(json["data"]["itemCount"], 3);
        assert_eq!(json["data"]["subtotal"], 15.0);
    }

    #[tokio::test]
    async fn overflowing_subtotal_is_validation_error() {
        let app = TestApp::new().await;
        let response = app
            .send(json_request(
                Method::POST,
                "/api/v1/cart/reduce",
                &json!({
                    "state": { "items": [line(1, 5e28, 1)] },
                    "action": { "type": "increaseQuantity", "payload": 1 }
                }),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn reset_cart_empties_items_but_keeps_favorites() {
        let app = TestApp::new().await;
        let response = app
            .send(json_request(
                Method::POST,
                "/api/v1/cart/reduce",
                &json!({
                    "state": {
                        "items": [line(1, 10.0, 2)],
                        "favorites": [{ "id": 7, "title": "Lamp", "price": 12.5 }]
                    },
                    "action": { "type": "resetCart" }
                }),
            ))
            .await;

        let json = json_body(response).await;
        assert_eq!(json["data"]["state"]["items"], json!([]));
        assert_eq!(json["data"]["state"]["favorites"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["data"]["itemCount"], 0);
    }
}
