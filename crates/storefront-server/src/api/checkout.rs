use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use storefront_core::CartLine;
use storefront_payments::{build_session_request, CheckoutSession, PaymentError};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CheckoutSessionBody {
    #[serde(default)]
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
}

fn map_payment_error(request_id: &str, error: &PaymentError) -> ApiError {
    match error {
        PaymentError::InvalidRequest(message) => {
            ApiError::new(request_id, "bad_request", message.clone())
        }
        PaymentError::Authentication(_) => {
            tracing::error!(error = %error, "payment provider rejected credentials");
            ApiError::new(
                request_id,
                "payment_authentication_error",
                "Payment provider authentication failed. Check API keys.",
            )
        }
        PaymentError::Card(message) => ApiError::new(request_id, "card_error", message.clone()),
        _ => {
            tracing::error!(error = %error, "checkout session creation failed");
            ApiError::new(request_id, "payment_error", "Internal server error")
        }
    }
}

/// POST /api/v1/checkout/session: hosted checkout for the posted cart lines.
pub(super) async fn create_checkout_session(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CheckoutSessionBody>,
) -> Result<Json<ApiResponse<CheckoutSession>>, ApiError> {
    let rid = &req_id.0;

    if body.items.is_empty() {
        return Err(ApiError::new(rid, "bad_request", "Invalid items provided"));
    }

    let Some(client) = state.checkout.as_ref() else {
        tracing::error!("checkout requested but no payment provider key is configured");
        return Err(ApiError::new(
            rid,
            "payment_not_configured",
            "payment provider not configured",
        ));
    };

    let request = build_session_request(
        &body.items,
        body.email.as_deref(),
        body.order_id.as_deref(),
        &state.session_settings,
    )
    .map_err(|e| map_payment_error(rid, &e))?;

    let session = client
        .create_session(&request)
        .await
        .map_err(|e| map_payment_error(rid, &e))?;

    Ok(Json(ApiResponse::new(req_id.0, session)))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::api::test_support::{json_body, json_request, TestApp};

    fn cart() -> Value {
        json!({
            "items": [
                { "id": 1, "title": "Fjallraven Backpack", "price": 10.0, "quantity": 2 },
                { "id": 2, "title": "Slim Fit T-Shirt", "price": 5.0, "quantity": 3 }
            ],
            "email": "shopper@example.com"
        })
    }

    async fn provider_answering(status: u16, body: Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn returns_session_id_and_url() {
        let provider = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(body_string_contains("metadata%5Bemail%5D=shopper%40example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_1",
                "url": "https://checkout.stripe.com/c/pay/cs_test_1"
            })))
            .expect(1)
            .mount(&provider)
            .await;

        let app = TestApp::new().await.with_checkout(&provider.uri());
        let response = app
            .send(json_request(Method::POST, "/api/v1/checkout/session", &cart()))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["id"], "cs_test_1");
        assert_eq!(json["data"]["url"], "https://checkout.stripe.com/c/pay/cs_test_1");
    }

    #[tokio::test]
    async fn empty_items_are_rejected() {
        let app = TestApp::new().await;
        let response = app
            .send(json_request(
                Method::POST,
                "/api/v1/checkout/session",
                &json!({ "items": [] }),
            ))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["message"], "Invalid items provided");
    }

    #[tokio::test]
    async fn out_of_range_price_is_rejected_before_calling_provider() {
        let provider = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": "cs", "url": "u" })),
            )
            .expect(0)
            .mount(&provider)
            .await;

        let app = TestApp::new().await.with_checkout(&provider.uri());
        let body = json!({
            "items": [{ "id": 1, "title": "Yacht", "price": 7e28, "quantity": 1 }]
        });
        let response = app
            .send(json_request(Method::POST, "/api/v1/checkout/session", &body))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn missing_provider_key_is_internal_error() {
        let app = TestApp::new().await;
        let response = app
            .send(json_request(Method::POST, "/api/v1/checkout/session", &cart()))
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert_eq!(json["error"]["message"], "payment provider not configured");
    }

    #[tokio::test]
    async fn authentication_failure_has_key_check_message() {
        let provider = provider_answering(
            401,
            json!({ "error": { "type": "invalid_request_error", "message": "Invalid API Key" } }),
        )
        .await;
        let app = TestApp::new().await.with_checkout(&provider.uri());
        let response = app
            .send(json_request(Method::POST, "/api/v1/checkout/session", &cart()))
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert_eq!(
            json["error"]["message"],
            "Payment provider authentication failed. Check API keys."
        );
    }

    #[tokio::test]
    async fn card_error_is_bad_request_with_provider_message() {
        let provider = provider_answering(
            402,
            json!({ "error": { "type": "card_error", "message": "Your card was declined." } }),
        )
        .await;
        let app = TestApp::new().await.with_checkout(&provider.uri());
        let response = app
            .send(json_request(Method::POST, "/api/v1/checkout/session", &cart()))
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["error"]["code"], "card_error");
        assert_eq!(json["error"]["message"], "Your card was declined.");
    }

    #[tokio::test]
    async fn other_provider_failures_are_generic() {
        let provider = provider_answering(500, json!({ "error": { "type": "api_error" } })).await;
        let app = TestApp::new().await.with_checkout(&provider.uri());
        let response = app
            .send(json_request(Method::POST, "/api/v1/checkout/session", &cart()))
            .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert_eq!(json["error"]["message"], "Internal server error");
    }
}
