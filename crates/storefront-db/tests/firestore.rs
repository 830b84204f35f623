//! Integration tests for `FirestoreStore` using wiremock HTTP mocks.

use serde_json::{json, Value};
use storefront_core::{NewReview, OrderStatus, ReviewAuthor};
use storefront_db::firestore::value::encode_fields;
use storefront_db::{
    get_order, list_reviews_by_product, update_order_status, Datastore, FirestoreConfig,
    FirestoreStore, StoreError,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const DOCS: &str = "/v1/projects/demo/databases/(default)/documents";

fn test_store(base_url: &str) -> FirestoreStore {
    FirestoreStore::new(FirestoreConfig {
        project_id: "demo".to_string(),
        base_url: base_url.to_string(),
        access_token: Some("test-token".to_string()),
        timeout_secs: 5,
        user_agent: "storefront-test".to_string(),
    })
    .expect("store construction should not fail")
}

fn body_json(req: &Request) -> Value {
    serde_json::from_slice(&req.body).unwrap_or(Value::Null)
}

fn ordered_query(req: &Request) -> bool {
    body_json(req)["structuredQuery"].get("orderBy").is_some()
}

fn unordered_query(req: &Request) -> bool {
    !ordered_query(req)
}

fn review_document(id: &str, comment: &str, created_at: &str) -> Value {
    let fields = json!({
        "productId": 3,
        "userId": "u1",
        "userName": "Asha",
        "rating": 4,
        "comment": comment,
        "createdAt": created_at
    });
    let mut encoded = encode_fields(fields.as_object().unwrap());
    encoded.insert(
        "createdAt".to_string(),
        json!({ "timestampValue": created_at }),
    );
    json!({
        "document": {
            "name": format!("projects/demo/databases/(default)/documents/reviews/{id}"),
            "fields": encoded
        },
        "readTime": "2024-06-01T00:00:00Z"
    })
}

fn order_document(id: &str, status: &str) -> Value {
    let address = json!({
        "fullName": "Sam Lee",
        "streetAddress": "1 King St",
        "city": "Toronto",
        "state": "ON",
        "zipCode": "M5H",
        "country": "CA",
        "phoneNumber": ""
    });
    let fields = json!({
        "userId": "u1",
        "userName": "Sam",
        "items": [{ "id": 1, "title": "Desk Lamp", "price": 12.5, "quantity": 2 }],
        "totalAmount": 25.0,
        "shippingAddress": address,
        "billingAddress": address,
        "paymentMethod": "card",
        "paymentInfo": { "cardType": "Visa", "cardLastFour": "4242" },
        "status": status,
        "createdAt": "2024-05-02T09:30:00Z"
    });
    json!({
        "name": format!("projects/demo/databases/(default)/documents/orders/{id}"),
        "fields": encode_fields(fields.as_object().unwrap())
    })
}

#[tokio::test]
async fn insert_review_uses_server_timestamp_transform() {
    let server = MockServer::start().await;

    let commits_with_transform = |req: &Request| {
        let body = body_json(req);
        let write = &body["writes"][0];
        write["updateTransforms"][0]["setToServerValue"] == "REQUEST_TIME"
            && write["update"]["fields"]["rating"]["integerValue"] == "5"
            && write["update"]["fields"].get("createdAt").is_none()
    };

    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:commit")))
        .and(header("authorization", "Bearer test-token"))
        .and(commits_with_transform)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "writeResults": [{
                "updateTime": "2024-06-01T12:00:00.500Z",
                "transformResults": [{ "timestampValue": "2024-06-01T12:00:00.500Z" }]
            }],
            "commitTime": "2024-06-01T12:00:00.500Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = test_store(&server.uri());
    let review = NewReview::new(
        3,
        ReviewAuthor {
            user_id: "u1".to_string(),
            user_name: "Asha".to_string(),
            user_image: None,
        },
        5,
        "Great sound",
        None,
    );

    let saved = store.insert_review(&review).await.expect("commit succeeds");
    assert!(!saved.id.is_empty());
    assert_eq!(saved.created_at.to_rfc3339(), "2024-06-01T12:00:00.500+00:00");
    assert_eq!(saved.comment, "Great sound");
}

#[tokio::test]
async fn reviews_fall_back_to_unordered_query_when_index_missing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .and(ordered_query)
        .respond_with(ResponseTemplate::new(400).set_body_json(json!([{
            "error": {
                "code": 9,
                "message": "The query requires an index. You can create it here: https://console.firebase.google.com/",
                "status": "FAILED_PRECONDITION"
            }
        }])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .and(unordered_query)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            review_document("old", "older", "2024-05-01T10:00:00Z"),
            review_document("new", "newer", "2024-05-03T10:00:00Z"),
            review_document("mid", "middle", "2024-05-02T10:00:00Z")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let store = test_store(&server.uri());
    let reviews = list_reviews_by_product(&store, 3).await.expect("fallback succeeds");

    let ids: Vec<&str> = reviews.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["new", "mid", "old"]);
    assert!(reviews.iter().all(|r| r.product_id == 3));
}

#[tokio::test]
async fn non_index_query_errors_propagate() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "code": 500, "message": "internal", "status": "INTERNAL" }
        })))
        .mount(&server)
        .await;

    let store = test_store(&server.uri());
    let err = list_reviews_by_product(&store, 3).await.unwrap_err();
    assert!(
        matches!(err, StoreError::UnexpectedStatus { status: 500, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn empty_query_result_is_empty_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{DOCS}:runQuery")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "readTime": "2024-06-01T00:00:00Z" }])),
        )
        .mount(&server)
        .await;

    let store = test_store(&server.uri());
    assert!(list_reviews_by_product(&store, 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_order_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/orders/abc")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "Document not found", "status": "NOT_FOUND" }
        })))
        .mount(&server)
        .await;

    let store = test_store(&server.uri());
    assert!(get_order(&store, "abc").await.unwrap().is_none());
}

#[tokio::test]
async fn get_order_decodes_typed_values() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{DOCS}/orders/o1")))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_document("o1", "pending")))
        .mount(&server)
        .await;

    let store = test_store(&server.uri());
    let order = get_order(&store, "o1").await.unwrap().expect("order exists");
    assert_eq!(order.id, "o1");
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.items[0].quantity, 2);
    assert_eq!(order.shipping_address.city, "Toronto");
    assert_eq!(
        order.payment_info.as_ref().map(|p| p.last_four.as_str()),
        Some("4242")
    );
}

#[tokio::test]
async fn update_status_patches_only_status() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path(format!("{DOCS}/orders/o1")))
        .and(query_param("updateMask.fieldPaths", "status"))
        .and(query_param("currentDocument.exists", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_document("o1", "shipped")))
        .expect(1)
        .mount(&server)
        .await;

    let store = test_store(&server.uri());
    let order = update_order_status(&store, "o1", OrderStatus::Shipped)
        .await
        .expect("patch succeeds");
    assert_eq!(order.status, OrderStatus::Shipped);
}
