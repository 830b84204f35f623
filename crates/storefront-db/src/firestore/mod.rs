//! Firestore REST backend.
//!
//! Documents live under `projects/{project}/databases/(default)/documents` in
//! the `products`, `reviews` and `orders` collections. Creates go through
//! `:commit` so `createdAt` is stamped by the server; reads use
//! `:runQuery` structured queries.

pub mod value;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};
use storefront_core::{NewOrder, NewReview, Order, OrderStatus, Product, Review};
use uuid::Uuid;

use crate::store::{Datastore, QueryOrder};
use crate::StoreError;

use self::value::{decode_document, encode_fields, to_firestore};

const PRODUCTS: &str = "products";
const REVIEWS: &str = "reviews";
const ORDERS: &str = "orders";

#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub project_id: String,
    pub base_url: String,
    pub access_token: Option<String>,
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct FirestoreStore {
    client: Client,
    base_url: String,
    database: String,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: RpcStatus,
}

#[derive(Debug, Deserialize)]
struct RpcStatus {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitResponse {
    #[serde(default)]
    write_results: Vec<WriteResult>,
    #[serde(default)]
    commit_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WriteResult {
    #[serde(default)]
    transform_results: Vec<Value>,
}

impl FirestoreStore {
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the HTTP client cannot be built.
    pub fn new(config: FirestoreConfig) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            database: format!("projects/{}/databases/(default)", config.project_id),
            access_token: config.access_token,
        })
    }

    fn documents_root(&self) -> String {
        format!("{}/documents", self.database)
    }

    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{collection}/{id}", self.documents_root())
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/v1/{resource}", self.base_url)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, StoreError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_error(status.as_u16(), &body));
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|source| StoreError::Deserialize {
            context: "firestore response".to_string(),
            source,
        })
    }

    /// Creates a document and returns the server-assigned `createdAt`.
    async fn create_document(
        &self,
        collection: &str,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<DateTime<Utc>, StoreError> {
        let body = json!({
            "writes": [{
                "update": { "name": self.document_name(collection, id), "fields": fields },
                "currentDocument": { "exists": false },
                "updateTransforms": [{
                    "fieldPath": "createdAt",
                    "setToServerValue": "REQUEST_TIME"
                }]
            }]
        });

        let url = self.url(&format!("{}:commit", self.documents_root()));
        let raw = self.send(self.request(Method::POST, &url).json(&body)).await?;
        let response: CommitResponse = decode("commit response", raw)?;

        let stamped = response
            .write_results
            .first()
            .and_then(|w| w.transform_results.first())
            .and_then(|v| v.get("timestampValue"))
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc));

        Ok(stamped.or(response.commit_time).unwrap_or_else(Utc::now))
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        if !is_document_id(id) {
            return Ok(None);
        }
        let url = self.url(&self.document_name(collection, id));
        match self.send(self.request(Method::GET, &url)).await {
            Ok(document) => Ok(Some(decode_document(&document))),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn run_query(&self, query: Value) -> Result<Vec<Value>, StoreError> {
        let url = self.url(&format!("{}:runQuery", self.documents_root()));
        let raw = self.send(self.request(Method::POST, &url).json(&query)).await?;

        let Value::Array(entries) = raw else {
            return Ok(Vec::new());
        };

        let mut documents = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.get("error").is_some() {
                return Err(classify_error(200, &entry.to_string()));
            }
            if let Some(document) = entry.get("document") {
                documents.push(decode_document(document));
            }
        }
        tracing::debug!(count = documents.len(), "firestore query returned documents");
        Ok(documents)
    }
}

#[async_trait]
impl Datastore for FirestoreStore {
    fn backend(&self) -> &'static str {
        "firestore"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let url = self.url(&format!("{}/{PRODUCTS}", self.documents_root()));
        self.send(self.request(Method::GET, &url).query(&[("pageSize", "1")]))
            .await?;
        Ok(())
    }

    async fn insert_review(&self, review: &NewReview) -> Result<Review, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let created_at = self
            .create_document(REVIEWS, &id, to_fields("review", review)?)
            .await?;
        Ok(review.clone().into_review(id, created_at))
    }

    async fn query_reviews(
        &self,
        product_id: Option<i64>,
        order: QueryOrder,
    ) -> Result<Vec<Review>, StoreError> {
        let filter = product_id.map(|id| ("productId", Value::from(id)));
        let documents = self
            .run_query(structured_query(REVIEWS, filter, order))
            .await?;
        Ok(decode_all(REVIEWS, documents))
    }

    async fn delete_review(&self, id: &str) -> Result<(), StoreError> {
        if !is_document_id(id) {
            return Err(StoreError::NotFound);
        }
        let url = self.url(&self.document_name(REVIEWS, id));
        self.send(
            self.request(Method::DELETE, &url)
                .query(&[("currentDocument.exists", "true")]),
        )
        .await?;
        Ok(())
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<Order, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let created_at = self
            .create_document(ORDERS, &id, to_fields("order", order)?)
            .await?;
        Ok(order.clone().into_order(id, created_at))
    }

    async fn get_order(&self, id: &str) -> Result<Option<Order>, StoreError> {
        self.get_document(ORDERS, id)
            .await?
            .map(|doc| decode("order", doc))
            .transpose()
    }

    async fn query_orders(
        &self,
        user_id: Option<&str>,
        order: QueryOrder,
    ) -> Result<Vec<Order>, StoreError> {
        let filter = user_id.map(|id| ("userId", Value::from(id)));
        let documents = self.run_query(structured_query(ORDERS, filter, order)).await?;
        Ok(decode_all(ORDERS, documents))
    }

    async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
    ) -> Result<Order, StoreError> {
        if !is_document_id(id) {
            return Err(StoreError::NotFound);
        }
        let url = self.url(&self.document_name(ORDERS, id));
        let body = json!({ "fields": { "status": { "stringValue": status.as_str() } } });
        let document = self
            .send(
                self.request(Method::PATCH, &url)
                    .query(&[
                        ("updateMask.fieldPaths", "status"),
                        ("currentDocument.exists", "true"),
                    ])
                    .json(&body),
            )
            .await?;
        decode("order", decode_document(&document))
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let documents = self
            .run_query(structured_query(PRODUCTS, None, QueryOrder::Unordered))
            .await?;
        Ok(decode_all(PRODUCTS, documents))
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>, StoreError> {
        self.get_document(PRODUCTS, &id.to_string())
            .await?
            .map(|doc| decode("product", doc))
            .transpose()
    }

    async fn upsert_product(&self, product: &Product) -> Result<(), StoreError> {
        let url = self.url(&self.document_name(PRODUCTS, &product.id.to_string()));
        let body = json!({ "fields": to_fields("product", product)? });
        self.send(self.request(Method::PATCH, &url).json(&body))
            .await?;
        Ok(())
    }
}

fn structured_query(
    collection: &str,
    filter: Option<(&str, Value)>,
    order: QueryOrder,
) -> Value {
    let mut query = json!({ "from": [{ "collectionId": collection }] });
    if let Some((field, value)) = filter {
        query["where"] = json!({
            "fieldFilter": {
                "field": { "fieldPath": field },
                "op": "EQUAL",
                "value": to_firestore(&value)
            }
        });
    }
    if order == QueryOrder::NewestFirst {
        query["orderBy"] = json!([{
            "field": { "fieldPath": "createdAt" },
            "direction": "DESCENDING"
        }]);
    }
    json!({ "structuredQuery": query })
}

/// Maps a Firestore error body to a [`StoreError`]. A failed precondition that
/// mentions an index is the "query needs a composite index" case.
fn classify_error(http_status: u16, body: &str) -> StoreError {
    let rpc = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error)
        .ok()
        .or_else(|| {
            serde_json::from_str::<Vec<ErrorEnvelope>>(body)
                .ok()
                .and_then(|v| v.into_iter().next())
                .map(|e| e.error)
        });

    let (status, message) = match rpc {
        Some(rpc) => (rpc.status, rpc.message),
        None => (String::new(), body.to_string()),
    };

    if status == "FAILED_PRECONDITION" && message.to_lowercase().contains("index") {
        return StoreError::MissingIndex(message);
    }
    if http_status == 404 || status == "NOT_FOUND" {
        return StoreError::NotFound;
    }
    StoreError::UnexpectedStatus {
        status: http_status,
        message,
    }
}

fn is_document_id(id: &str) -> bool {
    !id.is_empty() && !id.contains('/') && id != "." && id != ".."
}

fn to_fields<T: Serialize>(context: &str, record: &T) -> Result<Map<String, Value>, StoreError> {
    let value = serde_json::to_value(record).map_err(|source| StoreError::Deserialize {
        context: context.to_string(),
        source,
    })?;
    Ok(match value {
        Value::Object(map) => encode_fields(&map),
        _ => Map::new(),
    })
}

fn decode<T: DeserializeOwned>(context: &str, value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|source| StoreError::Deserialize {
        context: context.to_string(),
        source,
    })
}

/// Decodes every document, skipping (and logging) records that no longer
/// match the current shape.
fn decode_all<T: DeserializeOwned>(collection: &'static str, documents: Vec<Value>) -> Vec<T> {
    documents
        .into_iter()
        .filter_map(|doc| {
            let id = doc.get("id").map(ToString::to_string).unwrap_or_default();
            match serde_json::from_value(doc) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(
                        collection,
                        id = %id,
                        error = %e,
                        "skipping undecodable document"
                    );
                    None
                }
            }
        })
        .collect()
}
