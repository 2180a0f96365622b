#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use store_api::{
    config::AppConfig,
    db,
    models::{OrderStatus, ProductOrder},
    repositories::{EntityRepository, ProductOrderRepository},
    AppState,
};
use tower::ServiceExt;

/// Helper harness for spinning up the application over an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

/// Status, headers and decoded JSON body (`Null` when empty) of one response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.cors_allow_any_origin = true;
        // one connection, or every checkout would see its own empty database
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = store_api::app_router(state.clone()).expect("router builds");
        Self { router, state }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        content_type: &str,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, content_type);
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request builds"))
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, "application/json").await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body), "application/json")
            .await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body), "application/json")
            .await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, Some(body), "application/merge-patch+json")
            .await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None, "application/json")
            .await
    }

    /// Orders have no endpoint; tests insert them through the repository
    pub async fn seed_order(&self, code: &str) -> ProductOrder {
        ProductOrderRepository::new(self.state.db.clone())
            .insert(ProductOrder::new(epoch(), OrderStatus::Pending, code))
            .await
            .expect("order inserted")
    }

    /// Creates an invoice through the API and returns its id
    pub async fn create_invoice(&self, body: Value) -> i64 {
        let response = self.post("/api/invoices", body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["id"].as_i64().expect("id assigned")
    }

    /// Creates a shipment through the API and returns its id
    pub async fn create_shipment(&self, body: Value) -> i64 {
        let response = self.post("/api/shipments", body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["id"].as_i64().expect("id assigned")
    }
}

pub fn epoch() -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(0, 0).unwrap()
}

pub fn invoice_json() -> Value {
    serde_json::json!({
        "date": "1970-01-01T00:00:00Z",
        "details": "AAAAAAAAAA",
        "status": "PAID",
        "paymentMethod": "CREDIT_CARD",
        "paymentDate": "1970-01-01T00:00:00Z",
        "paymentAmount": "1"
    })
}

pub fn shipment_json() -> Value {
    serde_json::json!({
        "trackingCode": "AAAAAAAAAA",
        "date": "1970-01-01T00:00:00Z",
        "details": "AAAAAAAAAA"
    })
}
