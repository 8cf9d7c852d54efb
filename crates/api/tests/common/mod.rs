#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use trainwatch_api::config::{LogFormat, ServerConfig};
use trainwatch_api::router::build_app_router;
use trainwatch_api::state::AppState;

/// Tenant sent by the request helpers below.
pub const TEST_TENANT: &str = "test-tenant";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: String::new(),
        db_max_connections: 5,
        cors_origins: vec!["http://localhost:3000".parse().unwrap()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        const_tenant: None,
        allow_zero_step: false,
        list_process_limit: 100,
        log_format: LogFormat::Pretty,
    }
}

/// Build the full application router over `pool`, exercising the same
/// middleware stack production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    build_app_router(AppState {
        pool,
        config: Arc::new(config),
    })
}

/// Send a request as [`TEST_TENANT`].
pub async fn send(app: Router, method: Method, uri: &str, body: Option<String>) -> Response {
    send_as(app, TEST_TENANT, method, uri, body).await
}

/// Send a request with an explicit `X-Scope-OrgID`.
pub async fn send_as(
    app: Router,
    tenant: &str,
    method: Method,
    uri: &str,
    body: Option<String>,
) -> Response {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-scope-orgid", tenant);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, Some(body.to_string())).await
}

pub async fn post_raw(app: Router, uri: &str, body: &str) -> Response {
    send(app, Method::POST, uri, Some(body.to_string())).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response {
    send(app, Method::POST, uri, None).await
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Register a process through the API and return its id.
pub async fn create_process(app: Router, body: Value) -> String {
    let response = post_json(app, "/api/v1/process/new", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["process_uuid"].as_str().unwrap().to_string()
}
