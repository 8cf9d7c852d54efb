//! HTTP-level integration tests for process groups.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post_empty, post_json};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_and_fetch_group(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/group/new",
        json!({"name": "lr-sweep", "description": "learning rate sweep"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["data"]["group_uuid"].as_str().unwrap().to_string();

    let response = get(build_test_app(pool), &format!("/api/v1/group/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["name"], "lr-sweep");
    assert_eq!(json["data"]["description"], "learning rate sweep");
    assert_eq!(json["data"]["processes"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_with_empty_body_uses_defaults(pool: PgPool) {
    let response = post_empty(build_test_app(pool), "/api/v1/group/new").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"]["name"], "");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_unlinks_member_processes(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/process/new",
        json!({"group": "g"}),
    )
    .await;
    let process = body_json(response).await;
    let process_id = process["data"]["process_uuid"].as_str().unwrap().to_string();
    let group_id = process["data"]["group_id"].as_str().unwrap().to_string();

    let response = post_empty(
        build_test_app(pool.clone()),
        &format!("/api/v1/group/{group_id}/delete"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(build_test_app(pool.clone()), &format!("/api/v1/process/{process_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"]["group_id"].is_null());

    let response = get(build_test_app(pool), &format!("/api/v1/group/{group_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
