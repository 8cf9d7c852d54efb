//! HTTP-level integration tests for process registration, lifecycle and
//! tenant resolution.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{
    body_json, build_test_app, build_test_app_with, create_process, get, post_empty, post_json,
    send_as, test_config,
};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_returns_running_process_with_flattened_metadata(pool: PgPool) {
    let response = post_json(
        build_test_app(pool),
        "/api/v1/process/new",
        json!({
            "project": "mnist",
            "user_metadata": {"optimizer": {"name": "adam", "lr": 0.001}, "tags": ["a"]},
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let data = &json["data"];
    assert!(data["process_uuid"].is_string());
    assert_eq!(data["status"], "running");
    assert_eq!(data["project"], "mnist");
    assert_eq!(data["tenant_id"], common::TEST_TENANT);
    assert!(data["end_time"].is_null());
    assert_eq!(
        data["metadata"],
        json!({"optimizer.lr": 0.001, "optimizer.name": "adam", "tags": ["a"]})
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_accepts_empty_body(pool: PgPool) {
    let response = post_empty(build_test_app(pool), "/api/v1/process/new").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(body_json(response).await["data"]["group_id"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_rejects_unknown_keys(pool: PgPool) {
    let response = post_json(
        build_test_app(pool),
        "/api/v1/process/new",
        json!({"project": "p", "hyperparams": {}}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_with_group_links_the_new_group(pool: PgPool) {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/process/new",
        json!({"group": "sweep-7"}),
    )
    .await;
    let json = body_json(response).await;
    let group_id = json["data"]["group_id"].as_str().unwrap().to_string();

    let response = get(build_test_app(pool), &format!("/api/v1/group/{group_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let group = body_json(response).await;
    assert_eq!(group["data"]["name"], "sweep-7");
    assert_eq!(
        group["data"]["processes"][0]["process_uuid"],
        json["data"]["process_uuid"]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_returns_process_with_metadata(pool: PgPool) {
    let id = create_process(
        build_test_app(pool.clone()),
        json!({"user_metadata": {"seed": 7}}),
    )
    .await;

    let response = get(build_test_app(pool), &format!("/api/v1/process/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["process_uuid"], id);
    assert_eq!(json["data"]["metadata"]["seed"], 7);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_returns_only_own_processes(pool: PgPool) {
    let own = create_process(build_test_app(pool.clone()), json!({})).await;
    send_as(
        build_test_app(pool.clone()),
        "other",
        Method::POST,
        "/api/v1/process/new",
        None,
    )
    .await;

    let response = get(build_test_app(pool), "/api/v1/processes").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let ids: Vec<_> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["process_uuid"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, [own]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_respects_configured_limit(pool: PgPool) {
    for _ in 0..3 {
        create_process(build_test_app(pool.clone()), json!({})).await;
    }

    let mut config = test_config();
    config.list_process_limit = 2;
    let response = get(build_test_app_with(pool, config), "/api/v1/processes").await;

    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_cascades_and_returns_204(pool: PgPool) {
    let id = create_process(build_test_app(pool.clone()), json!({"user_metadata": {"k": 1}})).await;
    post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/process/{id}/model-metrics"),
        json!([{"step_name": "epoch", "step": 1, "metrics": {"loss": 1}}]),
    )
    .await;

    let response = post_empty(build_test_app(pool.clone()), &format!("/api/v1/process/{id}/delete")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let remaining: i64 = sqlx::query_scalar(
        "SELECT (SELECT COUNT(*) FROM model_metrics) + (SELECT COUNT(*) FROM process_metadata)",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(remaining, 0);

    let response = post_empty(build_test_app(pool), &format!("/api/v1/process/{id}/delete")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_metadata_upserts_keys(pool: PgPool) {
    let id = create_process(
        build_test_app(pool.clone()),
        json!({"user_metadata": {"lr": 0.1, "seed": 1}}),
    )
    .await;

    let response = post_json(
        build_test_app(pool),
        &format!("/api/v1/process/{id}/update-metadata"),
        json!({"user_metadata": {"lr": 0.01, "data": {"split": "val"}}}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["data"]["metadata"],
        json!({"data.split": "val", "lr": 0.01, "seed": 1})
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn update_metadata_for_unknown_process_returns_404(pool: PgPool) {
    let missing = uuid::Uuid::new_v4();
    let response = post_json(
        build_test_app(pool),
        &format!("/api/v1/process/{missing}/update-metadata"),
        json!({"user_metadata": {"k": 1}}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn terminal_state_sets_end_time(pool: PgPool) {
    let id = create_process(build_test_app(pool.clone()), json!({})).await;

    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/process/{id}/state"),
        json!({"state": "failed"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "failed");
    assert!(json["data"]["end_time"].is_string());

    let response = post_json(
        build_test_app(pool),
        &format!("/api/v1/process/{id}/state"),
        json!({"state": "paused"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Tenant resolution
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_tenant_returns_401(pool: PgPool) {
    let request = Request::builder()
        .uri("/api/v1/processes")
        .body(Body::empty())
        .unwrap();
    let response = build_test_app(pool).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_tenant_returns_400(pool: PgPool) {
    let response = send_as(build_test_app(pool), "bad/tenant", Method::GET, "/api/v1/processes", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bearer_tenant_is_accepted(pool: PgPool) {
    let id = create_process(build_test_app(pool.clone()), json!({})).await;

    let request = Request::builder()
        .uri(format!("/api/v1/process/{id}"))
        .header("authorization", format!("Bearer {}:token", common::TEST_TENANT))
        .body(Body::empty())
        .unwrap();
    let response = build_test_app(pool).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_tenant_sees_404(pool: PgPool) {
    let id = create_process(build_test_app(pool.clone()), json!({})).await;

    let response = send_as(
        build_test_app(pool),
        "intruder",
        Method::GET,
        &format!("/api/v1/process/{id}"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn const_tenant_overrides_headers(pool: PgPool) {
    let id = create_process(build_test_app(pool.clone()), json!({})).await;

    let mut config = test_config();
    config.const_tenant = Some(trainwatch_core::tenant::TenantId::parse(common::TEST_TENANT).unwrap());
    let response = send_as(
        build_test_app_with(pool, config),
        "ignored",
        Method::GET,
        &format!("/api/v1/process/{id}"),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}
