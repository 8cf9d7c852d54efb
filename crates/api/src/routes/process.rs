//! Route definitions for processes and their model metrics.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{model_metrics, process};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/process/new", post(process::create))
        .route("/process/{id}", get(process::get_by_id))
        .route("/process/{id}/delete", post(process::delete))
        .route("/process/{id}/update-metadata", post(process::update_metadata))
        .route("/process/{id}/state", post(process::update_state))
        .route(
            "/process/{id}/model-metrics",
            get(model_metrics::get_for_process).post(model_metrics::ingest),
        )
        .route("/processes", get(process::list))
        .route("/processes/model-metrics", post(model_metrics::query))
}
