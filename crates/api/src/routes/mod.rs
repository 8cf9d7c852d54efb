pub mod group;
pub mod health;
pub mod process;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /process/new                         register (POST)
/// /process/{id}                        get with metadata
/// /process/{id}/delete                 delete, cascading (POST)
/// /process/{id}/update-metadata        upsert metadata keys (POST)
/// /process/{id}/state                  set lifecycle state (POST)
/// /process/{id}/model-metrics          ingest batch (POST), panels (GET)
/// /processes                           list, newest first
/// /processes/model-metrics             panels for several processes (POST)
///
/// /group/new                           create (POST)
/// /group/{id}                          get with member processes
/// /group/{id}/delete                   delete, unlinking members (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(process::router())
        .merge(group::router())
}
