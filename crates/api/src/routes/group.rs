use axum::routing::{get, post};
use axum::Router;

use crate::handlers::group;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/group/new", post(group::create))
        .route("/group/{id}", get(group::get_by_id))
        .route("/group/{id}/delete", post(group::delete))
}
