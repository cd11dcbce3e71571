use axum::{
    routing::{get, post, put},
    Router,
};

use super::handlers::{
    add_feedback, all_complaints, categories, create_complaint, my_complaints, stats,
    update_status,
};
use crate::app_state::AppState;

pub fn complaint_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_complaint))
        .route("/categories", get(categories))
        .route("/my", get(my_complaints))
        .route("/all", get(all_complaints))
        .route("/stats", get(stats))
        .route("/{id}/status", put(update_status))
        .route("/{id}/feedback", put(add_feedback))
}
