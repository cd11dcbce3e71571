use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{login, me, signup};
use crate::app_state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/me", get(me))
}
