use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use super::service::{AuthService, LoginRequest, SignupRequest};
use crate::app_state::AppState;
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::AuthUser;

pub async fn signup(
    State(state): State<AppState>,
    AppJson(request): AppJson<SignupRequest>,
) -> AppResult<impl IntoResponse> {
    let response = AuthService::new(&state).signup(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let response = AuthService::new(&state).login(request).await?;
    Ok(Json(response))
}

pub async fn me(caller: AuthUser) -> impl IntoResponse {
    Json(json!({ "user": caller.into_inner() }))
}
