//! Fixtures shared by in-crate tests.

use std::sync::Arc;

use secrecy::ExposeSecret;

use crate::app_state::AppState;
use crate::config::Config;
use crate::db::{NewUser, User, UserRole};
use crate::middleware::AuthUser;
use crate::modules::auth::token;

pub fn state() -> AppState {
    AppState::in_memory(Arc::new(Config::for_tests()))
}

pub async fn user(state: &AppState, email: &str, role: UserRole, room: Option<&str>) -> AuthUser {
    let user = state
        .users
        .insert(NewUser {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            // Tests authenticate with tokens, never with this hash.
            password_hash: "unused".to_string(),
            role,
            room_number: room.map(str::to_string),
            phone_number: Some("9876543211".to_string()),
        })
        .await
        .expect("insert test user");
    AuthUser::new(user)
}

pub async fn resident(state: &AppState, email: &str, room: &str) -> AuthUser {
    user(state, email, UserRole::User, Some(room)).await
}

pub async fn admin(state: &AppState) -> AuthUser {
    user(state, "admin@hostel.com", UserRole::Admin, None).await
}

pub fn bearer(state: &AppState, user: &User) -> String {
    let auth = &state.env.auth;
    let token = token::create_token(user, auth.jwt_secret.expose_secret(), auth.token_expiry_hours)
        .expect("create test token");
    format!("Bearer {token}")
}
