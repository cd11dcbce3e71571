use std::ops::Deref;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::db::{User, UserRole};
use crate::error::{AppError, AppResult};
use crate::modules::auth::token;

/// The authenticated caller, re-loaded from the identity store on every request.
///
/// Handlers pass it explicitly to service operations; role checks happen there.
#[derive(Debug, Clone)]
pub struct AuthUser(User);

impl AuthUser {
    pub fn new(user: User) -> Self {
        Self(user)
    }

    pub fn into_inner(self) -> User {
        self.0
    }

    pub fn is_admin(&self) -> bool {
        self.0.role == UserRole::Admin
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Admin role required".to_string()))
        }
    }
}

impl Deref for AuthUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing Authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid Authorization format".to_string()))?;

        let claims = token::decode_token(token, state.env.auth.jwt_secret.expose_secret())
            .map_err(|e| {
                tracing::debug!("JWT validation failed: {e}");
                AppError::Authentication("Invalid or expired token".to_string())
            })?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::Authentication("Invalid or expired token".to_string()))?;

        let user = state
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Authentication("Account no longer exists".to_string()))?;

        Ok(AuthUser::new(user))
    }
}
