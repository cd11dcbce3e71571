use secrecy::{ExposeSecret, SecretBox};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::{password, token};
use crate::app_state::AppState;
use crate::db::{DatabaseError, NewUser, User, UserRole};
use crate::error::{field_errors, AppError, AppResult, FieldError};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    #[validate(length(min = 2, message = "Name must be at least 2 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    pub password: Option<SecretBox<String>>,
    #[serde(default)]
    #[validate(length(min = 1, message = "Room number is required"))]
    pub room_number: String,
    pub phone_number: Option<String>,
}

impl SignupRequest {
    fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.room_number = self.room_number.trim().to_string();
        self.phone_number = self
            .phone_number
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        self
    }

    fn check(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => field_errors(&errors),
        };

        let password_ok = self
            .password
            .as_ref()
            .is_some_and(|p| p.expose_secret().chars().count() >= MIN_PASSWORD_LEN);
        if !password_ok {
            errors.push(FieldError::new(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LEN} characters"),
            ));
            errors.sort_by(|a, b| a.field.cmp(&b.field));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    pub password: SecretBox<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

pub struct AuthService<'a> {
    state: &'a AppState,
}

impl<'a> AuthService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Registers a resident account. Admin accounts are never created here.
    pub async fn signup(&self, request: SignupRequest) -> AppResult<AuthResponse> {
        let request = request.normalized();
        request.check().map_err(AppError::Validation)?;

        let password = request
            .password
            .as_ref()
            .map(|p| p.expose_secret().as_str())
            .unwrap_or_default();
        let password_hash = password::hash_password(password).map_err(|e| {
            AppError::InternalServerError(format!("Password hashing failed: {e}"))
        })?;

        let user = self
            .state
            .users
            .insert(NewUser {
                name: request.name,
                email: request.email,
                password_hash,
                role: UserRole::User,
                room_number: Some(request.room_number),
                phone_number: request.phone_number,
            })
            .await
            .map_err(|e| match e {
                DatabaseError::Duplicate => {
                    AppError::Conflict("An account with this email already exists".to_string())
                }
                other => AppError::Database(other),
            })?;

        info!(user_id = %user.id, "resident signed up");
        self.issue(user)
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let invalid = || AppError::Authentication("Invalid email or password".to_string());

        let user = self
            .state
            .users
            .find_by_email(request.email.trim())
            .await?
            .ok_or_else(invalid)?;

        if !password::verify_password(request.password.expose_secret(), &user.password_hash) {
            return Err(invalid());
        }

        info!(user_id = %user.id, "user logged in");
        self.issue(user)
    }

    fn issue(&self, user: User) -> AppResult<AuthResponse> {
        let auth = &self.state.env.auth;
        let token = token::create_token(
            &user,
            auth.jwt_secret.expose_secret(),
            auth.token_expiry_hours,
        )
        .map_err(|e| AppError::InternalServerError(format!("JWT creation failed: {e}")))?;

        Ok(AuthResponse { token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn signup_request(email: &str, password: &str) -> SignupRequest {
        SignupRequest {
            name: "John Doe".to_string(),
            email: email.to_string(),
            password: Some(SecretBox::new(Box::new(password.to_string()))),
            room_number: "A101".to_string(),
            phone_number: None,
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: SecretBox::new(Box::new(password.to_string())),
        }
    }

    #[tokio::test]
    async fn signup_creates_resident_and_login_succeeds() {
        let state = test_support::state();
        let service = AuthService::new(&state);

        let created = service
            .signup(signup_request(" User@Hostel.com ", "password123"))
            .await
            .unwrap();
        assert_eq!(created.user.role, UserRole::User);
        assert_eq!(created.user.email, "user@hostel.com");
        assert_eq!(created.user.room_number.as_deref(), Some("A101"));

        let logged_in = service
            .login(login_request("user@hostel.com", "password123"))
            .await
            .unwrap();
        assert_eq!(logged_in.user.id, created.user.id);
    }

    #[tokio::test]
    async fn signup_reports_every_invalid_field() {
        let state = test_support::state();
        let request = SignupRequest {
            name: "J".to_string(),
            email: "not-an-email".to_string(),
            password: None,
            room_number: "  ".to_string(),
            phone_number: None,
        };

        let err = AuthService::new(&state).signup(request).await.unwrap_err();
        let AppError::Validation(fields) = err else {
            panic!("expected validation error, got {err:?}");
        };
        let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(names, vec!["email", "name", "password", "roomNumber"]);
    }

    #[tokio::test]
    async fn duplicate_signup_is_a_conflict() {
        let state = test_support::state();
        let service = AuthService::new(&state);
        service
            .signup(signup_request("jane@hostel.com", "password123"))
            .await
            .unwrap();

        let err = service
            .signup(signup_request("jane@hostel.com", "password123"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_look_the_same() {
        let state = test_support::state();
        let service = AuthService::new(&state);
        service
            .signup(signup_request("mike@hostel.com", "password123"))
            .await
            .unwrap();

        let wrong_password = service
            .login(login_request("mike@hostel.com", "nope"))
            .await
            .unwrap_err();
        let unknown = service
            .login(login_request("ghost@hostel.com", "password123"))
            .await
            .unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown.to_string());
        assert!(matches!(unknown, AppError::Authentication(_)));
    }
}
