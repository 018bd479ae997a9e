//! Login, registration and session restore.

use budgetly_shared::{AppError, AppResult};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::{Validate, ValidationErrors};

use crate::api::{ApiClient, read_json};
use crate::session::{Session, User};

/// Login form.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    /// Account email.
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    /// Account password.
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Signup form.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterRequest {
    /// Account email.
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    /// Account password.
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    /// Display name.
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    #[serde(default)]
    user: Option<User>,
}

#[derive(Deserialize)]
struct MeResponse {
    user: User,
}

/// Flattens validator output into one message, field order stable.
fn validation_error(errors: &ValidationErrors) -> AppError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    let message = fields
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map_or_else(|| format!("{field} is invalid"), ToString::to_string)
            })
        })
        .collect::<Vec<_>>()
        .join("; ");
    AppError::Validation(message)
}

/// Authentication endpoints.
#[derive(Debug, Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    /// Creates a client over an existing connection.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Validates, then logs in and establishes the session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for malformed credentials,
    /// `AppError::Api` when the backend rejects them, and transport or
    /// storage errors as they occur.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<User> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        request.validate().map_err(|e| validation_error(&e))?;

        let response = self
            .api
            .send_public(
                self.api
                    .request(Method::POST, "/api/auth/login")
                    .json(&request),
            )
            .await
            .inspect_err(|e| warn!(error_code = e.error_code(), "Login failed"))?;
        let body: LoginResponse = read_json(response).await?;

        let user = body.user.unwrap_or_else(|| User {
            name: String::new(),
            email: request.email.clone(),
        });
        self.api
            .session()
            .establish(Session::new(body.token, Some(user.clone())))?;
        info!(email = %request.email, "Logged in");
        Ok(user)
    }

    /// Creates an account. Does not log in; any token the backend returns
    /// is discarded.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for malformed input and `AppError::Api`
    /// when the backend refuses the registration.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> AppResult<()> {
        let request = RegisterRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
            name: name.trim().to_string(),
        };
        request.validate().map_err(|e| validation_error(&e))?;

        self.api
            .send_public(
                self.api
                    .request(Method::POST, "/api/auth/register")
                    .json(&request),
            )
            .await
            .inspect_err(|e| warn!(error_code = e.error_code(), "Registration failed"))?;
        info!(email = %request.email, "Registered; login required");
        Ok(())
    }

    /// Fetches the current user. Any failure invalidates the session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` without a session, or the underlying
    /// error after the session has been torn down.
    pub async fn fetch_me(&self) -> AppResult<User> {
        let result = async {
            let response = self
                .api
                .send_authorized(self.api.request(Method::GET, "/api/auth/me"))
                .await?;
            read_json::<MeResponse>(response).await
        }
        .await;

        match result {
            Ok(body) => {
                self.api.session().set_user(body.user.clone());
                Ok(body.user)
            }
            Err(e) => {
                warn!(error_code = e.error_code(), "Could not fetch current user");
                self.api.session().invalidate();
                Err(e)
            }
        }
    }

    /// Restores a persisted session and validates it.
    ///
    /// Returns `None` when no token was stored.
    ///
    /// # Errors
    ///
    /// Returns the validation failure; the stale token is cleared first.
    pub async fn restore(&self) -> AppResult<Option<User>> {
        if !self.api.session().resume()? {
            return Ok(None);
        }
        self.fetch_me().await.map(Some)
    }

    /// Signs out locally and forgets the persisted token.
    pub fn logout(&self) {
        self.api.session().invalidate();
        info!("Logged out");
    }
}
