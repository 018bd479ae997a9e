//! HTTP plumbing shared by every backend client.

use std::time::Duration;

use budgetly_shared::config::ApiConfig;
use budgetly_shared::{AppError, AppResult};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::session::SessionContext;

/// Maps a `reqwest` failure onto the application error taxonomy.
pub(crate) fn map_reqwest(err: &reqwest::Error) -> AppError {
    if err.is_decode() {
        AppError::Decode(err.to_string())
    } else {
        AppError::Transport(err.to_string())
    }
}

/// Base client: one `reqwest::Client`, the backend URL and the session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionContext,
}

impl ApiClient {
    /// Builds a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, session: SessionContext) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    /// The session this client authorizes with.
    #[must_use]
    pub const fn session(&self) -> &SessionContext {
        &self.session
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{path}", self.base_url))
    }

    /// Sends without credentials. Any non-success status, 401 included, is
    /// reported as `AppError::Api`.
    pub(crate) async fn send_public(&self, request: RequestBuilder) -> AppResult<Response> {
        let response = request.send().await.map_err(|e| map_reqwest(&e))?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(api_error(response).await)
    }

    /// Sends with the bearer token.
    ///
    /// Fails fast without a session. A 401 invalidates the session before
    /// `AppError::Unauthorized` is returned.
    pub(crate) async fn send_authorized(&self, request: RequestBuilder) -> AppResult<Response> {
        let token = self
            .session
            .token()
            .ok_or_else(|| AppError::Unauthorized("not logged in".to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| AppError::Unauthorized("stored token is not a valid header".to_string()))?;

        let response = request
            .header(AUTHORIZATION, bearer)
            .send()
            .await
            .map_err(|e| map_reqwest(&e))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            warn!("Backend rejected the session token");
            self.session.invalidate();
            let message = api_error(response).await.user_message();
            return Err(AppError::Unauthorized(message));
        }
        if status.is_success() {
            return Ok(response);
        }
        Err(api_error(response).await)
    }
}

/// Reads a success body as JSON.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    let body = response.text().await.map_err(|e| map_reqwest(&e))?;
    serde_json::from_str(&body).map_err(|e| AppError::Decode(e.to_string()))
}

/// Reads a success body that may legitimately be empty or `null`.
pub(crate) async fn read_optional_json(response: Response) -> AppResult<Option<Value>> {
    let body = response.text().await.map_err(|e| map_reqwest(&e))?;
    if body.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(&body) {
        Ok(Value::Null) => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(e) => Err(AppError::Decode(e.to_string())),
    }
}

async fn api_error(response: Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    });
    debug!(status = status.as_u16(), %message, "Backend returned an error");
    AppError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Pulls `message`, else `error`, out of a JSON error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .filter(|msg| !msg.is_empty())
        .map(str::to_string)
}
