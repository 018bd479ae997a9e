//! Application-wide error types.
//!
//! Amount coercion never produces an error; everything here belongs to the
//! boundary with the remote collaborators (auth backend, budget store,
//! assistant) or to local setup.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Credentials missing, expired, or rejected by the backend.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Input rejected before it was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Non-success response from the backend.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message reported by the backend, or the status reason.
        message: String,
    },

    /// The request never produced a response.
    #[error("Network error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The assistant answered with `success: false`.
    #[error("Assistant error: {0}")]
    Assistant(String),

    /// Local credential storage failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Returns the error code for logs and machine-readable output.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Api { .. } => "API_ERROR",
            Self::Transport(_) => "NETWORK_ERROR",
            Self::Decode(_) => "DECODE_ERROR",
            Self::Assistant(_) => "ASSISTANT_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// True when the session must be torn down.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// True for failures worth a manual retry: network errors and 5xx,
    /// 408 or 429 responses.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            _ => false,
        }
    }

    /// Short message suitable for an inline, non-fatal notice.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized(_) => "Your session has ended. Please log in again.".to_string(),
            Self::Transport(_) => "Network error. Please try again.".to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::Decode(_) => "Unexpected response from the server.".to_string(),
            Self::Validation(msg)
            | Self::Assistant(msg)
            | Self::Storage(msg)
            | Self::Config(msg) => msg.clone(),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
