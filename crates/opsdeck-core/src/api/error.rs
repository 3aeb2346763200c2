use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Shown when a failed response carries no usable `detail` field.
pub const GENERIC_FAILURE_MESSAGE: &str = "Request failed";

/// Shown when no response reached the client at all.
pub const NETWORK_FAILURE_MESSAGE: &str = "Network error, please check your connection";

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Server returned {status}: {body}")]
    Server {
        status: StatusCode,
        detail: Option<String>,
        body: String,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Error body shape used by the backend. `detail` is usually a string but
/// validation failures send a list, so it is kept loosely typed.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Pull the human-readable `detail` string out of an error body.
    pub fn detail_message(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        match parsed.detail? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let detail = Self::detail_message(body);
        if status == StatusCode::UNAUTHORIZED {
            ApiError::Unauthorized {
                message: detail.unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            }
        } else {
            ApiError::Server {
                status,
                detail,
                body: Self::truncate_body(body),
            }
        }
    }

    /// Status code of the server response, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            ApiError::Server { status, .. } => Some(*status),
            ApiError::Network(e) => e.status(),
            ApiError::InvalidResponse(_) => None,
        }
    }

    /// Whether the failure carried a server response.
    pub fn has_response(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. } | ApiError::Server { .. })
    }

    /// Message suitable for a transient user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized { message } => message.clone(),
            ApiError::Server { detail, .. } => detail
                .clone()
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            ApiError::Network(_) => NETWORK_FAILURE_MESSAGE.to_string(),
            ApiError::InvalidResponse(_) => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}
