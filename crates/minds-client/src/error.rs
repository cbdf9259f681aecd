//! Client error types.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A resource with the same name already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Credentials were accepted but lack access to the resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Any other failure reported by the service.
    #[error("Request failed ({status}): {message}")]
    RequestFailed {
        /// HTTP status code.
        status: u16,
        /// Error message from the service.
        message: String,
    },

    /// The service answered with a body this client cannot interpret.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Stream error.
    #[error("Stream error: {0}")]
    Stream(String),
}

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Check if this is a duplicate-name error.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists(_))
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_) | Error::Forbidden(_))
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::RequestFailed { status, .. } if *status >= 500)
    }

    /// Map a failed response status and message onto the error taxonomy.
    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            404 => Error::NotFound(message),
            409 => Error::AlreadyExists(message),
            400 if message.to_lowercase().contains("already exists") => {
                Error::AlreadyExists(message)
            }
            401 => Error::Auth(message),
            403 => Error::Forbidden(message),
            _ => Error::RequestFailed { status, message },
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Pull a human-readable message out of an error body.
///
/// The service is not consistent about where it puts the text, so `detail`,
/// `message` and `error` are all tried before falling back to the raw body.
pub(crate) fn error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "message", "error"] {
            match value.get(key) {
                Some(serde_json::Value::String(s)) => return s.clone(),
                Some(serde_json::Value::Object(obj)) => {
                    if let Some(serde_json::Value::String(s)) = obj.get("message") {
                        return s.clone();
                    }
                }
                _ => {}
            }
        }
    }

    let body = body.trim();
    if body.is_empty() {
        format!("HTTP {}", status)
    } else {
        body.to_string()
    }
}
