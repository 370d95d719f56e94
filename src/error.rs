//! Typed errors surfaced at the HTTP boundary
//!
//! Internal code works with `anyhow::Result`; handlers convert into
//! [`ApiError`] so every failure maps to a status code and a JSON message.

/// Error returned by API handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed input (400)
    #[error("{0}")]
    Validation(String),

    /// No valid session token (401)
    #[error("Authentication required")]
    Unauthorized,

    /// Resource belongs to someone else or is immutable (403)
    #[error("{0}")]
    Forbidden(String),

    /// Resource does not exist (404)
    #[error("{0}")]
    NotFound(String),

    /// Request body over the configured limit (413)
    #[error("Request body too large")]
    PayloadTooLarge,

    /// Store or serialization failure (500)
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Unauthorized => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::PayloadTooLarge => 413,
            Self::Internal(_) => 500,
        }
    }

    /// Message sent to the client.
    ///
    /// Internal errors only expose their cause outside production mode.
    pub fn public_message(&self, production: bool) -> String {
        match self {
            Self::Internal(_) if production => "Internal server error".to_string(),
            Self::Internal(e) => format!("{:#}", e),
            other => other.to_string(),
        }
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Internal(e.into())
    }
}
