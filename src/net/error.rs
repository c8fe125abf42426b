//! Errors returned by the request wrapper.

/// Message used when a failed response carries no `error.message`.
pub const DEFAULT_ERROR_MESSAGE: &str = "Request failed";

/// Failure of a single API call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, TLS, body read).
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status. Displays as the
    /// server-provided message so callers can show it verbatim.
    #[error("{message}")]
    Status { status: u16, code: Option<String>, message: String },

    /// A 2xx body did not match the expected record shape.
    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    /// A caller-supplied header name or value was not valid HTTP.
    #[error("invalid header: {0}")]
    InvalidHeader(String),
}

impl ApiError {
    /// Stable machine-readable code for logs and CLI output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "E_TRANSPORT",
            Self::Status { .. } => "E_REQUEST_FAILED",
            Self::Decode(_) => "E_DECODE",
            Self::InvalidHeader(_) => "E_INVALID_HEADER",
        }
    }

    /// HTTP status for [`ApiError::Status`], `None` otherwise.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
