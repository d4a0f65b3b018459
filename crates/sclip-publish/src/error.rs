//! Publish error types.

use thiserror::Error;

pub type PublishResult<T> = Result<T, PublishError>;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Token refresh failed: {0}; re-authorization required")]
    TokenRefreshFailed(String),

    #[error("Metadata generation failed: {0}")]
    AiFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("API returned {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PublishError {
    pub fn ai_failed(msg: impl Into<String>) -> Self {
        Self::AiFailed(msg.into())
    }

    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::UploadFailed(msg.into())
    }

    /// Transient failures worth retrying with backoff.
    pub fn is_retryable(&self) -> bool {
        match self {
            PublishError::Http(_) | PublishError::AiFailed(_) => true,
            PublishError::ApiError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
