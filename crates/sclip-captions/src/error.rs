//! Caption error types.

use std::path::PathBuf;
use thiserror::Error;

pub type CaptionResult<T> = Result<T, CaptionError>;

#[derive(Debug, Error)]
pub enum CaptionError {
    #[error("No subtitle stream in {0}")]
    NoSubtitles(PathBuf),

    #[error("Subtitle extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Sidecar error: {0}")]
    Sidecar(#[from] sclip_models::sidecar::SidecarError),

    #[error("Media error: {0}")]
    Media(#[from] sclip_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
