//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Clip processing failed: {0}")]
    ProcessingFailed(String),

    #[error("Media error: {0}")]
    Media(#[from] sclip_media::MediaError),

    #[error("Caption error: {0}")]
    Caption(#[from] sclip_captions::CaptionError),

    #[error("Publish error: {0}")]
    Publish(#[from] sclip_publish::PublishError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WorkerError {
    pub fn processing_failed(msg: impl Into<String>) -> Self {
        Self::ProcessingFailed(msg.into())
    }

    /// Errors that doom the whole run rather than a single clip.
    ///
    /// A missing FFmpeg binary fails every subsequent clip the same way,
    /// so the batch loop stops instead of logging it per file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            WorkerError::Media(sclip_media::MediaError::FfmpegNotFound)
                | WorkerError::Media(sclip_media::MediaError::FfprobeNotFound)
        )
    }
}
