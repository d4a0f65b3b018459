//! Publishing finished clips.
//!
//! This crate provides:
//! - Gemini-backed upload metadata generation
//! - YouTube resumable upload with refresh-token auth
//! - A bounded-retry helper shared by both

pub mod error;
pub mod gemini;
pub mod retry;
pub mod youtube;

pub use error::{PublishError, PublishResult};
pub use gemini::{parse_metadata_json, GeminiClient};
pub use retry::{retry_async, RetryConfig, RetryResult};
pub use youtube::{load_upload_record, save_upload_record, StoredCredentials, YouTubeClient};
