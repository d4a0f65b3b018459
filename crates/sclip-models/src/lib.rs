//! Shared data models for the ShortClip pipeline.
//!
//! This crate provides Serde-serializable types and the pure timeline math
//! used across the workspace:
//! - Word timings from transcription and their remapped positions
//! - Silence intervals, active segments and the segment transform layout
//! - Sidecar transcript JSON schema
//! - Upload metadata schema
//!
//! Everything here is IO-free; FFmpeg invocation and network calls live in
//! `sclip-media` and `sclip-publish`.

pub mod encoding;
pub mod metadata;
pub mod sidecar;
pub mod timeline;
pub mod timestamp;
pub mod word;

// Re-export common types
pub use encoding::EncodingConfig;
pub use metadata::ShortMetadata;
pub use sidecar::{SidecarError, SidecarTranscript};
pub use timeline::{
    split_active_segments, ActiveSegment, CropRect, SegmentPlan, SilenceInterval, TimeMap,
    TransformOp, TransformedSegment, ZoomCurve,
};
pub use timestamp::{format_seconds, parse_timestamp, TimestampError};
pub use word::{
    remap_words, round_ms, sanitize_words, PlacedWord, RemappedWord, Word, MIN_WORD_DURATION_SECS,
};
