//! Caption handling for the ShortClip pipeline.
//!
//! This crate provides:
//! - Transcript acquisition (sidecar JSON, embedded subtitle tracks)
//! - Word timing sanitization and output-timeline remapping
//! - Profanity censoring with bleep scheduling
//! - Section grouping and ASS subtitle generation for the burn-in renderer

pub mod ass;
pub mod error;
pub mod profanity;
pub mod sections;
pub mod sidecar;
pub mod transcribe;
pub mod vtt;

pub use ass::{format_ass_time, render_ass, AssConfig};
pub use error::{CaptionError, CaptionResult};
pub use profanity::{ProfanityFilter, BLEEP_MARKER, DEFAULT_CURSE_WORDS};
pub use sections::{group_into_sections, CaptionSection, SectionConfig};
pub use sidecar::{load_sidecar, save_sidecar};
pub use transcribe::{load_or_transcribe, transcribe_from_subtitles};
pub use vtt::parse_vtt;

// The remapping math itself lives with the timeline types
pub use sclip_models::word::{remap_words, PlacedWord, RemappedWord};
