//! Pipeline configuration.
//!
//! All thresholds and tunables live in one immutable struct passed into
//! each stage, never in module-level globals. Environment variables
//! override individual values; everything has a default.

use std::path::PathBuf;

use sclip_captions::{AssConfig, SectionConfig};
use sclip_media::{ExtractConfig, MixConfig, PlanConfig, SilenceConfig, SilenceThreshold};
use sclip_models::encoding::EncodingConfig;

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Clip window extraction bounds.
    pub extract: ExtractConfig,
    /// Silence detection tunables.
    pub silence: SilenceConfig,
    /// Per-segment speed/zoom sampling.
    pub plan: PlanConfig,
    /// Encoding parameters for every re-encode step.
    pub encoding: EncodingConfig,
    /// Caption section grouping and layout.
    pub sections: SectionConfig,
    /// Caption appearance.
    pub captions: AssConfig,
    /// Music/bleep mixing.
    pub mix: MixConfig,
    /// Background music bed; `None` disables the music mix.
    pub music_file: Option<PathBuf>,
    /// Title hint passed to metadata generation.
    pub title_hint: String,
    /// OAuth credentials file for uploads.
    pub token_path: PathBuf,
}

impl PipelineConfig {
    /// Build configuration from environment variables over defaults.
    pub fn from_env() -> Self {
        let mut config = Self {
            token_path: PathBuf::from("token.json"),
            title_hint: std::env::var("SCLIP_TITLE_HINT").unwrap_or_default(),
            ..Default::default()
        };

        if let Some(v) = env_f64("SCLIP_MIN_CLIP_SECS") {
            config.extract.min_clip_secs = v;
        }
        if let Some(v) = env_f64("SCLIP_MAX_CLIP_SECS") {
            config.extract.max_clip_secs = v;
        }
        if let Some(v) = env_f64("SCLIP_SILENCE_THRESHOLD") {
            config.silence.threshold = SilenceThreshold::RelativeToGlobalRms(v as f32);
        }
        if let Some(v) = env_f64("SCLIP_SILENCE_THRESHOLD_ABS") {
            config.silence.threshold = SilenceThreshold::Absolute(v as f32);
        }
        if let Some(v) = env_f64("SCLIP_CHUNK_DURATION") {
            config.silence.chunk_duration = v;
        }
        if let Some(v) = env_f64("SCLIP_TRANSITION_MARGIN") {
            config.silence.transition_margin = v;
        }
        if let Some(v) = env_f64("SCLIP_MIN_SEGMENT_SECS") {
            config.silence.min_segment_secs = v;
        }
        if let Some(v) = env_f64("SCLIP_MUSIC_VOLUME") {
            config.mix.music_volume = v;
        }
        if let Ok(path) = std::env::var("SCLIP_MUSIC_FILE") {
            if !path.is_empty() {
                config.music_file = Some(PathBuf::from(path));
            }
        }
        if let Ok(path) = std::env::var("SCLIP_TOKEN_PATH") {
            if !path.is_empty() {
                config.token_path = PathBuf::from(path);
            }
        }

        config
    }
}

fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}
