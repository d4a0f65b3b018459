//! Source window extraction.
//!
//! A processing run starts by cutting a random window out of the long
//! source video. The window length is drawn from a configured range and
//! the start position is drawn from whatever room the source leaves.

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use sclip_models::encoding::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_video;

/// Clip window extraction configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Minimum clip length in seconds.
    pub min_clip_secs: f64,
    /// Maximum clip length in seconds.
    pub max_clip_secs: f64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            min_clip_secs: 10.0,
            max_clip_secs: 40.0,
        }
    }
}

/// The window that was extracted, on the source's timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractedWindow {
    pub start: f64,
    pub length: f64,
}

/// Choose a random window within a source of the given duration.
///
/// Errors with `SourceTooShort` when the source cannot fit the minimum
/// clip length; batch callers log this and move on to the next candidate.
pub fn choose_window<R: Rng>(
    duration: f64,
    config: &ExtractConfig,
    rng: &mut R,
) -> MediaResult<ExtractedWindow> {
    if duration < config.min_clip_secs {
        return Err(MediaError::SourceTooShort {
            actual: duration,
            minimum: config.min_clip_secs,
        });
    }

    let max_len = config.max_clip_secs.min(duration);
    let length = if max_len > config.min_clip_secs {
        rng.random_range(config.min_clip_secs..=max_len)
    } else {
        config.min_clip_secs
    };

    let slack = duration - length;
    let start = if slack > 0.0 {
        rng.random_range(0.0..slack)
    } else {
        0.0
    };

    Ok(ExtractedWindow { start, length })
}

/// Extract a random window from `input` into `output`, re-encoding so the
/// cut is frame-accurate regardless of keyframe placement.
pub async fn extract_random_window<R: Rng>(
    input: &Path,
    output: &Path,
    config: &ExtractConfig,
    encoding: &EncodingConfig,
    rng: &mut R,
) -> MediaResult<ExtractedWindow> {
    let info = probe_video(input).await?;
    let window = choose_window(info.duration, config, rng)?;
    extract_window(input, output, window, encoding).await?;
    Ok(window)
}

/// Extract a fixed window from `input` into `output`.
pub async fn extract_window(
    input: &Path,
    output: &Path,
    window: ExtractedWindow,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    info!(
        input = %input.display(),
        start = window.start,
        length = window.length,
        "Extracting clip window"
    );

    let cmd = FfmpegCommand::new(input, output)
        .seek(window.start)
        .duration(window.length)
        .output_args(encoding.to_ffmpeg_args());

    FfmpegRunner::new().run(&cmd).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_short_source_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = choose_window(5.0, &ExtractConfig::default(), &mut rng);
        assert!(matches!(result, Err(MediaError::SourceTooShort { .. })));
    }

    #[test]
    fn test_window_fits_source() {
        let config = ExtractConfig::default();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let window = choose_window(120.0, &config, &mut rng).unwrap();
            assert!(window.length >= config.min_clip_secs);
            assert!(window.length <= config.max_clip_secs);
            assert!(window.start >= 0.0);
            assert!(window.start + window.length <= 120.0 + 1e-9);
        }
    }

    #[test]
    fn test_source_shorter_than_max_clamps_length() {
        let config = ExtractConfig {
            min_clip_secs: 10.0,
            max_clip_secs: 40.0,
        };
        let mut rng = StdRng::seed_from_u64(3);

        let window = choose_window(12.0, &config, &mut rng).unwrap();
        assert!(window.length <= 12.0);
        assert!(window.start + window.length <= 12.0 + 1e-9);
    }

    #[test]
    fn test_source_exactly_minimum() {
        let config = ExtractConfig::default();
        let mut rng = StdRng::seed_from_u64(9);

        let window = choose_window(10.0, &config, &mut rng).unwrap();
        assert_eq!(window.start, 0.0);
        assert_eq!(window.length, 10.0);
    }
}
