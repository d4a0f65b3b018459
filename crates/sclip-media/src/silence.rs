//! Silence detection over the energy series.
//!
//! A run of chunks below the threshold becomes a [`SilenceInterval`], padded
//! on both sides by the transition margin so cuts land slightly outside the
//! detected silence. Padded intervals may overlap; the active-segment
//! splitter merges them.
//!
//! # State machine
//!
//! ```text
//!                    rms >= threshold
//!     ┌────────────────────────────────────────────┐
//!     │                                            │
//!     ▼                                            │
//! ┌────────┐                                  ┌─────────┐
//! │ Active │──────────────────────────────────│ Silence │
//! └────────┘        rms < threshold           └─────────┘
//!     │                                            │
//!     └──────── close run with margin padding ─────┘
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use sclip_models::timeline::{split_active_segments, ActiveSegment, SilenceInterval};

use crate::audio::{extract_analysis_waveform, ANALYSIS_SAMPLE_RATE};
use crate::energy::{compute_energy_chunks, global_rms, EnergyChunk};
use crate::error::MediaResult;
use crate::probe::probe_video;

/// Silence threshold policy.
///
/// The relative form is the default: an absolute RMS cutoff does not
/// generalize across recordings of different loudness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SilenceThreshold {
    /// Fixed RMS cutoff.
    Absolute(f32),
    /// Fraction of the clip's global RMS, computed over the same chunking
    /// as detection.
    RelativeToGlobalRms(f32),
}

/// Configuration for silence detection and segmentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SilenceConfig {
    /// Threshold policy for deciding a chunk is silent.
    pub threshold: SilenceThreshold,

    /// Energy window size in seconds.
    ///
    /// - 0.1s: fine-grained, noisier detection
    /// - 0.3s (default): matches the tuned production constants
    pub chunk_duration: f64,

    /// Padding applied to both ends of each detected silence run (seconds).
    pub transition_margin: f64,

    /// Active segments shorter than this are dropped as noise (seconds).
    pub min_segment_secs: f64,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            threshold: SilenceThreshold::RelativeToGlobalRms(0.15),
            chunk_duration: 0.30,
            transition_margin: 0.31,
            min_segment_secs: 0.2,
        }
    }
}

impl SilenceConfig {
    /// More aggressive cutting for fast-paced content.
    pub fn aggressive() -> Self {
        Self {
            threshold: SilenceThreshold::RelativeToGlobalRms(0.25),
            transition_margin: 0.15,
            ..Default::default()
        }
    }

    /// Builder-style setter for the threshold policy.
    pub fn with_threshold(mut self, threshold: SilenceThreshold) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Silence and segmentation analysis for one clip.
#[derive(Debug, Clone)]
pub struct ClipAnalysis {
    /// Clip duration in seconds (container duration, not waveform length).
    pub duration: f64,
    /// Detected silence intervals, padded, in increasing start order.
    pub silences: Vec<SilenceInterval>,
    /// Active segments after merging and micro-segment filtering.
    pub segments: Vec<ActiveSegment>,
}

impl ClipAnalysis {
    /// Whole clip active, no detected silence. Used as the fallback when
    /// detection cannot run (silent clip, zero threshold).
    pub fn untouched(duration: f64) -> Self {
        Self {
            duration,
            silences: Vec::new(),
            segments: vec![ActiveSegment {
                start: 0.0,
                end: duration,
            }],
        }
    }

    pub fn total_active_secs(&self) -> f64 {
        self.segments.iter().map(|s| s.duration()).sum()
    }
}

/// Threshold the energy series into silence intervals.
///
/// Runs of chunks with `rms < threshold` are closed as
/// `[run_start - margin, run_end + margin]` clipped to `[0, duration]`; a
/// run still open when the series ends closes against the final chunk
/// boundary. A zero or negative resolved threshold (silent clip under the
/// relative policy) yields no intervals, leaving the whole clip active.
pub fn detect_silent_intervals(
    chunks: &[EnergyChunk],
    config: &SilenceConfig,
    duration: f64,
) -> Vec<SilenceInterval> {
    let threshold = match config.threshold {
        SilenceThreshold::Absolute(value) => value,
        SilenceThreshold::RelativeToGlobalRms(factor) => global_rms(chunks) * factor,
    };

    if threshold <= 0.0 {
        debug!(threshold, "Resolved silence threshold is zero, skipping detection");
        return Vec::new();
    }

    let chunk_duration = config.chunk_duration;
    let margin = config.transition_margin;

    let mut intervals = Vec::new();
    let mut current_start: Option<f64> = None;

    for chunk in chunks {
        let chunk_start = chunk.index as f64 * chunk_duration;

        if chunk.rms < threshold {
            if current_start.is_none() {
                current_start = Some(chunk_start);
            }
        } else if let Some(run_start) = current_start.take() {
            push_interval(&mut intervals, run_start, chunk_start, margin, duration);
        }
    }

    // Run still open at the end of the series
    if let Some(run_start) = current_start {
        let series_end = chunks.len() as f64 * chunk_duration;
        push_interval(&mut intervals, run_start, series_end, margin, duration);
    }

    intervals
}

fn push_interval(
    intervals: &mut Vec<SilenceInterval>,
    run_start: f64,
    run_end: f64,
    margin: f64,
    duration: f64,
) {
    let start = (run_start - margin).max(0.0);
    let end = (run_end + margin).min(duration);
    if start < end {
        intervals.push(SilenceInterval { start, end });
    }
}

/// Analyze a clip end-to-end: extract the analysis waveform, threshold its
/// energy, and split the timeline into active segments.
///
/// Returns `MediaError::NoAudioStream` for sources without audio; the
/// pipeline degrades to the captionless path in that case.
pub async fn analyze_clip(input: &Path, config: &SilenceConfig) -> MediaResult<ClipAnalysis> {
    let info = probe_video(input).await?;
    let samples = extract_analysis_waveform(input).await?;

    let chunks = compute_energy_chunks(&samples, ANALYSIS_SAMPLE_RATE, config.chunk_duration);
    let silences = detect_silent_intervals(&chunks, config, info.duration);
    let segments = split_active_segments(&silences, info.duration, config.min_segment_secs);

    let analysis = ClipAnalysis {
        duration: info.duration,
        silences,
        segments,
    };

    debug!(
        duration_secs = analysis.duration,
        silence_count = analysis.silences.len(),
        segment_count = analysis.segments.len(),
        active_secs = analysis.total_active_secs(),
        "Silence analysis complete"
    );

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks_from(rms: &[f32]) -> Vec<EnergyChunk> {
        rms.iter()
            .enumerate()
            .map(|(index, &rms)| EnergyChunk { index, rms })
            .collect()
    }

    fn absolute(threshold: f32) -> SilenceConfig {
        SilenceConfig {
            threshold: SilenceThreshold::Absolute(threshold),
            chunk_duration: 0.3,
            transition_margin: 0.31,
            min_segment_secs: 0.2,
        }
    }

    #[test]
    fn test_all_loud_no_silence() {
        let chunks = chunks_from(&[0.5, 0.6, 0.7]);
        let intervals = detect_silent_intervals(&chunks, &absolute(0.1), 0.9);
        assert!(intervals.is_empty());
    }

    #[test]
    fn test_spec_scenario_padded_intervals_merge_to_empty() {
        // Chunks [0.01, 0.02, 0.5, 0.6, 0.01] over 0.3s windows with an
        // absolute threshold of 0.1: silence runs at {0,1} and {4}. After
        // 0.31s padding and clipping to [0, 1.5] the intervals overlap and
        // the splitter merges them into one span covering the whole clip.
        let chunks = chunks_from(&[0.01, 0.02, 0.5, 0.6, 0.01]);
        let config = absolute(0.1);
        let duration = 1.5;

        let intervals = detect_silent_intervals(&chunks, &config, duration);
        assert_eq!(intervals.len(), 2);
        assert!((intervals[0].start - 0.0).abs() < 1e-9);
        assert!((intervals[0].end - 0.91).abs() < 1e-9);
        assert!((intervals[1].start - 0.89).abs() < 1e-9);
        assert!((intervals[1].end - 1.5).abs() < 1e-9);

        let segments = split_active_segments(&intervals, duration, config.min_segment_secs);
        assert!(segments.is_empty());
    }

    #[test]
    fn test_trailing_silence_closes_against_series_end() {
        let chunks = chunks_from(&[0.5, 0.5, 0.01, 0.01]);
        let config = SilenceConfig {
            transition_margin: 0.0,
            ..absolute(0.1)
        };
        let intervals = detect_silent_intervals(&chunks, &config, 1.2);

        assert_eq!(intervals.len(), 1);
        assert!((intervals[0].start - 0.6).abs() < 1e-9);
        assert!((intervals[0].end - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_relative_threshold_on_silent_clip_keeps_clip_active() {
        // Global RMS of a silent clip is zero; the resolved threshold must
        // not trigger detection (or divide by zero).
        let chunks = chunks_from(&[0.0, 0.0, 0.0]);
        let config = SilenceConfig::default();
        let intervals = detect_silent_intervals(&chunks, &config, 0.9);
        assert!(intervals.is_empty());
    }

    #[test]
    fn test_relative_threshold_scales_with_loudness() {
        // Same shape, different loudness: relative policy detects the quiet
        // chunk in both.
        for scale in [1.0_f32, 0.1] {
            let chunks = chunks_from(&[0.5 * scale, 0.01 * scale, 0.5 * scale]);
            let config = SilenceConfig {
                transition_margin: 0.0,
                ..SilenceConfig::default()
            };
            let intervals = detect_silent_intervals(&chunks, &config, 0.9);
            assert_eq!(intervals.len(), 1, "scale {scale}");
        }
    }

    #[test]
    fn test_intervals_sorted_by_start() {
        let chunks = chunks_from(&[0.01, 0.5, 0.01, 0.5, 0.01]);
        let config = absolute(0.1);
        let intervals = detect_silent_intervals(&chunks, &config, 1.5);
        for pair in intervals.windows(2) {
            assert!(pair[0].start <= pair[1].start);
        }
    }

    #[test]
    fn test_untouched_analysis() {
        let analysis = ClipAnalysis::untouched(30.0);
        assert_eq!(analysis.segments.len(), 1);
        assert!((analysis.total_active_secs() - 30.0).abs() < 1e-9);
    }
}
