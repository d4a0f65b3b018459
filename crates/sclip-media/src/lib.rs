//! FFmpeg CLI wrapper for the ShortClip pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building and running
//! - FFprobe inspection (duration, streams, dimensions)
//! - Audio energy analysis and silence detection
//! - Segment transform planning and filter interpretation
//! - Segment extraction + concat assembly
//! - Music/bleep mixing, remuxing, thumbnails, and output-dir bookkeeping

pub mod audio;
pub mod command;
pub mod energy;
pub mod error;
pub mod extract;
pub mod filters;
pub mod fs_utils;
pub mod mix;
pub mod plan;
pub mod probe;
pub mod remux;
pub mod render;
pub mod silence;
pub mod thumbnail;

pub use audio::{extract_analysis_waveform, ANALYSIS_SAMPLE_RATE};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use energy::{compute_energy_chunks, global_rms, EnergyChunk};
pub use error::{MediaError, MediaResult};
pub use extract::{choose_window, extract_random_window, extract_window, ExtractConfig, ExtractedWindow};
pub use filters::{burn_subtitles, ensure_vertical, subtitles_filter, FILTER_VERTICAL};
pub use fs_utils::next_clip_index;
pub use mix::{build_mix_graph, mix_audio, MixConfig};
pub use plan::{plan_segments, PlanConfig};
pub use probe::{get_duration, probe_video, VideoInfo};
pub use remux::{remux_mkv_to_mp4, remux_sweep};
pub use render::{build_segment_filter, render_segments, SegmentFilter};
pub use silence::{analyze_clip, detect_silent_intervals, ClipAnalysis, SilenceConfig, SilenceThreshold};
pub use thumbnail::generate_thumbnail;
