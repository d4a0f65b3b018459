//! Segment extraction and concatenation.
//!
//! # Strategy
//!
//! Segment extraction + concat demuxer:
//! 1. Extract each active segment with its speed/zoom filter applied,
//!    re-encoding for frame-accurate cuts (stream copy cannot cut between
//!    keyframes).
//! 2. Concatenate the parts with the concat demuxer and stream copy.
//!
//! Two-pass seeking is used per segment: a fast input seek lands near the
//! start on a keyframe, then an accurate output seek from that point avoids
//! the duplicate frames keyframe alignment would cause.

use std::path::Path;

use tracing::{debug, info, warn};

use sclip_models::encoding::EncodingConfig;
use sclip_models::timeline::{SegmentPlan, TimeMap, TransformOp};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Video/audio filter pair for one segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentFilter {
    pub video: Option<String>,
    pub audio: Option<String>,
}

/// Interpret a plan's transform ops into FFmpeg filter strings.
///
/// Visual ops (`Zoom`, `Crop`) append to the video chain in op order;
/// `Speed` is applied once at the end of both chains (`setpts` + `atempo`),
/// with the last `Speed` op winning, matching [`SegmentPlan::speed`].
pub fn build_segment_filter(plan: &SegmentPlan, width: u32, height: u32) -> SegmentFilter {
    let mut video_parts: Vec<String> = Vec::new();
    let duration = plan.source.duration();

    for op in &plan.ops {
        match op {
            TransformOp::Zoom(curve) => {
                // Crop a 1/zoom(t) window centered in the frame, then scale
                // back up: zoom > 1 magnifies, zoom < 1 shrinks onto a pad.
                let half = (duration / 2.0).max(1e-6);
                // Commas stay unescaped: the expression sits inside the
                // quoted crop argument below
                let zexpr = format!(
                    "if(lt(t,{half:.4}),{z0:.4}+({z1:.4}-{z0:.4})*t/{half:.4},{z1:.4}+({z2:.4}-{z1:.4})*(t-{half:.4})/{half:.4})",
                    half = half,
                    z0 = curve.start,
                    z1 = curve.mid,
                    z2 = curve.end,
                );
                video_parts.push(format!(
                    "crop=w='floor((iw/({z}))/2)*2':h='floor((ih/({z}))/2)*2'",
                    z = zexpr
                ));
                video_parts.push(format!(
                    "scale={width}:{height}:force_original_aspect_ratio=increase"
                ));
                video_parts.push(format!("crop={width}:{height}"));
            }
            TransformOp::Crop(rect) => {
                let x = (rect.x_center - rect.width as f64 / 2.0).max(0.0);
                let y = (rect.y_center - rect.height as f64 / 2.0).max(0.0);
                video_parts.push(format!(
                    "crop={}:{}:{:.0}:{:.0}",
                    rect.width, rect.height, x, y
                ));
            }
            TransformOp::Speed(_) => {}
        }
    }

    let speed = plan.speed();
    let mut audio = None;
    if (speed - 1.0).abs() > f64::EPSILON {
        video_parts.push(format!("setpts=PTS/{speed}"));
        // atempo supports 0.5..100, well within the configured speed set
        audio = Some(format!("atempo={speed}"));
    }

    SegmentFilter {
        video: if video_parts.is_empty() {
            None
        } else {
            Some(video_parts.join(","))
        },
        audio,
    }
}

/// Extract every planned segment and concatenate them into `output`.
///
/// Returns the [`TimeMap`] describing the layout that was actually
/// rendered: a segment whose extraction fails is retried as an identity
/// transform (speed 1.0, no filters) before giving up, and the map reflects
/// that fallback so captions stay in sync.
pub async fn render_segments(
    input: &Path,
    output: &Path,
    plans: &[SegmentPlan],
    width: u32,
    height: u32,
    encoding: &EncodingConfig,
) -> MediaResult<TimeMap> {
    if plans.is_empty() {
        return Err(MediaError::NoSegments);
    }

    let temp_dir = tempfile::tempdir()?;
    let mut effective_plans: Vec<SegmentPlan> = Vec::with_capacity(plans.len());
    let mut part_paths = Vec::with_capacity(plans.len());

    for (i, plan) in plans.iter().enumerate() {
        let part_path = temp_dir.path().join(format!("seg_{:04}.mp4", i));
        let filter = build_segment_filter(plan, width, height);

        match extract_part(input, &part_path, plan, &filter, encoding).await {
            Ok(()) => effective_plans.push(plan.clone()),
            Err(e) => {
                warn!(
                    segment = i,
                    start = plan.source.start,
                    error = %e,
                    "Segment extraction failed, falling back to identity transform"
                );
                let identity = SegmentPlan::identity(plan.source);
                let filter = build_segment_filter(&identity, width, height);
                extract_part(input, &part_path, &identity, &filter, encoding).await?;
                effective_plans.push(identity);
            }
        }

        part_paths.push(part_path);
    }

    concat_parts(&part_paths, output, temp_dir.path()).await?;

    let map = TimeMap::layout(&effective_plans);
    info!(
        segments = map.segments().len(),
        output_duration = map.output_duration(),
        output = %output.display(),
        "Assembled output timeline"
    );

    Ok(map)
}

/// Extract one segment with its filters applied.
async fn extract_part(
    input: &Path,
    part_path: &Path,
    plan: &SegmentPlan,
    filter: &SegmentFilter,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let start = plan.source.start;
    let duration = plan.source.duration();

    // Fast input seek to get close (keyframe), accurate output seek after
    let fast_seek = if start > 5.0 { start - 5.0 } else { 0.0 };
    let accurate_seek = start - fast_seek;

    debug!(
        start_sec = start,
        duration_sec = duration,
        speed = plan.speed(),
        "Extracting segment"
    );

    let mut cmd = FfmpegCommand::new(input, part_path)
        .seek(fast_seek)
        .seek_output(accurate_seek)
        .duration(duration)
        .output_args(encoding.to_ffmpeg_args())
        .output_arg("-avoid_negative_ts")
        .output_arg("make_zero");

    if let Some(vf) = &filter.video {
        cmd = cmd.video_filter(vf.clone());
    }
    if let Some(af) = &filter.audio {
        cmd = cmd.audio_filter(af.clone());
    }

    FfmpegRunner::new().run(&cmd).await
}

/// Concatenate extracted parts with the concat demuxer and stream copy.
async fn concat_parts(parts: &[std::path::PathBuf], output: &Path, work: &Path) -> MediaResult<()> {
    let concat_list = work.join("concat.txt");
    let list_content: String = parts
        .iter()
        .map(|p| format!("file '{}'\n", p.display()))
        .collect();
    tokio::fs::write(&concat_list, &list_content).await?;

    let cmd = FfmpegCommand::new(&concat_list, output)
        .input_args(["-f", "concat", "-safe", "0"])
        .codec_copy()
        .output_arg("-movflags")
        .output_arg("+faststart");

    FfmpegRunner::new().run(&cmd).await
}
