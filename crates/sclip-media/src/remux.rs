//! Lossless MKV to MP4 remuxing.
//!
//! Downloaded sources often arrive as MKV; the pipeline wants MP4 input.
//! Remuxing copies video and audio streams and drops subtitle streams,
//! which MP4 frequently cannot carry.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Remux one MKV file into a sibling MP4 (same stem).
pub async fn remux_mkv_to_mp4(input: &Path) -> MediaResult<PathBuf> {
    let output = input.with_extension("mp4");

    info!(
        input = %input.display(),
        output = %output.display(),
        "Remuxing MKV to MP4"
    );

    let cmd = FfmpegCommand::new(input, &output)
        .output_args(["-map", "0:v", "-map", "0:a"])
        .codec_copy()
        // MP4 cannot hold most MKV subtitle codecs
        .output_arg("-sn");

    FfmpegRunner::new().run(&cmd).await?;
    Ok(output)
}

/// Walk `root` up to `max_depth` levels and remux every `.mkv` that does
/// not already have a same-named `.mp4` beside it.
///
/// Per-file failures are logged and skipped; the sweep continues.
pub async fn remux_sweep(root: &Path, max_depth: usize) -> MediaResult<Vec<PathBuf>> {
    let candidates = collect_mkv_files(root, max_depth)?;
    let mut remuxed = Vec::new();

    for mkv in candidates {
        let mp4 = mkv.with_extension("mp4");
        if mp4.exists() {
            continue;
        }
        match remux_mkv_to_mp4(&mkv).await {
            Ok(out) => remuxed.push(out),
            Err(e) => warn!(path = %mkv.display(), error = %e, "Remux failed, skipping"),
        }
    }

    Ok(remuxed)
}

fn collect_mkv_files(dir: &Path, depth_left: usize) -> MediaResult<Vec<PathBuf>> {
    let mut out = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            if depth_left > 0 {
                out.extend(collect_mkv_files(&path, depth_left - 1)?);
            }
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("mkv"))
        {
            out.push(path);
        }
    }

    Ok(out)
}
