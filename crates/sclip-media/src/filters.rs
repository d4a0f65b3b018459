//! FFmpeg video filter definitions.

use std::path::{Path, PathBuf};

use tracing::info;

use sclip_models::encoding::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::probe::probe_video;

/// Portrait (9:16) conversion filter: fit inside 1080x1920 and pad the rest.
pub const FILTER_VERTICAL: &str = concat!(
    "scale=1080:1920:force_original_aspect_ratio=decrease,",
    "pad=1080:1920:(ow-iw)/2:(oh-ih)/2"
);

/// Caption overlay filter for a generated ASS subtitle file.
pub fn subtitles_filter(ass_path: &Path) -> String {
    // The subtitles filter parses ':' and '\' specially inside its argument
    let escaped = ass_path
        .to_string_lossy()
        .replace('\\', "\\\\")
        .replace(':', "\\:");
    format!("subtitles='{}'", escaped)
}

/// Ensure a video is portrait 9:16, converting when needed.
///
/// Already-portrait sources are returned unchanged; the converted file is
/// written to `output` otherwise.
pub async fn ensure_vertical(
    input: &Path,
    output: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<PathBuf> {
    let info = probe_video(input).await?;

    if info.height > info.width {
        return Ok(input.to_path_buf());
    }

    info!(
        input = %input.display(),
        width = info.width,
        height = info.height,
        "Converting to vertical format for upload"
    );

    let cmd = FfmpegCommand::new(input, output)
        .video_filter(FILTER_VERTICAL)
        .output_args(encoding.to_ffmpeg_args());

    FfmpegRunner::new().run(&cmd).await?;
    Ok(output.to_path_buf())
}

/// Burn a subtitle file into a video.
pub async fn burn_subtitles(
    input: &Path,
    output: &Path,
    ass_path: &Path,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let cmd = FfmpegCommand::new(input, output)
        .video_filter(subtitles_filter(ass_path))
        .output_args(encoding.to_ffmpeg_args());

    FfmpegRunner::new().run(&cmd).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_filter_shape() {
        assert!(FILTER_VERTICAL.contains("1080:1920"));
        assert!(FILTER_VERTICAL.contains("pad="));
    }

    #[test]
    fn test_subtitles_filter_escapes_path() {
        let filter = subtitles_filter(Path::new("/tmp/c:lips/words.ass"));
        assert_eq!(filter, "subtitles='/tmp/c\\:lips/words.ass'");
    }
}
