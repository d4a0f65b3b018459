//! Thumbnail generation.

use std::path::Path;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Thumbnail width in pixels; height follows the aspect ratio.
pub const THUMBNAIL_SCALE_WIDTH: u32 = 480;

/// Frame timestamp used for the thumbnail.
pub const THUMBNAIL_TIMESTAMP: &str = "00:00:01";

/// Generate a thumbnail from a video file.
pub async fn generate_thumbnail(
    video_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
) -> MediaResult<()> {
    let filter = format!("scale={}:-2", THUMBNAIL_SCALE_WIDTH);

    let cmd = FfmpegCommand::new(video_path.as_ref(), output_path.as_ref())
        .input_arg("-ss")
        .input_arg(THUMBNAIL_TIMESTAMP)
        .single_frame()
        .video_filter(filter);

    FfmpegRunner::new().run(&cmd).await
}
