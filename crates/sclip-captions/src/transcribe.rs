//! Transcript acquisition.
//!
//! Resolution order for a clip's word list:
//! 1. the JSON sidecar next to the clip (fastest, survives re-runs)
//! 2. an embedded subtitle track, extracted to WebVTT and flattened
//! 3. nothing — the clip proceeds captionless
//!
//! The speech recognizer itself is an external collaborator; anything that
//! can produce the sidecar format plugs in upstream of this module.

use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use sclip_media::probe::probe_video;
use sclip_models::word::Word;

use crate::error::{CaptionError, CaptionResult};
use crate::sidecar::{load_sidecar, save_sidecar};
use crate::vtt::parse_vtt;

/// Resolve the word list for a clip, persisting newly transcribed words
/// back to the sidecar.
///
/// `Ok(None)` means no transcript could be obtained; the pipeline renders
/// the clip without captions in that case.
pub async fn load_or_transcribe(
    clip_path: &Path,
    sidecar_path: &Path,
) -> CaptionResult<Option<Vec<Word>>> {
    if let Some(words) = load_sidecar(sidecar_path).await? {
        return Ok(Some(words));
    }

    match transcribe_from_subtitles(clip_path).await {
        Ok(words) if words.is_empty() => {
            warn!(clip = %clip_path.display(), "Subtitle track was empty");
            Ok(None)
        }
        Ok(words) => {
            save_sidecar(sidecar_path, &words).await?;
            Ok(Some(words))
        }
        Err(CaptionError::NoSubtitles(_)) => {
            info!(clip = %clip_path.display(), "No transcript source, continuing captionless");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Extract the first embedded subtitle track and flatten it to words.
pub async fn transcribe_from_subtitles(clip_path: &Path) -> CaptionResult<Vec<Word>> {
    let info = probe_video(clip_path).await?;
    if !info.has_subtitles {
        return Err(CaptionError::NoSubtitles(clip_path.to_path_buf()));
    }

    let temp_vtt = NamedTempFile::with_suffix(".vtt")?;
    extract_subtitles_to_vtt(clip_path, temp_vtt.path()).await?;

    let content = tokio::fs::read_to_string(temp_vtt.path()).await?;
    let words = parse_vtt(&content);

    debug!(
        clip = %clip_path.display(),
        words = words.len(),
        "Transcribed from embedded subtitles"
    );

    Ok(words)
}

/// Extract the first subtitle stream to a WebVTT file.
async fn extract_subtitles_to_vtt(input: &Path, output: &Path) -> CaptionResult<()> {
    let result = tokio::process::Command::new("ffmpeg")
        .args([
            "-y",
            "-hide_banner",
            "-v",
            "error",
            "-i",
            input.to_str().unwrap_or_default(),
            "-map",
            "0:s:0",
            "-f",
            "webvtt",
            output.to_str().unwrap_or_default(),
        ])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::piped())
        .output()
        .await?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(CaptionError::ExtractionFailed(
            stderr.lines().last().unwrap_or("unknown error").to_string(),
        ));
    }

    Ok(())
}
