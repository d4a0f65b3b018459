//! Audio extraction for analysis.
//!
//! The energy analyzer works on a mono, downsampled waveform; the original
//! audio keeps full fidelity for the final render. FFmpeg extracts raw
//! `f32le` samples to a scratch file which is deleted with its temp handle.

use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Sample rate used for energy analysis.
pub const ANALYSIS_SAMPLE_RATE: u32 = 22_050;

/// Extract the mono analysis waveform from a video/audio file.
///
/// Returns `NoAudioStream` when the source carries no audio; callers
/// short-circuit to the captionless/unsegmented path in that case.
pub async fn extract_analysis_waveform(input: &Path) -> MediaResult<Vec<f32>> {
    let temp_audio = NamedTempFile::new()?;
    extract_raw_pcm(input, temp_audio.path(), ANALYSIS_SAMPLE_RATE).await?;

    let samples = load_audio_samples(temp_audio.path()).await?;
    if samples.is_empty() {
        return Err(MediaError::NoAudioStream(input.to_path_buf()));
    }

    debug!(
        samples = samples.len(),
        duration_secs = samples.len() as f64 / ANALYSIS_SAMPLE_RATE as f64,
        "Loaded analysis waveform"
    );

    Ok(samples)
}

/// Extract audio from a file to raw mono f32le PCM at the given rate.
async fn extract_raw_pcm(input: &Path, output: &Path, sample_rate: u32) -> MediaResult<()> {
    debug!(
        input = %input.display(),
        output = %output.display(),
        "Extracting audio for analysis"
    );

    let result = tokio::process::Command::new("ffmpeg")
        .args([
            "-y",
            "-hide_banner",
            "-v",
            "error",
            "-i",
            input.to_str().unwrap_or_default(),
            "-vn",
            "-ar",
            &sample_rate.to_string(),
            "-ac",
            "1",
            "-f",
            "f32le",
            output.to_str().unwrap_or_default(),
        ])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::piped())
        .output()
        .await?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr).to_string();
        // FFmpeg fails outright on sources with no audio stream
        if stderr.contains("does not contain any stream")
            || stderr.contains("Output file does not contain any stream")
        {
            return Err(MediaError::NoAudioStream(input.to_path_buf()));
        }
        return Err(MediaError::ffmpeg_failed(
            "Audio extraction failed",
            Some(stderr),
            result.status.code(),
        ));
    }

    let metadata = tokio::fs::metadata(output).await?;
    if metadata.len() == 0 {
        return Err(MediaError::NoAudioStream(input.to_path_buf()));
    }

    Ok(())
}

/// Load raw f32le audio samples from a file.
async fn load_audio_samples(path: &Path) -> MediaResult<Vec<f32>> {
    let bytes = tokio::fs::read(path).await?;

    let samples: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_samples_empty_file() {
        let temp = NamedTempFile::new().unwrap();
        let samples = load_audio_samples(temp.path()).await.unwrap();
        assert!(samples.is_empty());
    }

    #[tokio::test]
    async fn test_load_samples_with_data() {
        let temp = NamedTempFile::new().unwrap();

        let test_samples: Vec<f32> = vec![0.0, 0.5, 1.0, -1.0];
        let bytes: Vec<u8> = test_samples.iter().flat_map(|f| f.to_le_bytes()).collect();

        tokio::fs::write(temp.path(), &bytes).await.unwrap();

        let loaded = load_audio_samples(temp.path()).await.unwrap();
        assert_eq!(loaded.len(), 4);
        assert!((loaded[0] - 0.0).abs() < 0.001);
        assert!((loaded[1] - 0.5).abs() < 0.001);
        assert!((loaded[2] - 1.0).abs() < 0.001);
        assert!((loaded[3] - (-1.0)).abs() < 0.001);
    }
}
