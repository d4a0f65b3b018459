//! Background music and bleep-tone mixing.
//!
//! The assembled clip's dialogue stays at full volume; an optional music
//! bed is looped underneath at a configured volume, and a sine tone is
//! mixed in over each censored word's output time range.

use std::path::Path;
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};

/// Audio mixing configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MixConfig {
    /// Background music volume (0.0 - 1.0).
    pub music_volume: f64,
    /// Bleep tone frequency in Hz.
    pub bleep_frequency: u32,
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            music_volume: 0.2,
            bleep_frequency: 1000,
        }
    }
}

/// Build the `filter_complex` graph for the mix.
///
/// Input layout: `0` is the clip, `1` is the music bed when present, and
/// one lavfi sine input per bleep follows. `duration=first` pins the mix
/// to the clip's length so the looped music bed cannot extend the output.
pub fn build_mix_graph(has_music: bool, config: &MixConfig, bleeps: &[(f64, f64)]) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut mix_labels = vec!["[0:a]".to_string()];

    let mut next_input = 1;
    if has_music {
        parts.push(format!(
            "[{next_input}:a]volume={:.2}[music]",
            config.music_volume
        ));
        mix_labels.push("[music]".to_string());
        next_input += 1;
    }

    for (i, (start, _end)) in bleeps.iter().enumerate() {
        let delay_ms = (start * 1000.0).round() as u64;
        parts.push(format!(
            "[{input}:a]adelay={delay_ms}|{delay_ms}[bleep{i}]",
            input = next_input + i
        ));
        mix_labels.push(format!("[bleep{i}]"));
    }

    parts.push(format!(
        "{}amix=inputs={}:duration=first:normalize=0[aout]",
        mix_labels.concat(),
        mix_labels.len()
    ));

    parts.join(";")
}

/// Mix music and bleep tones into `input`, writing `output`.
///
/// Video is stream-copied; only audio is re-encoded. With neither music
/// nor bleeps the streams are copied unchanged.
pub async fn mix_audio(
    input: &Path,
    output: &Path,
    music: Option<&Path>,
    bleeps: &[(f64, f64)],
    config: &MixConfig,
) -> MediaResult<()> {
    if music.is_none() && bleeps.is_empty() {
        let cmd = crate::command::FfmpegCommand::new(input, output).codec_copy();
        return crate::command::FfmpegRunner::new().run(&cmd).await;
    }

    let graph = build_mix_graph(music.is_some(), config, bleeps);
    debug!(graph = %graph, "Built audio mix graph");

    let mut args: Vec<String> = vec![
        "-y".into(),
        "-hide_banner".into(),
        "-v".into(),
        "error".into(),
        "-i".into(),
        input.to_string_lossy().into_owned(),
    ];

    if let Some(music_path) = music {
        args.extend([
            "-stream_loop".into(),
            "-1".into(),
            "-i".into(),
            music_path.to_string_lossy().into_owned(),
        ]);
    }

    for (start, end) in bleeps {
        args.extend([
            "-f".into(),
            "lavfi".into(),
            "-t".into(),
            format!("{:.3}", (end - start).max(0.05)),
            "-i".into(),
            format!("sine=frequency={}", config.bleep_frequency),
        ]);
    }

    args.extend([
        "-filter_complex".into(),
        graph,
        "-map".into(),
        "0:v".into(),
        "-map".into(),
        "[aout]".into(),
        "-c:v".into(),
        "copy".into(),
        "-c:a".into(),
        "aac".into(),
        "-b:a".into(),
        "128k".into(),
        output.to_string_lossy().into_owned(),
    ]);

    let result = tokio::process::Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr).to_string();
        return Err(MediaError::ffmpeg_failed(
            "Audio mix failed",
            Some(stderr),
            result.status.code(),
        ));
    }

    info!(
        bleeps = bleeps.len(),
        music = music.is_some(),
        output = %output.display(),
        "Audio mix complete"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_music_only() {
        let graph = build_mix_graph(true, &MixConfig::default(), &[]);
        assert_eq!(
            graph,
            "[1:a]volume=0.20[music];[0:a][music]amix=inputs=2:duration=first:normalize=0[aout]"
        );
    }

    #[test]
    fn test_graph_bleeps_only() {
        let graph = build_mix_graph(false, &MixConfig::default(), &[(4.5, 4.75)]);
        assert_eq!(
            graph,
            "[1:a]adelay=4500|4500[bleep0];[0:a][bleep0]amix=inputs=2:duration=first:normalize=0[aout]"
        );
    }

    #[test]
    fn test_graph_music_and_bleeps() {
        let graph = build_mix_graph(true, &MixConfig::default(), &[(1.0, 1.2), (2.0, 2.3)]);
        // Bleep inputs start after the music input
        assert!(graph.contains("[2:a]adelay=1000|1000[bleep0]"));
        assert!(graph.contains("[3:a]adelay=2000|2000[bleep1]"));
        assert!(graph.contains("amix=inputs=4"));
    }
}
