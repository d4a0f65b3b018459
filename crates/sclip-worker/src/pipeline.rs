//! Single-clip processing pipeline.
//!
//! One clip runs start to finish before the next begins:
//!
//! ```text
//! source ──► extract window ──► silence analysis ──► plan + render cuts
//!                 │                                        │
//!                 ▼                                        ▼
//!            transcript ────► remap words ────► captions + bleeps
//!                                                          │
//!                                                          ▼
//!                                         music/bleep mix ──► final clip
//!                                                          │
//!                                                          ▼
//!                                              metadata + thumbnail
//! ```
//!
//! Degradations are local where possible: no audio track means no captions
//! and no music but still a finished clip; an empty active-segment result
//! falls back to the untouched extract; a missing metadata key just skips
//! metadata generation.

use std::path::{Path, PathBuf};

use rand::SeedableRng;
use tracing::{info, warn};

use sclip_captions::{
    group_into_sections, load_or_transcribe, remap_words, render_ass, ProfanityFilter,
};
use sclip_media::{
    analyze_clip, burn_subtitles, extract_random_window, extract_window, generate_thumbnail,
    mix_audio, next_clip_index, plan_segments, probe_video, render_segments, ClipAnalysis,
    ExtractedWindow, MediaError,
};
use sclip_models::timeline::{SegmentPlan, TimeMap};
use sclip_models::word::{sanitize_words, PlacedWord, RemappedWord};
use sclip_publish::GeminiClient;

use crate::config::PipelineConfig;
use crate::error::WorkerResult;

/// All files belonging to one numbered clip.
#[derive(Debug, Clone)]
pub struct ClipPaths {
    pub index: u32,
    /// Raw extracted window.
    pub clip: PathBuf,
    /// Assembled clip after cuts and speed changes.
    pub cut: PathBuf,
    /// Assembled clip with captions burned in.
    pub captioned: PathBuf,
    /// Finished clip.
    pub final_clip: PathBuf,
    /// Transcript sidecar.
    pub sidecar: PathBuf,
    /// Generated subtitle file.
    pub subtitles: PathBuf,
    /// Censored caption text (metadata prompt input).
    pub captions_txt: PathBuf,
    /// Generated upload metadata.
    pub metadata: PathBuf,
    /// Thumbnail for upload.
    pub thumbnail: PathBuf,
}

impl ClipPaths {
    pub fn new(dir: &Path, index: u32) -> Self {
        let p = |suffix: &str| dir.join(format!("{index}{suffix}"));
        Self {
            index,
            clip: p("_clip.mp4"),
            cut: p("_cut.mp4"),
            captioned: p("_captioned.mp4"),
            final_clip: p("_final.mp4"),
            sidecar: p(".json"),
            subtitles: p(".ass"),
            captions_txt: p("_captions.txt"),
            metadata: p("_short_metadata.json"),
            thumbnail: p("_final.jpg"),
        }
    }
}

/// Result of processing one clip.
#[derive(Debug, Clone)]
pub struct ClipOutcome {
    pub index: u32,
    pub final_path: PathBuf,
    /// Words that survived remapping (0 for captionless clips).
    pub word_count: usize,
    pub output_duration: f64,
}

/// Process one source video into a finished clip.
///
/// `window` pins the extraction window for deterministic runs; `None`
/// draws a random one.
pub async fn process_clip(
    source: &Path,
    output_dir: &Path,
    window: Option<ExtractedWindow>,
    config: &PipelineConfig,
) -> WorkerResult<ClipOutcome> {
    let index = next_clip_index(output_dir)?;
    let paths = ClipPaths::new(output_dir, index);
    info!(index, source = %source.display(), "Processing clip");

    // 1. Cut a window out of the source
    // StdRng rather than ThreadRng keeps the future Send
    let mut rng = rand::rngs::StdRng::from_os_rng();
    match window {
        Some(w) => extract_window(source, &paths.clip, w, &config.encoding).await?,
        None => {
            extract_random_window(source, &paths.clip, &config.extract, &config.encoding, &mut rng)
                .await?;
        }
    }

    let clip_info = probe_video(&paths.clip).await?;

    // 2. Silence analysis; a source without audio degrades to the
    //    captionless path with the clip untouched
    let (analysis, has_audio) = match analyze_clip(&paths.clip, &config.silence).await {
        Ok(analysis) => (analysis, true),
        Err(MediaError::NoAudioStream(_)) => {
            warn!(index, "No audio track; skipping segmentation and captions");
            (ClipAnalysis::untouched(clip_info.duration), false)
        }
        Err(e) => return Err(e.into()),
    };

    // 3. Transform and assemble
    let time_map = if analysis.segments.is_empty() {
        warn!(index, "No active segments survived; keeping clip untouched");
        tokio::fs::copy(&paths.clip, &paths.cut).await?;
        TimeMap::layout(&[SegmentPlan::identity(
            ClipAnalysis::untouched(clip_info.duration).segments[0],
        )])
    } else if has_audio {
        let plans = plan_segments(&analysis.segments, &config.plan, &mut rng);
        render_segments(
            &paths.clip,
            &paths.cut,
            &plans,
            clip_info.width,
            clip_info.height,
            &config.encoding,
        )
        .await?
    } else {
        tokio::fs::copy(&paths.clip, &paths.cut).await?;
        TimeMap::layout(&[SegmentPlan::identity(analysis.segments[0])])
    };

    // 4. Captions
    let words = if has_audio {
        load_or_transcribe(&paths.clip, &paths.sidecar).await?
    } else {
        None
    };

    let mut caption_text = String::new();
    let mut bleeps: Vec<(f64, f64)> = Vec::new();
    let mut word_count = 0;

    let render_input = if let Some(words) = words {
        let words = sanitize_words(words);
        let remapped = remap_words(&words, &time_map);
        let placed: Vec<PlacedWord> =
            remapped.iter().filter_map(|r| r.placed().cloned()).collect();
        let dropped = remapped
            .iter()
            .filter(|r| matches!(r, RemappedWord::Dropped(_)))
            .count();
        info!(index, placed = placed.len(), dropped, "Remapped caption timings");

        let filter = ProfanityFilter::default();
        let (censored, scheduled) = filter.censor(&placed);
        bleeps = scheduled;
        word_count = censored.len();

        caption_text = censored
            .iter()
            .map(|w| w.word.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        tokio::fs::write(&paths.captions_txt, &caption_text).await?;

        let sections =
            group_into_sections(&censored, &config.sections, clip_info.width, &mut rng);
        let ass = render_ass(
            &sections,
            clip_info.width,
            clip_info.height,
            &config.sections,
            &config.captions,
        );
        tokio::fs::write(&paths.subtitles, ass).await?;

        burn_subtitles(&paths.cut, &paths.captioned, &paths.subtitles, &config.encoding).await?;
        paths.captioned.clone()
    } else {
        paths.cut.clone()
    };

    // 5. Music and bleep mix (musicless when the source had no audio)
    if has_audio {
        mix_audio(
            &render_input,
            &paths.final_clip,
            config.music_file.as_deref(),
            &bleeps,
            &config.mix,
        )
        .await?;
    } else {
        tokio::fs::copy(&render_input, &paths.final_clip).await?;
    }

    // 6. Upload metadata (skipped without an API key)
    if !caption_text.is_empty() {
        match GeminiClient::new() {
            Ok(client) => {
                let title_hint = if config.title_hint.is_empty() {
                    source
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default()
                } else {
                    config.title_hint.clone()
                };
                match client
                    .generate_metadata(&caption_text, &title_hint, output_dir)
                    .await
                {
                    Ok(metadata) => {
                        let json = serde_json::to_string_pretty(&metadata)?;
                        tokio::fs::write(&paths.metadata, json).await?;
                    }
                    Err(e) => warn!(index, error = %e, "Metadata generation failed"),
                }
            }
            Err(e) => info!(index, reason = %e, "Skipping metadata generation"),
        }
    }

    // 7. Thumbnail, best effort
    if let Err(e) = generate_thumbnail(&paths.final_clip, &paths.thumbnail).await {
        warn!(index, error = %e, "Thumbnail generation failed");
    }

    cleanup_intermediates(&paths).await;

    let outcome = ClipOutcome {
        index,
        final_path: paths.final_clip.clone(),
        word_count,
        output_duration: time_map.output_duration(),
    };
    info!(
        index,
        final_path = %outcome.final_path.display(),
        words = outcome.word_count,
        duration = outcome.output_duration,
        "Clip finished"
    );
    Ok(outcome)
}

/// Remove intermediate render files, keeping the raw extract (for
/// re-transcription) and everything the uploader needs.
async fn cleanup_intermediates(paths: &ClipPaths) {
    for path in [&paths.cut, &paths.captioned] {
        if path.exists() && *path != paths.final_clip {
            if let Err(e) = tokio::fs::remove_file(path).await {
                warn!(path = %path.display(), error = %e, "Failed to remove intermediate");
            }
        }
    }
}
