//! Batch mass-production and batch upload.
//!
//! Input folders matching `^[A-Z].*Input$` under a root are scanned for
//! new `.mp4` sources; each folder keeps a `processed_clips.txt` record so
//! re-runs only pick up new material. Clips are processed strictly
//! sequentially; per-clip failures are logged and the loop continues.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use rand::prelude::IndexedRandom;
use rand::SeedableRng;
use regex::Regex;
use tracing::{error, info, warn};

use sclip_media::ensure_vertical;
use sclip_models::metadata::ShortMetadata;
use sclip_publish::{load_upload_record, save_upload_record, YouTubeClient};

use crate::config::PipelineConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::pipeline::process_clip;

/// Per-folder record of already-processed source files.
const RECORD_FILENAME: &str = "processed_clips.txt";

/// Summary of one batch run.
#[derive(Debug, Default, Clone)]
pub struct BatchReport {
    pub folders: usize,
    pub processed: usize,
    pub failed: usize,
}

/// Find input folders under `root` (uppercase-prefixed, `Input`-suffixed).
pub fn find_input_folders(root: &Path) -> WorkerResult<Vec<PathBuf>> {
    let pattern = Regex::new(r"^[A-Z].*Input$").expect("static regex");
    let mut folders = Vec::new();

    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if pattern.is_match(name) {
                folders.push(path);
            }
        }
    }

    folders.sort();
    Ok(folders)
}

fn load_processed(record_path: &Path) -> WorkerResult<BTreeSet<String>> {
    if !record_path.exists() {
        return Ok(BTreeSet::new());
    }
    let content = std::fs::read_to_string(record_path)?;
    Ok(content.lines().map(|l| l.trim().to_string()).collect())
}

fn append_processed(record_path: &Path, entry: &str) -> WorkerResult<()> {
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(record_path)?;
    writeln!(file, "{entry}")?;
    Ok(())
}

/// Process every new source video under every input folder.
pub async fn run_batch(
    input_root: &Path,
    output_root: &Path,
    config: &PipelineConfig,
) -> WorkerResult<BatchReport> {
    std::fs::create_dir_all(output_root)?;

    let folders = find_input_folders(input_root)?;
    let mut report = BatchReport {
        folders: folders.len(),
        ..Default::default()
    };

    for folder in &folders {
        let record_path = folder.join(RECORD_FILENAME);
        let processed = load_processed(&record_path)?;

        let mut candidates: Vec<PathBuf> = std::fs::read_dir(folder)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("mp4"))
            })
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| !processed.contains(n))
            })
            .collect();
        candidates.sort();

        if candidates.is_empty() {
            info!(folder = %folder.display(), "No new files");
            continue;
        }

        let folder_name = folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let out_folder = output_root.join(&folder_name);

        for source in candidates {
            match process_clip(&source, &out_folder, None, config).await {
                Ok(outcome) => {
                    report.processed += 1;
                    if let Some(name) = source.file_name().and_then(|n| n.to_str()) {
                        append_processed(&record_path, name)?;
                    }
                    info!(
                        source = %source.display(),
                        clip = %outcome.final_path.display(),
                        "Batch clip done"
                    );
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    report.failed += 1;
                    error!(source = %source.display(), error = %e, "Batch clip failed, continuing");
                }
            }
        }
    }

    Ok(report)
}

/// Upload up to `count` finished clips from a clips directory, recording
/// uploads in `uploaded.json` so nothing goes out twice.
pub async fn run_batch_upload(
    clips_dir: &Path,
    count: usize,
    config: &PipelineConfig,
) -> WorkerResult<usize> {
    let record_path = clips_dir.join("uploaded.json");
    let mut uploaded = load_upload_record(&record_path).await?;

    // Gather <subfolder>/<index>_final.mp4 candidates
    let mut candidates: Vec<(String, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(clips_dir)? {
        let entry = entry?;
        let sub = entry.path();
        if !sub.is_dir() {
            continue;
        }
        let sub_name = entry.file_name().to_string_lossy().into_owned();

        for file in std::fs::read_dir(&sub)? {
            let file = file?;
            let path = file.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(index) = name.strip_suffix("_final.mp4") {
                candidates.push((format!("{sub_name}/{index}"), path));
            }
        }
    }

    let remaining: Vec<(String, PathBuf)> = candidates
        .into_iter()
        .filter(|(key, _)| !uploaded.contains(key))
        .collect();

    if remaining.is_empty() {
        info!("No new videos to upload");
        return Ok(0);
    }

    let mut rng = rand::rngs::StdRng::from_os_rng();
    let picked: Vec<(String, PathBuf)> = remaining
        .choose_multiple(&mut rng, count.min(remaining.len()))
        .cloned()
        .collect();

    let client = YouTubeClient::new(&config.token_path);
    let mut sent = 0;

    for (key, final_path) in &picked {
        let metadata_path = final_path
            .to_string_lossy()
            .replace("_final.mp4", "_short_metadata.json");
        let metadata_path = Path::new(&metadata_path);
        if !metadata_path.exists() {
            warn!(key = %key, "Missing metadata sidecar, skipping upload");
            continue;
        }
        let metadata: ShortMetadata =
            serde_json::from_str(&std::fs::read_to_string(metadata_path)?)?;

        let vertical_path = final_path.with_file_name(
            final_path
                .file_name()
                .map(|n| n.to_string_lossy().replace("_final.mp4", "_final_vertical.mp4"))
                .ok_or_else(|| WorkerError::processing_failed("bad clip path"))?,
        );
        let upload_path = ensure_vertical(final_path, &vertical_path, &config.encoding).await?;

        let thumbnail = final_path.with_extension("jpg");
        let thumbnail = thumbnail.exists().then_some(thumbnail.as_path());

        let video_id = client.upload_video(&upload_path, &metadata, thumbnail).await?;
        info!(key = %key, video_id = %video_id, "Uploaded clip");

        uploaded.insert(key.clone());
        save_upload_record(&record_path, &uploaded).await?;
        sent += 1;
    }

    Ok(sent)
}
