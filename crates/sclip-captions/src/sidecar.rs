//! Sidecar transcript persistence.
//!
//! The word list for a clip lives in a JSON sidecar next to the media
//! file. A readable sidecar skips transcription entirely; a malformed one
//! falls back to re-transcription rather than failing the clip.

use std::path::Path;

use tracing::{debug, warn};

use sclip_models::sidecar::SidecarTranscript;
use sclip_models::word::Word;

use crate::error::CaptionResult;

/// Load words from a sidecar file.
///
/// Returns `Ok(None)` when the file is missing, unreadable JSON, or
/// internally inconsistent; only genuine IO errors propagate.
pub async fn load_sidecar(path: &Path) -> CaptionResult<Option<Vec<Word>>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = tokio::fs::read_to_string(path).await?;

    let transcript: SidecarTranscript = match serde_json::from_str(&content) {
        Ok(t) => t,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Malformed sidecar, re-transcribing");
            return Ok(None);
        }
    };

    match transcript.into_words() {
        Ok(words) => {
            debug!(path = %path.display(), words = words.len(), "Loaded sidecar transcript");
            Ok(Some(words))
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Inconsistent sidecar, re-transcribing");
            Ok(None)
        }
    }
}

/// Write a word list to a sidecar file.
pub async fn save_sidecar(path: &Path, words: &[Word]) -> CaptionResult<()> {
    let transcript = SidecarTranscript::from_words(words);
    let json = serde_json::to_string_pretty(&transcript)?;
    tokio::fs::write(path, json).await?;
    debug!(path = %path.display(), words = words.len(), "Wrote sidecar transcript");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("0.json");
        let words = vec![Word::new("hello", 0.1, 0.5), Word::new("world", 0.5, 1.0)];

        save_sidecar(&path, &words).await.unwrap();
        let loaded = load_sidecar(&path).await.unwrap().unwrap();
        assert_eq!(loaded, words);
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let loaded = load_sidecar(&dir.path().join("absent.json")).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_malformed_json_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let loaded = load_sidecar(&path).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_inconsistent_sidecar_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("odd.json");
        tokio::fs::write(&path, r#"{"transcript": ["a", "b"], "timings": [[0.0, 0.5]]}"#)
            .await
            .unwrap();

        let loaded = load_sidecar(&path).await.unwrap();
        assert!(loaded.is_none());
    }
}
