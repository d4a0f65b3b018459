//! Sidecar transcript JSON schema.
//!
//! Each processed clip carries a `<clip>.json` sidecar holding the word list
//! in the on-disk form `{"transcript": [...], "timings": [[start, end], ...]}`.
//! Reloading the sidecar skips re-transcription on later runs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::word::{round_ms, Word};

#[derive(Debug, Error)]
pub enum SidecarError {
    #[error("transcript has {words} words but {timings} timing pairs")]
    LengthMismatch { words: usize, timings: usize },
}

/// On-disk transcript representation.
///
/// Parallel arrays rather than an array of objects, matching the historical
/// sidecar files already on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SidecarTranscript {
    pub transcript: Vec<String>,
    pub timings: Vec<(f64, f64)>,
}

impl SidecarTranscript {
    /// Build the sidecar form from a word list, rounding times to
    /// millisecond precision so the round-trip is lossless.
    pub fn from_words(words: &[Word]) -> Self {
        Self {
            transcript: words.iter().map(|w| w.text.clone()).collect(),
            timings: words
                .iter()
                .map(|w| (round_ms(w.start), round_ms(w.end)))
                .collect(),
        }
    }

    /// Reassemble the word list, verifying the parallel arrays line up.
    pub fn into_words(self) -> Result<Vec<Word>, SidecarError> {
        if self.transcript.len() != self.timings.len() {
            return Err(SidecarError::LengthMismatch {
                words: self.transcript.len(),
                timings: self.timings.len(),
            });
        }

        Ok(self
            .transcript
            .into_iter()
            .zip(self.timings)
            .map(|(text, (start, end))| Word { text, start, end })
            .collect())
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    /// Caption text as a single space-joined string (metadata prompt input).
    pub fn caption_text(&self) -> String {
        self.transcript.join(" ")
    }
}
