//! Word-level caption timing.

use serde::{Deserialize, Serialize};

use crate::timeline::TimeMap;

/// Minimum rendered duration for a word (seconds).
///
/// Transcription engines occasionally emit zero-length or overlapping word
/// timings; sanitization stretches those to this floor.
pub const MIN_WORD_DURATION_SECS: f64 = 0.1;

/// One transcribed word on the original timeline.
///
/// Invariants after [`sanitize_words`]: starts are non-decreasing,
/// `end > start`, and both are rounded to millisecond precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl Word {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A word placed on the output timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedWord {
    pub word: Word,
    pub output_start: f64,
    pub output_end: f64,
}

/// Result of remapping one word through a [`TimeMap`].
#[derive(Debug, Clone, PartialEq)]
pub enum RemappedWord {
    /// The word survived the cuts and has an output-timeline position.
    Placed(PlacedWord),
    /// The word's start fell inside removed silence or a dropped
    /// micro-segment; it never appears in rendered output.
    Dropped(Word),
}

impl RemappedWord {
    pub fn placed(&self) -> Option<&PlacedWord> {
        match self {
            RemappedWord::Placed(p) => Some(p),
            RemappedWord::Dropped(_) => None,
        }
    }
}

/// Remap words from the original timeline onto the output timeline.
///
/// A word is anchored by its start: if the start lies in an active segment
/// the word is placed there (end clamped to the segment boundary), otherwise
/// it is dropped. Surviving words keep their relative order because segments
/// are ordered and speed factors are positive.
pub fn remap_words(words: &[Word], map: &TimeMap) -> Vec<RemappedWord> {
    words
        .iter()
        .map(|word| match map.map_span(word.start, word.end) {
            Some((output_start, output_end)) => RemappedWord::Placed(PlacedWord {
                word: word.clone(),
                output_start,
                output_end,
            }),
            None => RemappedWord::Dropped(word.clone()),
        })
        .collect()
}

/// Round a time to millisecond precision.
pub fn round_ms(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}

/// Enforce the transcription timing contract on a raw word list.
///
/// - starts clamped to the previous word's end (no overlaps)
/// - `end > start` with at least [`MIN_WORD_DURATION_SECS`]
/// - all times rounded to milliseconds
pub fn sanitize_words(words: impl IntoIterator<Item = Word>) -> Vec<Word> {
    let mut out: Vec<Word> = Vec::new();
    let mut last_end = 0.0_f64;

    for word in words {
        let mut start = round_ms(word.start);
        if start < last_end {
            start = last_end;
        }
        let mut end = round_ms(word.end);
        if end <= start {
            end = round_ms(start + MIN_WORD_DURATION_SECS);
        }
        last_end = end;
        out.push(Word {
            text: word.text,
            start,
            end,
        });
    }

    out
}
