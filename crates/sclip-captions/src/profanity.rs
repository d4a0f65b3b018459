//! Profanity censoring.
//!
//! Denylisted words are replaced by the bleep marker before layout, so the
//! literal word never reaches the renderer, and each censored word's output
//! time range is scheduled as an audio bleep.

use std::collections::HashSet;

use sclip_models::word::PlacedWord;

/// Marker substituted for a censored word.
pub const BLEEP_MARKER: &str = "[BLEEP]";

/// Default denylist, matching the historical configuration.
pub const DEFAULT_CURSE_WORDS: &[&str] = &["fuck", "shit", "damn", "bitch", "ass", "hell"];

/// Fixed-denylist profanity filter.
#[derive(Debug, Clone)]
pub struct ProfanityFilter {
    words: HashSet<String>,
}

impl Default for ProfanityFilter {
    fn default() -> Self {
        Self::new(DEFAULT_CURSE_WORDS.iter().map(|w| w.to_string()))
    }
}

impl ProfanityFilter {
    pub fn new(words: impl IntoIterator<Item = String>) -> Self {
        Self {
            words: words.into_iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    /// Case-insensitive membership test, ignoring surrounding punctuation.
    pub fn is_curse(&self, text: &str) -> bool {
        let normalized = text
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        self.words.contains(&normalized)
    }

    /// Replace denylisted words with the bleep marker and collect the
    /// output time ranges needing an audio bleep.
    pub fn censor(&self, words: &[PlacedWord]) -> (Vec<PlacedWord>, Vec<(f64, f64)>) {
        let mut censored = Vec::with_capacity(words.len());
        let mut bleeps = Vec::new();

        for placed in words {
            if self.is_curse(&placed.word.text) {
                bleeps.push((placed.output_start, placed.output_end));
                let mut bleeped = placed.clone();
                bleeped.word.text = BLEEP_MARKER.to_string();
                censored.push(bleeped);
            } else {
                censored.push(placed.clone());
            }
        }

        (censored, bleeps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sclip_models::word::Word;

    fn placed(text: &str, start: f64, end: f64) -> PlacedWord {
        PlacedWord {
            word: Word::new(text, start, end),
            output_start: start,
            output_end: end,
        }
    }

    #[test]
    fn test_censor_replaces_text_and_schedules_bleep() {
        let filter = ProfanityFilter::default();
        let words = vec![placed("well", 0.0, 0.4), placed("damn", 0.4, 0.8)];

        let (censored, bleeps) = filter.censor(&words);

        assert_eq!(censored[0].word.text, "well");
        assert_eq!(censored[1].word.text, BLEEP_MARKER);
        assert_eq!(bleeps, vec![(0.4, 0.8)]);
    }

    #[test]
    fn test_matching_ignores_case_and_punctuation() {
        let filter = ProfanityFilter::default();
        assert!(filter.is_curse("Damn!"));
        assert!(filter.is_curse("SHIT,"));
        assert!(!filter.is_curse("assist"));
        assert!(!filter.is_curse("hello"));
    }

    #[test]
    fn test_clean_input_schedules_nothing() {
        let filter = ProfanityFilter::default();
        let words = vec![placed("all", 0.0, 0.3), placed("good", 0.3, 0.6)];

        let (censored, bleeps) = filter.censor(&words);
        assert_eq!(censored.len(), 2);
        assert!(bleeps.is_empty());
    }
}
