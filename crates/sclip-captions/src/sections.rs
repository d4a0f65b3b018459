//! Grouping remapped words into display sections.
//!
//! Words are grouped into sections of a few words each; a section stays on
//! screen from its first word's start to its last word's end, with each
//! word emphasized during its own window. Sections that would render wider
//! than the allowed fraction of the frame are split at the midpoint,
//! recursively.

use rand::Rng;
use serde::{Deserialize, Serialize};

use sclip_models::word::PlacedWord;

/// Section grouping and layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionConfig {
    /// Minimum words per section.
    pub min_words: usize,
    /// Maximum words per section.
    pub max_words: usize,
    /// Start a new section when the gap between a word's end and the next
    /// word's start exceeds this (seconds).
    pub gap_threshold: f64,
    /// Maximum section width as a fraction of frame width.
    pub max_width_frac: f64,
    /// Font size as a fraction of frame width.
    pub font_size_frac: f64,
    /// Horizontal padding between words in pixels.
    pub padding_px: u32,
    /// Average glyph width as a fraction of font size.
    pub char_width_frac: f64,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            min_words: 3,
            max_words: 5,
            gap_threshold: 0.5,
            max_width_frac: 0.8,
            font_size_frac: 0.05,
            padding_px: 20,
            char_width_frac: 0.6,
        }
    }
}

impl SectionConfig {
    /// Font size in pixels for a given frame width.
    pub fn font_size(&self, frame_width: u32) -> f64 {
        frame_width as f64 * self.font_size_frac
    }
}

/// One on-screen caption section.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionSection {
    pub words: Vec<PlacedWord>,
}

impl CaptionSection {
    /// On-screen lifetime start: the first word's output start.
    pub fn start(&self) -> f64 {
        self.words.first().map(|w| w.output_start).unwrap_or(0.0)
    }

    /// On-screen lifetime end: the last word's output end.
    pub fn end(&self) -> f64 {
        self.words.last().map(|w| w.output_end).unwrap_or(0.0)
    }
}

/// Estimated rendered width of one word in pixels.
pub fn estimate_word_width(text: &str, config: &SectionConfig, frame_width: u32) -> f64 {
    text.chars().count() as f64 * config.font_size(frame_width) * config.char_width_frac
}

/// Estimated rendered width of a word run, including inter-word padding.
pub fn estimate_section_width(
    words: &[PlacedWord],
    config: &SectionConfig,
    frame_width: u32,
) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    let text_width: f64 = words
        .iter()
        .map(|w| estimate_word_width(&w.word.text, config, frame_width))
        .sum();
    text_width + (config.padding_px as f64) * (words.len() - 1) as f64
}

/// Group words into display sections.
///
/// Primary grouping draws a random section size from
/// `[min_words, max_words]` and additionally closes a section early at a
/// timing gap wider than `gap_threshold`. A width pass then splits any
/// section exceeding `max_width_frac` of the frame at its midpoint,
/// recursively.
pub fn group_into_sections<R: Rng>(
    words: &[PlacedWord],
    config: &SectionConfig,
    frame_width: u32,
    rng: &mut R,
) -> Vec<CaptionSection> {
    let mut runs: Vec<Vec<PlacedWord>> = Vec::new();
    let mut current: Vec<PlacedWord> = Vec::new();
    let mut target = rng.random_range(config.min_words..=config.max_words);

    for word in words {
        if let Some(prev) = current.last() {
            let gap = word.output_start - prev.output_end;
            if current.len() >= target || gap > config.gap_threshold {
                runs.push(std::mem::take(&mut current));
                target = rng.random_range(config.min_words..=config.max_words);
            }
        }
        current.push(word.clone());
    }
    if !current.is_empty() {
        runs.push(current);
    }

    let max_px = frame_width as f64 * config.max_width_frac;
    let mut sections = Vec::new();
    for run in runs {
        split_overflowing(run, config, frame_width, max_px, &mut sections);
    }
    sections
}

fn split_overflowing(
    words: Vec<PlacedWord>,
    config: &SectionConfig,
    frame_width: u32,
    max_px: f64,
    out: &mut Vec<CaptionSection>,
) {
    if words.is_empty() {
        return;
    }
    // A single word wider than the budget cannot be split further
    if words.len() == 1 || estimate_section_width(&words, config, frame_width) <= max_px {
        out.push(CaptionSection { words });
        return;
    }

    let mid = words.len() / 2;
    let (left, right) = words.split_at(mid);
    split_overflowing(left.to_vec(), config, frame_width, max_px, out);
    split_overflowing(right.to_vec(), config, frame_width, max_px, out);
}
