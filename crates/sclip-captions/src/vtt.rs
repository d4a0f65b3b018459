//! WebVTT cue parsing into word timings.
//!
//! Embedded subtitle tracks are extracted to VTT and flattened into the
//! word list: every word in a cue inherits the cue's time range, and the
//! downstream sanitization pass staggers overlaps and enforces the minimum
//! word duration.

use regex::Regex;

use sclip_models::word::{sanitize_words, Word};

/// Parse VTT content into a sanitized word list.
pub fn parse_vtt(content: &str) -> Vec<Word> {
    let cue_pattern =
        Regex::new(r"((?:\d{2}:)?\d{2}:\d{2}\.\d{3})\s*-->\s*((?:\d{2}:)?\d{2}:\d{2}\.\d{3})")
            .expect("static regex");
    let tag_pattern = Regex::new(r"<[^>]+>").expect("static regex");

    let mut words = Vec::new();
    let mut current_cue: Option<(f64, f64)> = None;
    let mut last_text = String::new();

    for line in content.lines() {
        let line = tag_pattern.replace_all(line.trim(), "").to_string();

        if line.is_empty() || line == "WEBVTT" {
            continue;
        }

        if let Some(caps) = cue_pattern.captures(&line) {
            let start = parse_vtt_timestamp(&caps[1]);
            let end = parse_vtt_timestamp(&caps[2]);
            current_cue = match (start, end) {
                (Some(s), Some(e)) if e > s => Some((s, e)),
                _ => None,
            };
            continue;
        }

        // Cue sequence numbers
        if line.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }

        let Some((start, end)) = current_cue else {
            continue;
        };

        // De-duplicate rolling captions repeating the previous line
        if line == last_text {
            continue;
        }
        last_text = line.clone();

        for raw in line.split_whitespace() {
            let cleaned: String = raw
                .trim_matches(|c: char| ".,!?()[]{}\":;".contains(c))
                .to_lowercase();
            if !cleaned.is_empty() {
                words.push(Word::new(cleaned, start, end));
            }
        }
    }

    sanitize_words(words)
}

/// Parse a VTT timestamp (`HH:MM:SS.mmm` or `MM:SS.mmm`) to seconds.
fn parse_vtt_timestamp(ts: &str) -> Option<f64> {
    let parts: Vec<&str> = ts.split(':').collect();
    match parts.len() {
        2 => {
            let mins: f64 = parts[0].parse().ok()?;
            let secs: f64 = parts[1].parse().ok()?;
            Some(mins * 60.0 + secs)
        }
        3 => {
            let hours: f64 = parts[0].parse().ok()?;
            let mins: f64 = parts[1].parse().ok()?;
            let secs: f64 = parts[2].parse().ok()?;
            Some(hours * 3600.0 + mins * 60.0 + secs)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
WEBVTT

1
00:00:01.000 --> 00:00:02.500
Hello there, world!

2
00:00:03.000 --> 00:00:04.000
<c.color>Second</c> cue
";

    #[test]
    fn test_parses_words_with_cue_timing() {
        let words = parse_vtt(SAMPLE);
        let texts: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["hello", "there", "world", "second", "cue"]);

        assert_eq!(words[0].start, 1.0);
        // Overlapping cue-mates are staggered by sanitization
        assert!(words[1].start >= words[0].end);
    }

    #[test]
    fn test_strips_tags_and_punctuation() {
        let words = parse_vtt(SAMPLE);
        assert!(words.iter().all(|w| !w.text.contains('<')));
        assert!(words.iter().all(|w| !w.text.contains('!')));
    }

    #[test]
    fn test_short_timestamp_form() {
        assert_eq!(parse_vtt_timestamp("01:30.500"), Some(90.5));
        assert_eq!(parse_vtt_timestamp("00:01:30.500"), Some(90.5));
        assert_eq!(parse_vtt_timestamp("nope"), None);
    }

    #[test]
    fn test_rolling_duplicate_lines_skipped() {
        let vtt = "\
WEBVTT

00:00:01.000 --> 00:00:02.000
same line

00:00:02.000 --> 00:00:03.000
same line
";
        let words = parse_vtt(vtt);
        assert_eq!(words.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_vtt("").is_empty());
        assert!(parse_vtt("WEBVTT\n").is_empty());
    }
}
