//! ASS subtitle generation for animated word captions.
//!
//! The renderer proper is FFmpeg's `subtitles` filter; this module only
//! produces the ASS document it burns in. Every word gets up to three
//! dialogue events: resting before it is spoken, raised and emphasized
//! strictly during `[output_start, output_end)`, and resting again until
//! its section leaves the screen.

use serde::{Deserialize, Serialize};

use crate::sections::{estimate_section_width, estimate_word_width, CaptionSection, SectionConfig};

/// Caption appearance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssConfig {
    /// Font family name.
    pub font: String,
    /// Pixels a word rises while spoken.
    pub rise_px: u32,
    /// Caption baseline height above the bottom edge, as a fraction of
    /// frame height.
    pub baseline_offset_frac: f64,
    /// Words longer than this many characters render in the accent color.
    pub accent_min_chars: usize,
}

impl Default for AssConfig {
    fn default() -> Self {
        Self {
            font: "Raleway".to_string(),
            rise_px: 17,
            // Tuned against the original 808px-tall layout (350px offset)
            baseline_offset_frac: 350.0 / 808.0,
            accent_min_chars: 6,
        }
    }
}

/// White in ASS AABBGGRR form.
const COLOR_NORMAL: &str = "&H00FFFFFF";
/// Yellow in ASS AABBGGRR form.
const COLOR_ACCENT: &str = "&H0000FFFF";

/// Render sections to a complete ASS document.
pub fn render_ass(
    sections: &[CaptionSection],
    frame_width: u32,
    frame_height: u32,
    section_config: &SectionConfig,
    config: &AssConfig,
) -> String {
    let font_size = section_config.font_size(frame_width).round() as u32;
    let mut doc = format!(
        "[Script Info]\n\
         ScriptType: v4.00+\n\
         PlayResX: {frame_width}\n\
         PlayResY: {frame_height}\n\
         WrapStyle: 2\n\
         \n\
         [V4+ Styles]\n\
         Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n\
         Style: Word,{font},{font_size},{COLOR_NORMAL},{COLOR_NORMAL},&H00000000,&H80000000,-1,-1,0,0,100,100,0,0,1,1,1,7,0,0,0,1\n\
         \n\
         [Events]\n\
         Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n",
        font = config.font,
    );

    let y_base = frame_height as f64 * (1.0 - config.baseline_offset_frac);

    for section in sections {
        let section_start = section.start();
        let section_end = section.end();
        let total_width = estimate_section_width(&section.words, section_config, frame_width);
        let mut x = ((frame_width as f64 - total_width) / 2.0).max(0.0);

        for placed in &section.words {
            let width = estimate_word_width(&placed.word.text, section_config, frame_width);
            let color = if placed.word.text.chars().count() >= config.accent_min_chars {
                COLOR_ACCENT
            } else {
                COLOR_NORMAL
            };
            let text = escape_ass_text(&placed.word.text);

            // Resting state before the word is spoken
            if placed.output_start > section_start {
                doc.push_str(&dialogue_line(
                    0,
                    section_start,
                    placed.output_start,
                    x,
                    y_base,
                    color,
                    "",
                    &text,
                ));
            }

            // Risen, emphasized state while spoken
            doc.push_str(&dialogue_line(
                1,
                placed.output_start,
                placed.output_end,
                x,
                y_base - config.rise_px as f64,
                color,
                "\\bord2",
                &text,
            ));

            // Resting state after the word until the section leaves
            if section_end > placed.output_end {
                doc.push_str(&dialogue_line(
                    0,
                    placed.output_end,
                    section_end,
                    x,
                    y_base,
                    color,
                    "",
                    &text,
                ));
            }

            x += width + section_config.padding_px as f64;
        }
    }

    doc
}

#[allow(clippy::too_many_arguments)]
fn dialogue_line(
    layer: u32,
    start: f64,
    end: f64,
    x: f64,
    y: f64,
    color: &str,
    extra_tags: &str,
    text: &str,
) -> String {
    format!(
        "Dialogue: {layer},{},{},Word,,0,0,0,,{{\\pos({:.0},{:.0})\\1c{color}&{extra_tags}}}{text}\n",
        format_ass_time(start),
        format_ass_time(end),
        x,
        y,
    )
}

/// Format seconds as an ASS timestamp (`H:MM:SS.CC`).
pub fn format_ass_time(secs: f64) -> String {
    let secs = secs.max(0.0);
    let hours = (secs / 3600.0).floor() as u32;
    let mins = ((secs % 3600.0) / 60.0).floor() as u32;
    let s = (secs % 60.0).floor() as u32;
    let centis = ((secs - secs.floor()) * 100.0).round() as u32;
    // Rounding can carry into the next second
    if centis >= 100 {
        return format_ass_time(secs.floor() + 1.0);
    }
    format!("{hours}:{mins:02}:{s:02}.{centis:02}")
}

fn escape_ass_text(text: &str) -> String {
    text.replace('\\', "\\\\").replace('{', "(").replace('}', ")")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sclip_models::word::{PlacedWord, Word};

    fn placed(text: &str, start: f64, end: f64) -> PlacedWord {
        PlacedWord {
            word: Word::new(text, start, end),
            output_start: start,
            output_end: end,
        }
    }

    fn one_section(words: Vec<PlacedWord>) -> Vec<CaptionSection> {
        vec![CaptionSection { words }]
    }

    #[test]
    fn test_format_ass_time() {
        assert_eq!(format_ass_time(0.0), "0:00:00.00");
        assert_eq!(format_ass_time(61.25), "0:01:01.25");
        assert_eq!(format_ass_time(3661.5), "1:01:01.50");
        // Centisecond rounding carries over cleanly
        assert_eq!(format_ass_time(1.999), "0:00:02.00");
    }

    #[test]
    fn test_word_states() {
        let sections = one_section(vec![placed("one", 0.0, 0.5), placed("two", 0.5, 1.0)]);
        let doc = render_ass(
            &sections,
            1920,
            1080,
            &SectionConfig::default(),
            &AssConfig::default(),
        );

        let dialogue_count = doc.matches("Dialogue:").count();
        // First word: risen + after; second word: before + risen
        assert_eq!(dialogue_count, 4);
        assert!(doc.contains("\\bord2"));
    }

    #[test]
    fn test_accent_color_for_long_words() {
        let sections = one_section(vec![placed("extended", 0.0, 0.5), placed("no", 0.5, 1.0)]);
        let doc = render_ass(
            &sections,
            1920,
            1080,
            &SectionConfig::default(),
            &AssConfig::default(),
        );

        assert!(doc.contains(COLOR_ACCENT));
        assert!(doc.contains(COLOR_NORMAL));
    }

    #[test]
    fn test_risen_state_is_above_resting() {
        let sections = one_section(vec![placed("up", 0.0, 0.5), placed("next", 0.5, 1.0)]);
        let config = AssConfig::default();
        let doc = render_ass(&sections, 1920, 1080, &SectionConfig::default(), &config);

        let ys: Vec<f64> = doc
            .lines()
            .filter(|l| l.starts_with("Dialogue:"))
            .filter_map(|l| {
                let pos = l.split("\\pos(").nth(1)?;
                let coords = pos.split(')').next()?;
                coords.split(',').nth(1)?.parse().ok()
            })
            .collect();

        let min = ys.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!((max - min - config.rise_px as f64).abs() < 1.0);
    }

    #[test]
    fn test_braces_cannot_escape_into_tags() {
        let sections = one_section(vec![placed("{weird}", 0.0, 0.5)]);
        let doc = render_ass(
            &sections,
            1920,
            1080,
            &SectionConfig::default(),
            &AssConfig::default(),
        );
        assert!(doc.contains("(weird)"));
    }
}
