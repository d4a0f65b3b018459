//! End-to-end tests for the segmentation and caption retiming math,
//! exercising the pure pipeline stages together without touching FFmpeg.

use rand::rngs::StdRng;
use rand::SeedableRng;

use sclip_captions::{group_into_sections, render_ass, AssConfig, ProfanityFilter, SectionConfig};
use sclip_media::energy::compute_energy_chunks;
use sclip_media::silence::{detect_silent_intervals, SilenceConfig, SilenceThreshold};
use sclip_models::timeline::{
    split_active_segments, ActiveSegment, SegmentPlan, TimeMap, TransformOp,
};
use sclip_models::word::{remap_words, sanitize_words, PlacedWord, Word};

/// Build a synthetic waveform: (amplitude, seconds) spans at a low sample
/// rate to keep the test small.
fn waveform(spans: &[(f32, f64)], sample_rate: u32) -> Vec<f32> {
    let mut samples = Vec::new();
    for &(amplitude, secs) in spans {
        let count = (secs * sample_rate as f64) as usize;
        samples.extend(std::iter::repeat(amplitude).take(count));
    }
    samples
}

#[test]
fn waveform_to_segments_complements_silence() {
    let sample_rate = 100;
    // 2s speech, 2s silence, 2s speech
    let samples = waveform(&[(0.5, 2.0), (0.0, 2.0), (0.5, 2.0)], sample_rate);
    let duration = 6.0;

    let config = SilenceConfig {
        threshold: SilenceThreshold::Absolute(0.1),
        chunk_duration: 0.5,
        transition_margin: 0.0,
        min_segment_secs: 0.2,
    };

    let chunks = compute_energy_chunks(&samples, sample_rate, config.chunk_duration);
    let silences = detect_silent_intervals(&chunks, &config, duration);
    let segments = split_active_segments(&silences, duration, config.min_segment_secs);

    assert_eq!(segments.len(), 2);
    assert!((segments[0].start - 0.0).abs() < 1e-9);
    assert!((segments[0].end - 2.0).abs() < 1e-9);
    assert!((segments[1].start - 4.0).abs() < 1e-9);
    assert!((segments[1].end - 6.0).abs() < 1e-9);

    // Union of silences and segments tiles [0, duration]
    let covered: f64 = silences.iter().map(|s| s.duration()).sum::<f64>()
        + segments.iter().map(|s| s.duration()).sum::<f64>();
    assert!((covered - duration).abs() < 1e-9);
}

#[test]
fn relative_threshold_tracks_recording_loudness() {
    let sample_rate = 100;
    for gain in [1.0_f32, 0.05] {
        let samples = waveform(
            &[(0.5 * gain, 2.0), (0.001 * gain, 2.0), (0.5 * gain, 2.0)],
            sample_rate,
        );
        let config = SilenceConfig {
            chunk_duration: 0.5,
            transition_margin: 0.0,
            ..SilenceConfig::default()
        };

        let chunks = compute_energy_chunks(&samples, sample_rate, config.chunk_duration);
        let silences = detect_silent_intervals(&chunks, &config, 6.0);
        assert_eq!(silences.len(), 1, "gain {gain}");
    }
}

#[test]
fn words_follow_cuts_and_speed_changes() {
    // The spec's reference scenario: silence [4,6) removed, second half at
    // double speed.
    let plans = vec![
        SegmentPlan {
            source: ActiveSegment { start: 0.0, end: 4.0 },
            ops: vec![TransformOp::Speed(1.0)],
        },
        SegmentPlan {
            source: ActiveSegment { start: 6.0, end: 10.0 },
            ops: vec![TransformOp::Speed(2.0)],
        },
    ];
    let map = TimeMap::layout(&plans);
    assert!((map.output_duration() - 6.0).abs() < 1e-9);

    let words = sanitize_words(vec![
        Word::new("early", 1.0, 1.4),
        Word::new("damn", 4.5, 5.0),
        Word::new("late", 7.0, 7.5),
    ]);

    let remapped = remap_words(&words, &map);
    let placed: Vec<PlacedWord> = remapped.iter().filter_map(|r| r.placed().cloned()).collect();

    // "damn" sat inside the removed silence
    assert_eq!(placed.len(), 2);
    assert_eq!(placed[0].word.text, "early");
    assert!((placed[0].output_start - 1.0).abs() < 1e-9);
    assert!((placed[1].output_start - 4.5).abs() < 1e-9);
    assert!((placed[1].output_end - 4.75).abs() < 1e-9);
}

#[test]
fn bleeps_land_on_remapped_times() {
    let plans = vec![SegmentPlan {
        source: ActiveSegment { start: 6.0, end: 10.0 },
        ops: vec![TransformOp::Speed(2.0)],
    }];
    let map = TimeMap::layout(&plans);

    let words = vec![Word::new("shit", 7.0, 7.5)];
    let remapped = remap_words(&words, &map);
    let placed: Vec<PlacedWord> = remapped.iter().filter_map(|r| r.placed().cloned()).collect();

    let filter = ProfanityFilter::default();
    let (censored, bleeps) = filter.censor(&placed);

    assert_eq!(censored[0].word.text, "[BLEEP]");
    assert_eq!(bleeps.len(), 1);
    assert!((bleeps[0].0 - 0.5).abs() < 1e-9);
    assert!((bleeps[0].1 - 0.75).abs() < 1e-9);
}

#[test]
fn rendered_captions_never_contain_curse_words() {
    let map = TimeMap::layout(&[SegmentPlan::identity(ActiveSegment {
        start: 0.0,
        end: 10.0,
    })]);

    let words = sanitize_words(vec![
        Word::new("what", 0.5, 0.8),
        Word::new("the", 0.9, 1.1),
        Word::new("hell", 1.2, 1.6),
        Word::new("was", 1.7, 1.9),
        Word::new("that", 2.0, 2.4),
    ]);

    let remapped = remap_words(&words, &map);
    let placed: Vec<PlacedWord> = remapped.iter().filter_map(|r| r.placed().cloned()).collect();
    let (censored, bleeps) = ProfanityFilter::default().censor(&placed);

    let mut rng = StdRng::seed_from_u64(99);
    let section_config = SectionConfig::default();
    let sections = group_into_sections(&censored, &section_config, 1920, &mut rng);
    let doc = render_ass(&sections, 1920, 1080, &section_config, &AssConfig::default());

    assert!(!doc.contains("hell"));
    assert!(doc.contains("[BLEEP]"));
    assert_eq!(bleeps.len(), 1);

    // Every surviving word appears in at least one dialogue event
    for word in ["what", "the", "was", "that"] {
        assert!(doc.contains(word), "missing {word}");
    }
}

#[test]
fn identity_pipeline_preserves_timestamps_through_sections() {
    let map = TimeMap::layout(&[SegmentPlan::identity(ActiveSegment {
        start: 0.0,
        end: 30.0,
    })]);

    let words = sanitize_words(
        (0..12).map(|i| Word::new(format!("w{i}"), i as f64 * 0.5, i as f64 * 0.5 + 0.4)),
    );
    let remapped = remap_words(&words, &map);
    let placed: Vec<PlacedWord> = remapped.iter().filter_map(|r| r.placed().cloned()).collect();

    for (word, p) in words.iter().zip(&placed) {
        assert_eq!(word.start, p.output_start);
        assert_eq!(word.end, p.output_end);
    }

    let mut rng = StdRng::seed_from_u64(3);
    let config = SectionConfig::default();
    let sections = group_into_sections(&placed, &config, 1920, &mut rng);

    // Sections partition the words in order
    let flattened: Vec<String> = sections
        .iter()
        .flat_map(|s| s.words.iter().map(|w| w.word.text.clone()))
        .collect();
    let original: Vec<String> = words.iter().map(|w| w.text.clone()).collect();
    assert_eq!(flattened, original);
}
