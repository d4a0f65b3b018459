//! Original-to-output timeline math.
//!
//! The silence detector (in `sclip-media`) produces padded, possibly
//! overlapping [`SilenceInterval`]s. This module holds the pure interval
//! math that follows:
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐
//! │ SilenceInterval  │──►│ ActiveSegment    │──►│ TransformedSegment│
//! │ (sorted, padded) │   │ (complement)     │   │ (speed + layout) │
//! └──────────────────┘   └──────────────────┘   └──────────────────┘
//!                                                        │
//!                                                        ▼
//!                                               ┌──────────────────┐
//!                                               │ TimeMap          │
//!                                               │ (word remapping) │
//!                                               └──────────────────┘
//! ```
//!
//! All times are seconds. "Original" times refer to the source clip before
//! cuts; "output" times refer to the assembled clip after silent spans are
//! removed and per-segment speed changes are applied.

use serde::{Deserialize, Serialize};

/// A contiguous span judged to contain no meaningful audio energy,
/// on the original timeline.
///
/// Invariant: `start < end`. Intervals are produced in increasing start
/// order but may overlap after margin padding; [`split_active_segments`]
/// tolerates and merges overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SilenceInterval {
    pub start: f64,
    pub end: f64,
}

impl SilenceInterval {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A contiguous non-silent span of the source clip's original timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveSegment {
    pub start: f64,
    pub end: f64,
}

impl ActiveSegment {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Half-open containment check: `[start, end)`.
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t < self.end
    }
}

/// Complement silence intervals against `[0, duration]` into active segments.
///
/// Sort-and-sweep: intervals are sorted by start, overlapping or adjacent
/// intervals are merged by the advancing `last_end` cursor, and the gaps
/// between them become active segments. Segments shorter than
/// `min_segment_secs` are dropped afterwards; words inside them are dropped
/// by the remapper in turn.
///
/// With no silence intervals the result is a single segment spanning the
/// whole clip. The result may be empty (e.g. the whole clip is silent);
/// callers fall back to the untouched source clip in that case.
pub fn split_active_segments(
    silences: &[SilenceInterval],
    duration: f64,
    min_segment_secs: f64,
) -> Vec<ActiveSegment> {
    let mut sorted: Vec<SilenceInterval> = silences.to_vec();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut segments = Vec::new();
    let mut last_end = 0.0_f64;

    for silence in &sorted {
        if silence.start > last_end {
            segments.push(ActiveSegment {
                start: last_end,
                end: silence.start,
            });
        }
        last_end = last_end.max(silence.end);
    }

    if last_end < duration {
        segments.push(ActiveSegment {
            start: last_end,
            end: duration,
        });
    }

    segments.retain(|s| s.duration() >= min_segment_secs);
    segments
}

/// Three-point zoom curve interpolated across a segment's duration.
///
/// Matches the original effect: one zoom value at the segment start, one at
/// the midpoint, one at the end, linearly interpolated between them. Zoom is
/// visual only and never affects timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomCurve {
    pub start: f64,
    pub mid: f64,
    pub end: f64,
}

impl ZoomCurve {
    /// Zoom factor at local time `t` within a segment of length `duration`.
    pub fn at(&self, t: f64, duration: f64) -> f64 {
        if duration <= 0.0 {
            return self.start;
        }
        let half = duration / 2.0;
        if t <= 0.0 {
            self.start
        } else if t < half {
            self.start + (self.mid - self.start) * (t / half)
        } else if t < duration {
            self.mid + (self.end - self.mid) * ((t - half) / half)
        } else {
            self.end
        }
    }
}

/// Center-anchored crop window in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    pub width: u32,
    pub height: u32,
    pub x_center: f64,
    pub y_center: f64,
}

/// A single tagged transform applied to a segment.
///
/// An explicit op list interpreted in one place
/// (`sclip_media::render::build_segment_filter`) rather than chained
/// effect calls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransformOp {
    /// Playback-rate multiplier; output duration = source duration / factor.
    Speed(f64),
    /// Time-varying zoom, visual only.
    Zoom(ZoomCurve),
    /// Center crop back to a fixed window, visual only.
    Crop(CropRect),
}

/// An active segment plus the ordered transforms to apply to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPlan {
    pub source: ActiveSegment,
    pub ops: Vec<TransformOp>,
}

impl SegmentPlan {
    /// Plan that plays the segment back unchanged.
    pub fn identity(source: ActiveSegment) -> Self {
        Self {
            source,
            ops: Vec::new(),
        }
    }

    /// Effective speed factor; the last `Speed` op wins, default 1.0.
    pub fn speed(&self) -> f64 {
        self.ops
            .iter()
            .rev()
            .find_map(|op| match op {
                TransformOp::Speed(f) => Some(*f),
                _ => None,
            })
            .unwrap_or(1.0)
    }
}

/// An active segment placed on the output timeline.
///
/// Invariants: `output_end - output_start == source.duration() / speed`,
/// and segment `i`'s `output_start` equals segment `i-1`'s `output_end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformedSegment {
    pub source: ActiveSegment,
    pub speed: f64,
    pub output_start: f64,
    pub output_end: f64,
}

impl TransformedSegment {
    pub fn output_duration(&self) -> f64 {
        self.output_end - self.output_start
    }
}

/// The complete original→output mapping for one clip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeMap {
    segments: Vec<TransformedSegment>,
}

impl TimeMap {
    /// Lay plans back to back from output time zero (strict prefix-sum
    /// layout: no gap, no overlap, input order preserved).
    ///
    /// Non-positive speed factors are treated as 1.0; a bad factor must not
    /// produce an inverted or infinite segment.
    pub fn layout(plans: &[SegmentPlan]) -> Self {
        let mut segments = Vec::with_capacity(plans.len());
        let mut cursor = 0.0_f64;

        for plan in plans {
            let speed = if plan.speed() > 0.0 { plan.speed() } else { 1.0 };
            let out_len = plan.source.duration() / speed;
            segments.push(TransformedSegment {
                source: plan.source,
                speed,
                output_start: cursor,
                output_end: cursor + out_len,
            });
            cursor += out_len;
        }

        Self { segments }
    }

    pub fn segments(&self) -> &[TransformedSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Ground-truth duration of the assembled output clip.
    pub fn output_duration(&self) -> f64 {
        self.segments.last().map(|s| s.output_end).unwrap_or(0.0)
    }

    /// Find the segment whose source span contains the original instant `t`.
    pub fn locate(&self, t: f64) -> Option<&TransformedSegment> {
        self.segments.iter().find(|s| s.source.contains(t))
    }

    /// Map an original instant onto the output timeline.
    ///
    /// Returns `None` for instants inside removed silence (or dropped
    /// micro-segments).
    pub fn map_instant(&self, t: f64) -> Option<f64> {
        let seg = self.locate(t)?;
        Some(seg.output_start + (t - seg.source.start) / seg.speed)
    }

    /// Map an original `[start, end)` span onto the output timeline.
    ///
    /// The span is anchored by its start: if `start` falls in a removed
    /// span the whole mapping is `None`. The end is mapped through the same
    /// segment and clamped to that segment's `output_end`, so a word whose
    /// tail spills into removed silence is truncated at the cut rather than
    /// overflowing into the next segment.
    pub fn map_span(&self, start: f64, end: f64) -> Option<(f64, f64)> {
        let seg = self.locate(start)?;
        let out_start = seg.output_start + (start - seg.source.start) / seg.speed;
        let out_end = (seg.output_start + (end - seg.source.start) / seg.speed)
            .min(seg.output_end)
            .max(out_start);
        Some((out_start, out_end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silence(start: f64, end: f64) -> SilenceInterval {
        SilenceInterval { start, end }
    }

    #[test]
    fn test_no_silence_single_segment() {
        let segments = split_active_segments(&[], 12.0, 0.2);
        assert_eq!(
            segments,
            vec![ActiveSegment {
                start: 0.0,
                end: 12.0
            }]
        );
    }

    #[test]
    fn test_split_complements_silence() {
        let segments = split_active_segments(&[silence(4.0, 6.0)], 10.0, 0.2);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], ActiveSegment { start: 0.0, end: 4.0 });
        assert_eq!(segments[1], ActiveSegment { start: 6.0, end: 10.0 });
    }

    #[test]
    fn test_split_merges_overlapping_intervals() {
        // Padded intervals from the detector may overlap; the sweep must
        // treat them as one span.
        let segments =
            split_active_segments(&[silence(0.0, 0.91), silence(0.89, 1.5)], 1.5, 0.2);
        assert!(segments.is_empty());
    }

    #[test]
    fn test_split_unsorted_input() {
        let segments = split_active_segments(&[silence(6.0, 8.0), silence(1.0, 2.0)], 10.0, 0.2);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].end, 1.0);
        assert_eq!(segments[1], ActiveSegment { start: 2.0, end: 6.0 });
        assert_eq!(segments[2], ActiveSegment { start: 8.0, end: 10.0 });
    }

    #[test]
    fn test_split_drops_micro_segments() {
        // 0.1s gap between the two silences is below the 0.2s minimum.
        let segments = split_active_segments(&[silence(0.0, 4.0), silence(4.1, 10.0)], 10.0, 0.2);
        assert!(segments.is_empty());
    }

    #[test]
    fn test_union_reconstructs_timeline() {
        // Pre-padding silences and their complement must tile [0, duration]
        // with no gaps and no overlaps.
        let silences = vec![silence(1.0, 2.5), silence(5.0, 5.5), silence(8.0, 10.0)];
        let duration = 10.0;
        let active = split_active_segments(&silences, duration, 0.0);

        let mut spans: Vec<(f64, f64)> = silences.iter().map(|s| (s.start, s.end)).collect();
        spans.extend(active.iter().map(|a| (a.start, a.end)));
        spans.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut cursor = 0.0;
        for (start, end) in spans {
            assert!((start - cursor).abs() < 1e-9, "gap or overlap at {start}");
            cursor = end;
        }
        assert!((cursor - duration).abs() < 1e-9);
    }

    #[test]
    fn test_layout_is_contiguous_prefix_sum() {
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
        let segs = map.segments();

        assert_eq!(segs[0].output_start, 0.0);
        assert_eq!(segs[0].output_end, 4.0);
        assert_eq!(segs[1].output_start, 4.0);
        assert_eq!(segs[1].output_end, 6.0);
        assert!((map.output_duration() - 6.0).abs() < 1e-9);

        let expected: f64 = plans
            .iter()
            .map(|p| p.source.duration() / p.speed())
            .sum();
        assert!((map.output_duration() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_map_span_spec_scenario() {
        // 10s clip, silence [4,6), speeds 1.0 and 2.0: a word at [7.0, 7.5)
        // sits 1.0s into the second segment and maps to [4.5, 4.75).
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

        let (start, end) = map.map_span(7.0, 7.5).unwrap();
        assert!((start - 4.5).abs() < 1e-9);
        assert!((end - 4.75).abs() < 1e-9);
    }

    #[test]
    fn test_map_span_identity_roundtrip() {
        let plans = vec![SegmentPlan::identity(ActiveSegment {
            start: 0.0,
            end: 30.0,
        })];
        let map = TimeMap::layout(&plans);

        let (start, end) = map.map_span(12.34, 12.9).unwrap();
        assert!((start - 12.34).abs() < 1e-9);
        assert!((end - 12.9).abs() < 1e-9);
    }

    #[test]
    fn test_map_span_dropped_in_silence() {
        let plans = vec![SegmentPlan::identity(ActiveSegment {
            start: 6.0,
            end: 10.0,
        })];
        let map = TimeMap::layout(&plans);

        assert!(map.map_span(4.5, 5.0).is_none());
    }

    #[test]
    fn test_map_span_clamps_straddling_word() {
        // Word starts inside the segment but ends past it: the end is
        // clamped to the segment's output boundary.
        let plans = vec![SegmentPlan {
            source: ActiveSegment { start: 0.0, end: 4.0 },
            ops: vec![TransformOp::Speed(1.0)],
        }];
        let map = TimeMap::layout(&plans);

        let (start, end) = map.map_span(3.8, 4.6).unwrap();
        assert!((start - 3.8).abs() < 1e-9);
        assert!((end - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_layout_ignores_non_positive_speed() {
        let plans = vec![SegmentPlan {
            source: ActiveSegment { start: 0.0, end: 2.0 },
            ops: vec![TransformOp::Speed(0.0)],
        }];
        let map = TimeMap::layout(&plans);
        assert!((map.output_duration() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_curve_interpolation() {
        let curve = ZoomCurve {
            start: 1.0,
            mid: 1.2,
            end: 0.9,
        };
        assert!((curve.at(0.0, 4.0) - 1.0).abs() < 1e-9);
        assert!((curve.at(2.0, 4.0) - 1.2).abs() < 1e-9);
        assert!((curve.at(4.0, 4.0) - 0.9).abs() < 1e-9);
        // Midway through the first half
        assert!((curve.at(1.0, 4.0) - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_plan_speed_last_op_wins() {
        let plan = SegmentPlan {
            source: ActiveSegment { start: 0.0, end: 1.0 },
            ops: vec![TransformOp::Speed(1.5), TransformOp::Speed(0.95)],
        };
        assert!((plan.speed() - 0.95).abs() < 1e-9);
    }
}
