//! Per-segment transform planning.
//!
//! Each active segment independently draws a playback speed from a small
//! discrete set and, optionally, a three-point zoom curve. The plans are
//! interpreted by `render::build_segment_filter`.

use rand::prelude::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use sclip_models::timeline::{ActiveSegment, SegmentPlan, TransformOp, ZoomCurve};

/// Configuration for segment transform planning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    /// Discrete speed factors sampled uniformly, independently per segment.
    pub speed_choices: Vec<f64>,
    /// Zoom sampling range; `None` disables the zoom effect.
    pub zoom_range: Option<(f64, f64)>,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            speed_choices: vec![0.95, 1.0, 1.05],
            zoom_range: Some((0.9, 1.2)),
        }
    }
}

/// Draw a transform plan for every active segment.
pub fn plan_segments<R: Rng>(
    segments: &[ActiveSegment],
    config: &PlanConfig,
    rng: &mut R,
) -> Vec<SegmentPlan> {
    segments
        .iter()
        .map(|&source| {
            let mut ops = Vec::new();

            if let Some((lo, hi)) = config.zoom_range {
                ops.push(TransformOp::Zoom(ZoomCurve {
                    start: rng.random_range(lo..hi),
                    mid: rng.random_range(lo..hi),
                    end: rng.random_range(lo..hi),
                }));
            }

            let speed = config
                .speed_choices
                .choose(rng)
                .copied()
                .unwrap_or(1.0);
            ops.push(TransformOp::Speed(speed));

            SegmentPlan { source, ops }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn segment(start: f64, end: f64) -> ActiveSegment {
        ActiveSegment { start, end }
    }

    #[test]
    fn test_speed_drawn_from_choices() {
        let config = PlanConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let plans = plan_segments(&[segment(0.0, 2.0); 50], &config, &mut rng);

        for plan in &plans {
            assert!(config.speed_choices.contains(&plan.speed()));
        }
    }

    #[test]
    fn test_zoom_disabled() {
        let config = PlanConfig {
            zoom_range: None,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let plans = plan_segments(&[segment(0.0, 2.0)], &config, &mut rng);

        assert!(!plans[0]
            .ops
            .iter()
            .any(|op| matches!(op, TransformOp::Zoom(_))));
    }

    #[test]
    fn test_empty_choices_default_to_identity_speed() {
        let config = PlanConfig {
            speed_choices: Vec::new(),
            zoom_range: None,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let plans = plan_segments(&[segment(0.0, 2.0)], &config, &mut rng);
        assert_eq!(plans[0].speed(), 1.0);
    }
}
