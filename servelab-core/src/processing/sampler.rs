//! Temporal sampling of decoded frames at a target rate.
//!
//! Frames are visited in presentation order. A frame is selected when the
//! midpoint of its display interval has reached the next sampling instant,
//! after which the instant advances by one target interval. The selection
//! therefore never exceeds the source rate, and with a target at or above the
//! source rate every frame is kept.

use crate::config::DEFAULT_FALLBACK_FPS;

/// Stateful selector deciding which frame indices to keep.
#[derive(Debug, Clone)]
pub struct TemporalSampler {
    source_fps: f64,
    interval: f64,
    next_instant: f64,
}

impl TemporalSampler {
    /// Creates a sampler for a stream at `source_fps` sampled at `target_fps`.
    ///
    /// A non-positive or non-finite source rate is replaced by the fallback
    /// rate. `target_fps` must be positive; settings validation guarantees it.
    #[must_use]
    pub fn new(source_fps: f64, target_fps: f64) -> Self {
        let source_fps = if source_fps.is_finite() && source_fps > 0.0 {
            source_fps
        } else {
            DEFAULT_FALLBACK_FPS
        };
        Self {
            source_fps,
            interval: 1.0 / target_fps,
            next_instant: 0.0,
        }
    }

    /// Effective source rate after the fallback was applied.
    #[must_use]
    pub fn source_fps(&self) -> f64 {
        self.source_fps
    }

    /// Decides whether frame `index` is kept. Must be called once per frame,
    /// in increasing index order.
    pub fn should_sample(&mut self, index: u64) -> bool {
        let midpoint = index as f64 / self.source_fps + 0.5 / self.source_fps;
        if midpoint >= self.next_instant {
            self.next_instant += self.interval;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(source: f64, target: f64, frames: u64) -> Vec<u64> {
        let mut sampler = TemporalSampler::new(source, target);
        (0..frames).filter(|&i| sampler.should_sample(i)).collect()
    }

    #[test]
    fn test_thirty_to_ten_keeps_every_third_frame() {
        let picked = selected(30.0, 10.0, 30);
        assert_eq!(picked, vec![0, 3, 6, 9, 12, 15, 18, 21, 24, 27]);
    }

    #[test]
    fn test_target_above_source_keeps_everything() {
        assert_eq!(selected(24.0, 60.0, 48).len(), 48);
        assert_eq!(selected(30.0, 30.0, 30).len(), 30);
    }

    #[test]
    fn test_first_frame_always_selected() {
        for (source, target) in [(30.0, 1.0), (59.94, 7.5), (25.0, 0.5)] {
            assert_eq!(selected(source, target, 1), vec![0]);
        }
    }

    #[test]
    fn test_count_tracks_duration_times_target() {
        // 10 s at 29.97 fps sampled at 10 fps
        let frames = 300;
        let count = selected(29.97, 10.0, frames).len() as f64;
        let expected = frames as f64 / 29.97 * 10.0;
        assert!((count - expected).abs() <= 1.0, "count={count} expected~{expected}");
    }

    #[test]
    fn test_invalid_source_rate_uses_fallback() {
        assert_eq!(TemporalSampler::new(0.0, 10.0).source_fps(), 30.0);
        assert_eq!(TemporalSampler::new(f64::NAN, 10.0).source_fps(), 30.0);
        assert_eq!(selected(0.0, 10.0, 30), selected(30.0, 10.0, 30));
    }
}
