//! Camera transform animation.
//!
//! Animations are passive: the host owns the clock and samples the
//! animation each frame with the elapsed time. Starting a new animation
//! simply replaces the old one, so a fit-all requested mid-flight
//! supersedes the running transition.

use kurbo::Vec2;

use crate::camera::Camera;

/// Default duration for animated camera transitions.
pub const TRANSITION_MS: u64 = 250;

/// An in-flight interpolation between two camera transforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformAnimation {
    pub from: Camera,
    pub to: Camera,
    pub duration_ms: u64,
}

impl TransformAnimation {
    pub fn new(from: Camera, to: Camera, duration_ms: u64) -> Self {
        Self { from, to, duration_ms }
    }

    /// Sample the camera at `elapsed_ms` since the animation started.
    /// Clamps to the end state, so sampling past the duration is safe.
    pub fn sample(&self, elapsed_ms: u64) -> Camera {
        if self.duration_ms == 0 || elapsed_ms >= self.duration_ms {
            return self.to;
        }
        let t = ease_in_out(elapsed_ms as f64 / self.duration_ms as f64);
        Camera {
            offset: Vec2::new(
                lerp(self.from.offset.x, self.to.offset.x, t),
                lerp(self.from.offset.y, self.to.offset.y, t),
            ),
            scale: lerp(self.from.scale, self.to.scale, t),
        }
    }

    pub fn is_finished(&self, elapsed_ms: u64) -> bool {
        elapsed_ms >= self.duration_ms
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Smoothstep easing: gentle start and stop.
fn ease_in_out(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(x: f64, y: f64, scale: f64) -> Camera {
        Camera { offset: Vec2::new(x, y), scale }
    }

    #[test]
    fn endpoints_are_exact() {
        let anim = TransformAnimation::new(camera(0.0, 0.0, 1.0), camera(100.0, 50.0, 2.0), 200);
        assert_eq!(anim.sample(0), camera(0.0, 0.0, 1.0));
        assert_eq!(anim.sample(200), camera(100.0, 50.0, 2.0));
        // Sampling past the end stays clamped.
        assert_eq!(anim.sample(10_000), camera(100.0, 50.0, 2.0));
    }

    #[test]
    fn midpoint_is_halfway() {
        let anim = TransformAnimation::new(camera(0.0, 0.0, 1.0), camera(100.0, 0.0, 3.0), 200);
        let mid = anim.sample(100);
        // Smoothstep is symmetric, so t = 0.5 maps to exactly 0.5.
        assert!((mid.offset.x - 50.0).abs() < 1e-9);
        assert!((mid.scale - 2.0).abs() < 1e-9);
    }

    #[test]
    fn zero_duration_jumps_to_the_end() {
        let anim = TransformAnimation::new(camera(0.0, 0.0, 1.0), camera(9.0, 9.0, 0.5), 0);
        assert_eq!(anim.sample(0), camera(9.0, 9.0, 0.5));
        assert!(anim.is_finished(0));
    }

    #[test]
    fn easing_slows_the_edges() {
        let anim = TransformAnimation::new(camera(0.0, 0.0, 1.0), camera(100.0, 0.0, 1.0), 100);
        // A tenth of the way in, smoothstep has covered well under a tenth.
        assert!(anim.sample(10).offset.x < 10.0);
        // And nine tenths in, well over nine tenths.
        assert!(anim.sample(90).offset.x > 90.0);
    }
}
