//! Player sleigh: damped velocity, visual tilt and a forgiving hitbox

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::config::SleighConfig;
use crate::consts::{SLEIGH_HEIGHT, SLEIGH_START_OFFSET, SLEIGH_WIDTH};
use crate::frame_factor;

/// Horizontal input needed before the sleigh starts to lean
const TILT_INPUT_THRESHOLD: f32 = 0.3;
const TILT_PER_INPUT: f32 = 0.15;
const TILT_RATE: f32 = 0.15;
/// Returning upright is faster than leaning in
const TILT_RETURN_RATE: f32 = 0.25;
const TILT_EPSILON: f32 = 0.01;
/// Velocity components below this snap to zero while steering
const VELOCITY_SNAP: f32 = 0.5;
/// Idle drift below this stops outright
const IDLE_VELOCITY_SNAP: f32 = 0.05;
/// Input magnitude that counts as steering
const MOVING_THRESHOLD: f32 = 0.1;
/// Maximum knock-back offset on impact, per axis
const COLLISION_JITTER: f32 = 2.0;

/// Player sleigh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sleigh {
    /// Top-left corner
    pub pos: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    /// Current max velocity (boosted while the speed multiplier runs)
    pub max_velocity: f32,
    pub base_max_velocity: f32,
    /// Lean angle in radians (visual only)
    pub tilt: f32,
    pub target_tilt: f32,
    pub is_moving: bool,
    /// Glow intensity 0..1 (visual only)
    pub glow: f32,
    #[serde(skip)]
    config: SleighConfig,
    #[serde(skip)]
    canvas: Vec2,
}

impl Sleigh {
    pub fn new(config: SleighConfig, canvas: Vec2) -> Self {
        let size = Vec2::new(SLEIGH_WIDTH, SLEIGH_HEIGHT);
        Self {
            pos: Self::start_position(canvas, size),
            velocity: Vec2::ZERO,
            size,
            max_velocity: config.max_velocity,
            base_max_velocity: config.max_velocity,
            tilt: 0.0,
            target_tilt: 0.0,
            is_moving: false,
            glow: 0.0,
            config,
            canvas,
        }
    }

    fn start_position(canvas: Vec2, size: Vec2) -> Vec2 {
        Vec2::new(
            (canvas.x - size.x) / 2.0,
            canvas.y - size.y - SLEIGH_START_OFFSET,
        )
    }

    /// Steer toward a normalized input vector
    ///
    /// Components are clamped to [-1, 1]; non-finite components count as no
    /// input. Zero input leaves the sleigh coasting under friction.
    pub fn apply_movement_input(&mut self, dx: f32, dy: f32) {
        let dx = sanitize_axis(dx);
        let dy = sanitize_axis(dy);

        if dx == 0.0 && dy == 0.0 {
            self.is_moving = false;
            self.target_tilt = 0.0;
            return;
        }

        let sensitivity = self.config.sensitivity;
        let target = Vec2::new(dx, dy) * self.max_velocity * sensitivity;
        self.velocity += (target - self.velocity) * self.config.acceleration;

        if self.velocity.x.abs() < VELOCITY_SNAP {
            self.velocity.x = 0.0;
        }
        if self.velocity.y.abs() < VELOCITY_SNAP {
            self.velocity.y = 0.0;
        }

        // Lean follows horizontal input only
        self.target_tilt = if dx.abs() > TILT_INPUT_THRESHOLD {
            dx * TILT_PER_INPUT
        } else {
            0.0
        };

        self.is_moving = dx.abs() > MOVING_THRESHOLD || dy.abs() > MOVING_THRESHOLD;
    }

    pub fn update(&mut self, dt_ms: f32) {
        let f = frame_factor(dt_ms);

        if !self.is_moving {
            self.velocity *= self.config.friction.powf(f);
            if self.velocity.length_squared() < IDLE_VELOCITY_SNAP * IDLE_VELOCITY_SNAP {
                self.velocity = Vec2::ZERO;
            }
            self.target_tilt = 0.0;
        }

        self.pos += self.velocity * f;
        self.clamp_to_canvas(self.config.margin);

        let rate = if self.target_tilt != 0.0 {
            TILT_RATE
        } else {
            TILT_RETURN_RATE
        };
        let step = (rate * f).min(1.0);
        self.tilt += (self.target_tilt - self.tilt) * step;
        if self.target_tilt == 0.0 && self.tilt.abs() < TILT_EPSILON {
            self.tilt = 0.0;
        }

        self.glow = if self.is_moving {
            (self.glow + 0.1 * f).min(1.0)
        } else {
            (self.glow - 0.05 * f).max(0.0)
        };
    }

    fn clamp_to_canvas(&mut self, margin: f32) {
        let max = (self.canvas - self.size - Vec2::splat(margin)).max(Vec2::splat(margin));
        self.pos = self.pos.clamp(Vec2::splat(margin), max);
    }

    /// Hitbox inset by the collision tolerance
    pub fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size).inset(self.config.collision_tolerance)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Small random knock-back on impact
    pub fn collision_feedback<R: Rng>(&mut self, rng: &mut R) {
        let jitter = Vec2::new(
            rng.random_range(-COLLISION_JITTER..=COLLISION_JITTER),
            rng.random_range(-COLLISION_JITTER..=COLLISION_JITTER),
        );
        self.pos += jitter;
        self.clamp_to_canvas(0.0);
    }

    /// Scale max velocity from the unboosted base (repeated boosts never compound)
    pub fn apply_boost(&mut self, factor: f32) {
        self.max_velocity = self.base_max_velocity * factor;
        self.glow = 1.0;
    }

    pub fn restore_max_velocity(&mut self) {
        self.max_velocity = self.base_max_velocity;
    }

    pub fn is_boosted(&self) -> bool {
        self.max_velocity > self.base_max_velocity
    }

    /// Back to the start pose with the unboosted max velocity
    pub fn reset(&mut self) {
        self.pos = Self::start_position(self.canvas, self.size);
        self.velocity = Vec2::ZERO;
        self.tilt = 0.0;
        self.target_tilt = 0.0;
        self.is_moving = false;
        self.glow = 0.0;
        self.restore_max_velocity();
    }
}

fn sanitize_axis(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn sleigh() -> Sleigh {
        Sleigh::new(SleighConfig::default(), Vec2::new(480.0, 800.0))
    }

    #[test]
    fn test_starts_centered_above_bottom() {
        let s = sleigh();
        assert_eq!(s.pos, Vec2::new(208.0, 702.0));
        assert_eq!(s.tilt, 0.0);
    }

    #[test]
    fn test_input_is_clamped() {
        let mut a = sleigh();
        let mut b = sleigh();
        a.apply_movement_input(5.0, 0.0);
        b.apply_movement_input(1.0, 0.0);
        assert_eq!(a.velocity, b.velocity);
        // 15 * 1.3 * 0.9
        assert!((a.velocity.x - 17.55).abs() < 1e-3);
    }

    #[test]
    fn test_nan_input_is_ignored() {
        let mut s = sleigh();
        s.apply_movement_input(f32::NAN, f32::INFINITY);
        assert_eq!(s.velocity, Vec2::ZERO);
        assert!(!s.is_moving);
    }

    #[test]
    fn test_stays_inside_canvas() {
        let mut s = sleigh();
        for _ in 0..200 {
            s.apply_movement_input(1.0, 1.0);
            s.update(FRAME_MS);
        }
        assert_eq!(s.pos.x, 480.0 - 64.0 - 5.0);
        assert_eq!(s.pos.y, 800.0 - 48.0 - 5.0);

        for _ in 0..200 {
            s.apply_movement_input(-1.0, -1.0);
            s.update(FRAME_MS);
        }
        assert_eq!(s.pos, Vec2::splat(5.0));
    }

    #[test]
    fn test_tilt_decays_to_exactly_zero() {
        let mut s = sleigh();
        for _ in 0..10 {
            s.apply_movement_input(1.0, 0.0);
            s.update(FRAME_MS);
        }
        assert!(s.tilt > 0.1);

        for _ in 0..100 {
            s.apply_movement_input(0.0, 0.0);
            s.update(FRAME_MS);
        }
        assert_eq!(s.tilt, 0.0);
    }

    #[test]
    fn test_vertical_input_never_tilts() {
        let mut s = sleigh();
        for _ in 0..20 {
            s.apply_movement_input(0.0, -1.0);
            s.update(FRAME_MS);
        }
        assert_eq!(s.tilt, 0.0);
        assert!(s.pos.y < 702.0);
    }

    #[test]
    fn test_friction_brings_sleigh_to_rest() {
        let mut s = sleigh();
        s.apply_movement_input(1.0, 0.0);
        s.apply_movement_input(0.0, 0.0);
        for _ in 0..120 {
            s.update(FRAME_MS);
        }
        assert_eq!(s.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_bounds_are_inset() {
        let s = sleigh();
        let b = s.bounds();
        assert_eq!(b.width, 48.0);
        assert_eq!(b.height, 32.0);
        assert_eq!(b.x, s.pos.x + 8.0);
    }

    #[test]
    fn test_boost_does_not_compound_and_reset_restores() {
        let mut s = sleigh();
        s.apply_boost(1.8);
        s.apply_boost(1.8);
        assert!((s.max_velocity - 27.0).abs() < 1e-3);
        s.reset();
        assert_eq!(s.max_velocity, 15.0);
        assert!(!s.is_boosted());
    }

    #[test]
    fn test_collision_feedback_stays_on_canvas() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut s = sleigh();
        s.pos = Vec2::ZERO;
        for _ in 0..50 {
            s.collision_feedback(&mut rng);
            assert!(s.pos.x >= 0.0 && s.pos.y >= 0.0);
        }
    }
}
