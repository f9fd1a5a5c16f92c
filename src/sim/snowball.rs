//! Player projectiles

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::{SNOWBALL_SIZE, SNOWBALL_SPEED};
use crate::frame_factor;

/// Snowball fired by the sleigh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snowball {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    /// Pixels per 60 fps frame; the lateral component fans out spread shots
    pub vel: Vec2,
    pub active: bool,
}

impl Snowball {
    /// Straight-up shot
    pub fn new(id: u32, pos: Vec2) -> Self {
        Self::with_velocity(id, pos, Vec2::new(0.0, -SNOWBALL_SPEED))
    }

    pub fn with_velocity(id: u32, pos: Vec2, vel: Vec2) -> Self {
        Self {
            id,
            pos,
            vel,
            active: true,
        }
    }

    pub fn size() -> Vec2 {
        Vec2::splat(SNOWBALL_SIZE)
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, Self::size())
    }

    /// Integrate and deactivate once well off the canvas
    pub fn update(&mut self, dt_ms: f32, canvas_width: f32) {
        if !self.active {
            return;
        }
        self.pos += self.vel * frame_factor(dt_ms);

        let size = Self::size();
        if self.pos.y < -size.y || self.pos.x < -size.x || self.pos.x > canvas_width + size.x {
            self.active = false;
        }
    }
}
