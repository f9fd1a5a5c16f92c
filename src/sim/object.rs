//! Falling obstacles and bonus pickups

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::frame_factor;

/// Kinds of falling objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Snowy pine
    Obstacle,
    SnowmanObstacle,
    LampPostObstacle,
    /// Pine with a fence; takes two hits
    ReinforcedObstacle,
    /// Snowman with a bucket helmet; takes two hits
    ArmoredSnowman,
    Gift,
    ExtraLife,
    /// Activates the fire multiplier
    SnowBlower,
    /// Activates the speed multiplier
    MoveSpeedBoost,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 9] = [
        ObjectKind::Obstacle,
        ObjectKind::SnowmanObstacle,
        ObjectKind::LampPostObstacle,
        ObjectKind::ReinforcedObstacle,
        ObjectKind::ArmoredSnowman,
        ObjectKind::Gift,
        ObjectKind::ExtraLife,
        ObjectKind::SnowBlower,
        ObjectKind::MoveSpeedBoost,
    ];

    /// Sprite and hitbox size
    pub fn size(self) -> Vec2 {
        match self {
            ObjectKind::Obstacle
            | ObjectKind::SnowmanObstacle
            | ObjectKind::ReinforcedObstacle
            | ObjectKind::ArmoredSnowman => Vec2::new(40.0, 60.0),
            ObjectKind::LampPostObstacle => Vec2::new(24.0, 64.0),
            ObjectKind::Gift
            | ObjectKind::ExtraLife
            | ObjectKind::SnowBlower
            | ObjectKind::MoveSpeedBoost => Vec2::new(36.0, 36.0),
        }
    }

    /// Pickups the sleigh collects
    pub fn is_bonus(self) -> bool {
        matches!(
            self,
            ObjectKind::Gift | ObjectKind::ExtraLife | ObjectKind::SnowBlower | ObjectKind::MoveSpeedBoost
        )
    }

    pub fn is_obstacle(self) -> bool {
        !self.is_bonus()
    }

    /// Health an object of this kind spawns with
    pub fn spawn_health(self) -> u32 {
        match self {
            ObjectKind::ReinforcedObstacle | ObjectKind::ArmoredSnowman => 2,
            _ => 1,
        }
    }

    /// Unarmored counterpart once an armored kind has taken a hit
    pub fn downgraded(self) -> Option<ObjectKind> {
        match self {
            ObjectKind::ArmoredSnowman => Some(ObjectKind::SnowmanObstacle),
            ObjectKind::ReinforcedObstacle => Some(ObjectKind::Obstacle),
            _ => None,
        }
    }

    /// Draw order (extra lives on top)
    pub fn z_index(self) -> u32 {
        if self == ObjectKind::ExtraLife { 1000 } else { 1 }
    }

    /// Asset key
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Obstacle => "obstacle",
            ObjectKind::SnowmanObstacle => "snowmanObstacle",
            ObjectKind::LampPostObstacle => "lampPostObstacle",
            ObjectKind::ReinforcedObstacle => "reinforcedObstacle",
            ObjectKind::ArmoredSnowman => "armoredSnowman",
            ObjectKind::Gift => "gift",
            ObjectKind::ExtraLife => "extraLife",
            ObjectKind::SnowBlower => "snowBlower",
            ObjectKind::MoveSpeedBoost => "moveSpeedBoost",
        }
    }
}

/// An obstacle or pickup scrolling down the playfield
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameObject {
    pub id: u32,
    pub kind: ObjectKind,
    /// Top-left corner
    pub pos: Vec2,
    /// Falling speed in pixels per 60 fps frame
    pub speed: f32,
    pub health: u32,
    pub max_health: u32,
    pub active: bool,
    /// Hit flash (1.0 on damage, fades out)
    #[serde(default)]
    pub hit_flash: f32,
}

impl GameObject {
    pub fn new(id: u32, kind: ObjectKind, pos: Vec2, speed: f32, health: u32) -> Self {
        let health = health.max(1);
        Self {
            id,
            kind,
            pos,
            speed,
            health,
            max_health: health,
            active: true,
            hit_flash: 0.0,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.kind.size()
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size())
    }

    /// Fall by `speed`, normalized to a 60 fps frame
    pub fn update(&mut self, dt_ms: f32) {
        self.pos.y += self.speed * frame_factor(dt_ms);
        if self.hit_flash > 0.0 {
            self.hit_flash = (self.hit_flash - dt_ms / 200.0).max(0.0);
        }
    }

    /// Low-performance update: off-screen objects keep falling but skip
    /// their hit flash. Returns whether the full update ran.
    pub fn update_if_visible(&mut self, dt_ms: f32, canvas: Vec2) -> bool {
        if self.is_visible(canvas) {
            self.update(dt_ms);
            true
        } else {
            self.pos.y += self.speed * frame_factor(dt_ms);
            false
        }
    }

    /// Within the canvas grown by one sprite size on each side
    pub fn is_visible(&self, canvas: Vec2) -> bool {
        let size = self.size();
        self.pos.y > -size.y
            && self.pos.y < canvas.y + size.y
            && self.pos.x > -size.x
            && self.pos.x < canvas.x + size.x
    }

    /// Apply damage. Returns true when this hit destroyed the object.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if !self.active {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        self.hit_flash = 1.0;

        if self.health == 0 {
            self.active = false;
            return true;
        }

        if self.health == 1 && self.max_health > 1 {
            if let Some(kind) = self.kind.downgraded() {
                self.kind = kind;
            }
        }
        false
    }

    pub fn health_fraction(&self) -> f32 {
        self.health as f32 / self.max_health as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;

    fn object(kind: ObjectKind) -> GameObject {
        GameObject::new(1, kind, Vec2::new(100.0, 0.0), 3.0, kind.spawn_health())
    }

    #[test]
    fn test_update_is_frame_rate_independent() {
        let mut a = object(ObjectKind::Obstacle);
        let mut b = object(ObjectKind::Obstacle);
        a.update(FRAME_MS * 2.0);
        b.update(FRAME_MS);
        b.update(FRAME_MS);
        assert!((a.pos.y - 6.0).abs() < 1e-3);
        assert!((a.pos.y - b.pos.y).abs() < 1e-3);
    }

    #[test]
    fn test_armored_snowman_downgrades_then_dies() {
        let mut snowman = object(ObjectKind::ArmoredSnowman);
        assert_eq!(snowman.health, 2);

        assert!(!snowman.take_damage(1));
        assert_eq!(snowman.kind, ObjectKind::SnowmanObstacle);
        assert!(snowman.active);

        assert!(snowman.take_damage(1));
        assert!(!snowman.active);
        assert_eq!(snowman.health, 0);
    }

    #[test]
    fn test_reinforced_downgrades_to_plain_obstacle() {
        let mut tree = object(ObjectKind::ReinforcedObstacle);
        tree.take_damage(1);
        assert_eq!(tree.kind, ObjectKind::Obstacle);
        assert_eq!(tree.max_health, 2);
    }

    #[test]
    fn test_overkill_clamps_health_at_zero() {
        let mut tree = object(ObjectKind::ReinforcedObstacle);
        assert!(tree.take_damage(10));
        assert_eq!(tree.health, 0);
        // Already destroyed: further hits report nothing
        assert!(!tree.take_damage(1));
    }

    #[test]
    fn test_health_never_spawns_below_one() {
        let obj = GameObject::new(1, ObjectKind::Gift, Vec2::ZERO, 2.0, 0);
        assert_eq!(obj.health, 1);
        assert_eq!(obj.max_health, 1);
    }

    #[test]
    fn test_visibility_window() {
        let canvas = Vec2::new(480.0, 800.0);
        let mut obj = object(ObjectKind::Obstacle);
        obj.pos.y = -50.0;
        assert!(obj.is_visible(canvas));
        obj.pos.y = 900.0;
        assert!(!obj.is_visible(canvas));
    }

    #[test]
    fn test_off_screen_objects_still_fall() {
        let canvas = Vec2::new(480.0, 800.0);
        // A gift spawned at -50 is fully above the canvas
        let mut gift = GameObject::new(1, ObjectKind::Gift, Vec2::new(100.0, -50.0), 3.0, 1);
        gift.hit_flash = 1.0;
        assert!(!gift.update_if_visible(FRAME_MS, canvas));
        assert!((gift.pos.y + 47.0).abs() < 1e-3);
        assert_eq!(gift.hit_flash, 1.0);

        gift.pos.y = 100.0;
        assert!(gift.update_if_visible(FRAME_MS, canvas));
        assert!(gift.hit_flash < 1.0);
    }

    #[test]
    fn test_bonus_classification() {
        let bonuses: Vec<_> = ObjectKind::ALL.iter().filter(|k| k.is_bonus()).collect();
        assert_eq!(bonuses.len(), 4);
        assert!(ObjectKind::ArmoredSnowman.is_obstacle());
        assert!(!ObjectKind::Gift.is_obstacle());
    }
}
