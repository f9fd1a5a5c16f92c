//! Axis-aligned bounding boxes
//!
//! Every entity exposes a `Rect` through `bounds()`; any hitbox forgiveness
//! (the sleigh inset) is already baked in, so the test itself has none.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Shrink by `amount` on every side (never below zero size)
    pub fn inset(&self, amount: f32) -> Self {
        Self {
            x: self.x + amount,
            y: self.y + amount,
            width: (self.width - amount * 2.0).max(0.0),
            height: (self.height - amount * 2.0).max(0.0),
        }
    }
}

/// Two rectangles collide iff they overlap on both axes; touching edges do not
#[inline]
pub fn check_collision(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_rects_collide() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(check_collision(&a, &b));
        assert!(check_collision(&b, &a));
    }

    #[test]
    fn test_overlap_on_one_axis_only_misses() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        // Same row, disjoint columns
        assert!(!check_collision(&a, &Rect::new(20.0, 0.0, 10.0, 10.0)));
        // Same column, disjoint rows
        assert!(!check_collision(&a, &Rect::new(0.0, 20.0, 10.0, 10.0)));
    }

    #[test]
    fn test_touching_edges_do_not_collide() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(!check_collision(&a, &b));
    }

    #[test]
    fn test_containment_collides() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 5.0, 5.0);
        assert!(check_collision(&outer, &inner));
        assert!(check_collision(&inner, &outer));
    }

    #[test]
    fn test_inset_shrinks_symmetrically() {
        let r = Rect::new(10.0, 20.0, 64.0, 48.0).inset(8.0);
        assert_eq!(r, Rect::new(18.0, 28.0, 48.0, 32.0));
        assert_eq!(Rect::new(0.0, 0.0, 4.0, 4.0).inset(8.0).width, 0.0);
    }
}
