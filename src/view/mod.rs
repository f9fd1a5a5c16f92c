//! Presentation boundary
//!
//! The simulation never draws. Each frame the host captures a [`Snapshot`] and
//! hands it to [`draw_frame`] together with its [`Canvas`] implementation and
//! an [`AssetCache`]. Missing or failed images fall back to colored rectangles.

pub mod assets;
pub mod snapshot;

use glam::Vec2;
use serde::Serialize;

use crate::sim::background::Theme;
use crate::sim::collision::Rect;
use crate::sim::object::ObjectKind;

pub use assets::{AssetCache, AssetProvider, AssetStatus, Drawable, ImageHandle, StaticAssets};
pub use snapshot::{BossView, Hud, MultiplierStatus, ObjectView, SleighView, Snapshot};

/// Linear RGBA, 0..=1
pub type Rgba = [f32; 4];

const WHITE: Rgba = [1.0, 1.0, 1.0, 1.0];
const HUD_TEXT: Rgba = [1.0, 1.0, 1.0, 0.9];
const PROJECTILE: Rgba = [0.9, 0.2, 0.15, 1.0];
const HEALTH_BACK: Rgba = [0.2, 0.2, 0.2, 0.8];
const HEALTH_FILL: Rgba = [0.85, 0.1, 0.1, 1.0];

/// Drawing surface supplied by the host
pub trait Canvas {
    fn clear(&mut self, color: Rgba);

    fn fill_rect(&mut self, rect: Rect, color: Rgba);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba);

    /// Draw an image into `rect`, rotated about its center
    fn draw_image(&mut self, image: ImageHandle, rect: Rect, rotation: f32, alpha: f32);

    fn fill_text(&mut self, text: &str, pos: Vec2, color: Rgba);
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    Clear(Rgba),
    Rect { rect: Rect, color: Rgba },
    Circle { center: Vec2, radius: f32, color: Rgba },
    Image { image: ImageHandle, rect: Rect, rotation: f32, alpha: f32 },
    Text { text: String, pos: Vec2, color: Rgba },
}

/// Canvas that records commands for a host to replay
#[derive(Debug, Clone, Default, Serialize)]
pub struct DisplayList {
    pub commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Canvas for DisplayList {
    fn clear(&mut self, color: Rgba) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.commands.push(DrawCommand::Rect { rect, color });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Circle { center, radius, color });
    }

    fn draw_image(&mut self, image: ImageHandle, rect: Rect, rotation: f32, alpha: f32) {
        self.commands.push(DrawCommand::Image {
            image,
            rect,
            rotation,
            alpha,
        });
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, color: Rgba) {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            pos,
            color,
        });
    }
}

/// Sprites drawn as images vs. placeholders in one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrawStats {
    pub images: usize,
    pub placeholders: usize,
}

fn sky_color(theme: Theme, night: bool) -> Rgba {
    match (theme, night) {
        (Theme::Forest, false) => [0.55, 0.75, 0.9, 1.0],
        (Theme::Forest, true) => [0.08, 0.1, 0.22, 1.0],
        (Theme::City, false) => [0.6, 0.65, 0.75, 1.0],
        (Theme::City, true) => [0.1, 0.08, 0.18, 1.0],
    }
}

fn ground_color(theme: Theme) -> Rgba {
    match theme {
        Theme::Forest => [0.92, 0.95, 0.98, 0.35],
        Theme::City => [0.4, 0.4, 0.45, 0.35],
    }
}

/// Fallback color per object kind
fn placeholder_color(kind: ObjectKind) -> Rgba {
    match kind {
        ObjectKind::Obstacle => [0.35, 0.25, 0.15, 1.0],
        ObjectKind::SnowmanObstacle => [0.95, 0.95, 0.95, 1.0],
        ObjectKind::LampPostObstacle => [0.3, 0.3, 0.35, 1.0],
        ObjectKind::ReinforcedObstacle => [0.5, 0.35, 0.2, 1.0],
        ObjectKind::ArmoredSnowman => [0.6, 0.65, 0.7, 1.0],
        ObjectKind::Gift => [0.85, 0.15, 0.2, 1.0],
        ObjectKind::ExtraLife => [0.95, 0.3, 0.55, 1.0],
        ObjectKind::SnowBlower => [0.3, 0.7, 0.95, 1.0],
        ObjectKind::MoveSpeedBoost => [0.95, 0.8, 0.2, 1.0],
    }
}

fn with_alpha(color: Rgba, alpha: f32) -> Rgba {
    [color[0], color[1], color[2], color[3] * alpha.clamp(0.0, 1.0)]
}

/// Draw `key` into `rect`, or a flat rectangle when the image isn't available
fn sprite(
    canvas: &mut impl Canvas,
    assets: &mut AssetCache,
    stats: &mut DrawStats,
    key: &str,
    rect: Rect,
    rotation: f32,
    fallback: Rgba,
) {
    match assets.resolve(key) {
        Drawable::Image(image) => {
            canvas.draw_image(image, rect, rotation, 1.0);
            stats.images += 1;
        }
        Drawable::Placeholder => {
            canvas.fill_rect(rect, fallback);
            stats.placeholders += 1;
        }
    }
}

/// Render one frame
pub fn draw_frame(snapshot: &Snapshot, canvas: &mut impl Canvas, assets: &mut AssetCache) -> DrawStats {
    let mut stats = DrawStats::default();
    let size = snapshot.canvas;
    let bg = &snapshot.background;

    canvas.clear(sky_color(bg.theme, bg.night));

    // Two scrolling ground bands
    let band = size.y / 2.0;
    for i in 0..2 {
        let y = (bg.offset % band) + band * i as f32 - band / 2.0;
        canvas.fill_rect(Rect::new(0.0, y, size.x, band / 4.0), ground_color(bg.theme));
    }

    for flake in &bg.snowflakes {
        canvas.fill_circle(
            flake.pos,
            flake.size,
            with_alpha(WHITE, flake.opacity * bg.visibility),
        );
    }

    for object in &snapshot.objects {
        let rect = Rect::from_pos_size(object.pos, object.size);
        sprite(
            canvas,
            assets,
            &mut stats,
            object.kind.as_str(),
            rect,
            0.0,
            placeholder_color(object.kind),
        );
        if object.hit_flash > 0.0 {
            canvas.fill_rect(rect, with_alpha(WHITE, object.hit_flash));
        }
    }

    for snowball in &snapshot.snowballs {
        let radius = snowball.size.x / 2.0;
        canvas.fill_circle(snowball.pos + Vec2::splat(radius), radius, WHITE);
    }

    let sleigh = &snapshot.sleigh;
    sprite(
        canvas,
        assets,
        &mut stats,
        sleigh.variant.as_str(),
        Rect::from_pos_size(sleigh.pos, sleigh.size),
        sleigh.tilt,
        [0.7, 0.1, 0.1, 1.0],
    );
    if sleigh.glow > 0.0 {
        canvas.fill_circle(
            sleigh.pos + sleigh.size / 2.0,
            sleigh.size.x * 0.6,
            with_alpha([1.0, 0.9, 0.4, 1.0], sleigh.glow * 0.4),
        );
    }

    if let Some(boss) = snapshot.boss.as_ref().filter(|boss| boss.active) {
        sprite(
            canvas,
            assets,
            &mut stats,
            assets::BOSS_KEY,
            Rect::from_pos_size(boss.pos, boss.size),
            0.0,
            [0.25, 0.5, 0.3, 1.0],
        );
        for projectile in &boss.projectiles {
            let radius = projectile.size.x / 2.0;
            canvas.fill_circle(projectile.pos + Vec2::splat(radius), radius, PROJECTILE);
        }

        let bar = Rect::new(boss.pos.x, boss.pos.y - 10.0, boss.size.x, 6.0);
        canvas.fill_rect(bar, HEALTH_BACK);
        canvas.fill_rect(
            Rect::new(bar.x, bar.y, bar.width * boss.health_fraction, bar.height),
            HEALTH_FILL,
        );
    }

    if bg.darkness > 0.0 {
        canvas.fill_rect(
            Rect::new(0.0, 0.0, size.x, size.y),
            [0.0, 0.0, 0.05, bg.darkness.clamp(0.0, 1.0)],
        );
    }

    draw_hud(snapshot, canvas);
    stats
}

fn draw_hud(snapshot: &Snapshot, canvas: &mut impl Canvas) {
    let hud = &snapshot.hud;
    canvas.fill_text(&format!("Score: {}", hud.score), Vec2::new(10.0, 24.0), HUD_TEXT);
    canvas.fill_text(&format!("Lives: {}", hud.lives.max(0)), Vec2::new(10.0, 48.0), HUD_TEXT);
    canvas.fill_text(&hud.distance_label, Vec2::new(snapshot.canvas.x - 90.0, 24.0), HUD_TEXT);

    if snapshot.show_fps {
        canvas.fill_text(
            &format!("{:.0} FPS", snapshot.fps),
            Vec2::new(snapshot.canvas.x - 90.0, 48.0),
            HUD_TEXT,
        );
    }

    let banner = if snapshot.game_won {
        Some("You saved Christmas!")
    } else if snapshot.game_over {
        Some("Game Over")
    } else {
        None
    };
    if let Some(text) = banner {
        canvas.fill_text(text, snapshot.canvas / 2.0, WHITE);
    }
}
