//! Sleigh Rush - a scrolling sleigh shooter
//!
//! Core modules:
//! - `sim`: Simulation core (entities, sections, spawning, collisions, game loop)
//! - `view`: Read-only snapshots, drawing interface and asset resolution
//! - `platform`: Host capabilities (haptic feedback, logging setup)
//! - `config`: Data-driven game balance
//! - `settings`: Player preferences

pub mod config;
pub mod error;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod view;

pub use config::GameConfig;
pub use error::{ConfigError, SectionError};
pub use settings::{Settings, SleighVariant};
pub use sim::{Game, TickInput};

/// Game configuration constants
pub mod consts {
    /// Frame duration the per-frame speeds are tuned against (60 fps)
    pub const FRAME_MS: f32 = 16.67;
    /// Largest frame delta accepted by a tick (tab switches, debugger pauses).
    /// Distance follows game time, so after a long stall it trails the wall clock.
    pub const MAX_FRAME_MS: f32 = 250.0;

    /// Default playfield (portrait phone)
    pub const DEFAULT_CANVAS_WIDTH: f32 = 480.0;
    pub const DEFAULT_CANVAS_HEIGHT: f32 = 800.0;

    /// Sleigh sprite
    pub const SLEIGH_WIDTH: f32 = 64.0;
    pub const SLEIGH_HEIGHT: f32 = 48.0;
    /// Distance between the sleigh's start position and the canvas bottom
    pub const SLEIGH_START_OFFSET: f32 = 50.0;

    /// Snowball sprite and speed (pixels per frame, upward)
    pub const SNOWBALL_SIZE: f32 = 12.0;
    pub const SNOWBALL_SPEED: f32 = 12.0;

    /// Boss sprite
    pub const BOSS_SIZE: f32 = 96.0;
    /// Boss resting height once it has descended
    pub const BOSS_REST_Y: f32 = 50.0;

    /// Objects spawn just above the visible canvas
    pub const SPAWN_Y: f32 = -50.0;
    /// Objects further than this below the canvas are dropped
    pub const CLEANUP_MARGIN: f32 = 100.0;
    /// Snowballs above this y are dropped
    pub const SNOWBALL_CLEANUP_Y: f32 = -50.0;
}

/// Frame-rate normalisation factor: 1.0 for a 60 fps frame
#[inline]
pub fn frame_factor(dt_ms: f32) -> f32 {
    dt_ms / consts::FRAME_MS
}
