//! Read-only frame data for presentation
//!
//! A snapshot is gathered once per frame from the game and owns everything a
//! drawing pass or a host UI needs, so nothing downstream borrows the game.

use glam::Vec2;
use serde::Serialize;

use crate::settings::SleighVariant;
use crate::sim::background::{Snowflake, Theme};
use crate::sim::boss::{BossPhase, Rage};
use crate::sim::multiplier::MultiplierKind;
use crate::sim::object::ObjectKind;
use crate::sim::section::SpecialEventKind;
use crate::sim::{Game, Snowball};

#[derive(Debug, Clone, Serialize)]
pub struct ObjectView {
    pub id: u32,
    pub kind: ObjectKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub health_fraction: f32,
    pub hit_flash: f32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SnowballView {
    pub pos: Vec2,
    pub size: Vec2,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProjectileView {
    pub pos: Vec2,
    pub size: Vec2,
}

#[derive(Debug, Clone, Serialize)]
pub struct BossView {
    pub pos: Vec2,
    pub size: Vec2,
    pub health: u32,
    pub max_health: u32,
    pub health_fraction: f32,
    pub phase: BossPhase,
    pub rage: Rage,
    pub active: bool,
    pub projectiles: Vec<ProjectileView>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SleighView {
    pub pos: Vec2,
    pub size: Vec2,
    pub tilt: f32,
    pub glow: f32,
    pub boosted: bool,
    pub variant: SleighVariant,
}

#[derive(Debug, Clone, Serialize)]
pub struct BackgroundView {
    pub theme: Theme,
    pub night: bool,
    pub offset: f32,
    pub darkness: f32,
    pub visibility: f32,
    pub snowflakes: Vec<Snowflake>,
}

/// Head-up display values
#[derive(Debug, Clone, Serialize)]
pub struct Hud {
    pub score: u64,
    pub lives: i32,
    pub level: u32,
    pub zone: u32,
    pub distance: f32,
    /// "523m" / "1.2km"
    pub distance_label: String,
    pub section: &'static str,
    pub stage: Option<&'static str>,
}

/// Remaining time per multiplier, zero when inactive
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MultiplierStatus {
    pub fire_ms: f64,
    pub speed_ms: f64,
    pub score_ms: f64,
}

impl MultiplierStatus {
    pub fn remaining(&self, kind: MultiplierKind) -> f64 {
        match kind {
            MultiplierKind::Fire => self.fire_ms,
            MultiplierKind::Speed => self.speed_ms,
            MultiplierKind::Score => self.score_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub canvas: Vec2,
    pub clock_ms: f64,
    pub hud: Hud,
    pub sleigh: SleighView,
    /// Draw order: ascending z-index, spawn order within a layer
    pub objects: Vec<ObjectView>,
    pub snowballs: Vec<SnowballView>,
    pub boss: Option<BossView>,
    pub background: BackgroundView,
    pub multipliers: MultiplierStatus,
    pub event: Option<SpecialEventKind>,
    pub firing: bool,
    pub game_over: bool,
    pub game_won: bool,
    pub fps: f32,
    pub low_performance: bool,
    pub show_fps: bool,
}

impl Snapshot {
    pub fn capture(game: &Game) -> Self {
        let state = game.state();
        let now = game.clock_ms();

        let mut objects: Vec<ObjectView> = game
            .objects()
            .iter()
            .filter(|o| o.active)
            .map(|o| ObjectView {
                id: o.id,
                kind: o.kind,
                pos: o.pos,
                size: o.size(),
                health_fraction: o.health_fraction(),
                hit_flash: o.hit_flash,
            })
            .collect();
        // Stable: equal layers keep spawn order
        objects.sort_by_key(|o| o.kind.z_index());

        let sleigh = game.sleigh();
        let background = game.background();
        let multipliers = game.multipliers();
        let section = game.current_section();

        Self {
            canvas: game.canvas_size(),
            clock_ms: now,
            hud: Hud {
                score: state.score,
                lives: state.lives,
                level: state.level,
                zone: state.zone,
                distance: state.distance_traveled,
                distance_label: state.formatted_distance(),
                section: section.name(),
                stage: section.level_info(state.level).map(|stage| stage.name),
            },
            sleigh: SleighView {
                pos: sleigh.pos,
                size: sleigh.size,
                tilt: sleigh.tilt,
                glow: sleigh.glow,
                boosted: sleigh.is_boosted(),
                variant: game.settings().sleigh,
            },
            objects,
            snowballs: game
                .snowballs()
                .iter()
                .filter(|s| s.active)
                .map(|s| SnowballView {
                    pos: s.pos,
                    size: Snowball::size(),
                })
                .collect(),
            boss: game.boss().map(|boss| BossView {
                pos: boss.pos,
                size: boss.size,
                health: boss.health,
                max_health: boss.max_health,
                health_fraction: boss.health_fraction(),
                phase: boss.phase,
                rage: boss.rage,
                active: boss.active,
                projectiles: boss
                    .projectiles
                    .iter()
                    .map(|p| ProjectileView {
                        pos: p.pos,
                        size: p.size,
                    })
                    .collect(),
            }),
            background: BackgroundView {
                theme: background.theme,
                night: background.is_night(),
                offset: background.offset,
                darkness: background.darkness,
                visibility: background.visibility,
                snowflakes: background.snowflakes.clone(),
            },
            multipliers: MultiplierStatus {
                fire_ms: multipliers.fire.remaining_ms(now),
                speed_ms: multipliers.speed.remaining_ms(now),
                score_ms: multipliers.score.remaining_ms(now),
            },
            event: game.active_event().map(|active| active.event.kind),
            firing: game.is_firing(),
            game_over: state.game_over,
            game_won: state.game_won,
            fps: game.fps(),
            low_performance: game.is_low_performance(),
            show_fps: game.settings().show_fps,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.game_over || self.game_won
    }
}
