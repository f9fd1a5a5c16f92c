//! Zone sections: obstacle mix, spawn shaping and special events
//!
//! A section is a policy object picked by zone number. The core only talks
//! to `dyn Section`; new zones are added by registering another factory in
//! the [`SectionManager`].

pub mod city;
pub mod forest;
pub mod manager;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::SimRng;
use super::background::{Background, Theme};
use super::object::ObjectKind;
use super::state::GameState;

pub use city::CitySection;
pub use forest::ForestSection;
pub use manager::{SectionFactory, SectionInfo, SectionManager, SectionProgress};

/// Weighted pick: draw in `0..total` and return the first item whose
/// cumulative weight exceeds the draw
///
/// Zero-weight items are never chosen. An all-zero table falls back to the
/// first item; an empty one yields `None`.
pub fn weighted_select<T: Copy, R: Rng>(items: &[(T, u32)], rng: &mut R) -> Option<T> {
    let total: u64 = items.iter().map(|&(_, w)| u64::from(w)).sum();
    if total == 0 {
        return items.first().map(|&(item, _)| item);
    }

    let draw = rng.random_range(0..total);
    let mut cumulative = 0u64;
    for &(item, weight) in items {
        cumulative += u64::from(weight);
        if cumulative > draw {
            return Some(item);
        }
    }
    items.first().map(|&(item, _)| item)
}

/// What sections may mutate while initializing or handling an event
pub struct SectionHost<'a> {
    pub background: &'a mut Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialEventKind {
    Snowstorm,
    ForestBlessing,
    ClearPath,
    RushHour,
    Blackout,
    ChristmasParty,
}

impl SpecialEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialEventKind::Snowstorm => "snowstorm",
            SpecialEventKind::ForestBlessing => "forest_blessing",
            SpecialEventKind::ClearPath => "clear_path",
            SpecialEventKind::RushHour => "rush_hour",
            SpecialEventKind::Blackout => "blackout",
            SpecialEventKind::ChristmasParty => "christmas_party",
        }
    }
}

/// Temporary modifiers an event applies while it lasts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventEffects {
    pub visibility: f32,
    pub snow_intensity: f32,
    pub darkness: f32,
    /// Multiplies the spawn interval (above 1 spawns less)
    pub spawn_interval_factor: f32,
    /// Multiplies gift points
    pub gift_factor: f32,
    /// Overrides the bonus band of the wave roll
    pub bonus_chance: Option<u32>,
    /// Overrides the life band of the wave roll
    pub life_chance: Option<u32>,
    /// Multiplies every gift pickup on top of `gift_factor`
    pub score_factor: f32,
    /// Multiplies the falling speed of new objects
    pub object_speed_factor: f32,
}

impl EventEffects {
    pub const NEUTRAL: EventEffects = EventEffects {
        visibility: 1.0,
        snow_intensity: 1.0,
        darkness: 0.0,
        spawn_interval_factor: 1.0,
        gift_factor: 1.0,
        bonus_chance: None,
        life_chance: None,
        score_factor: 1.0,
        object_speed_factor: 1.0,
    };

    pub fn changes_atmosphere(&self) -> bool {
        self.visibility != 1.0 || self.snow_intensity != 1.0 || self.darkness != 0.0
    }
}

impl Default for EventEffects {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// A triggered section event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpecialEvent {
    pub kind: SpecialEventKind,
    pub duration_ms: f64,
    pub effects: EventEffects,
}

/// Distance-windowed, probabilistic event trigger
#[derive(Debug, Clone, Copy)]
pub struct EventRule {
    pub kind: SpecialEventKind,
    /// Exclusive distance window
    pub after: f32,
    pub before: f32,
    /// Only fires at or below this many lives
    pub max_lives: Option<i32>,
    pub chance: f64,
    pub duration_ms: f64,
    pub effects: EventEffects,
}

impl EventRule {
    fn applies(&self, state: &GameState) -> bool {
        let d = state.distance_traveled;
        d > self.after && d < self.before && self.max_lives.is_none_or(|max| state.lives <= max)
    }

    fn event(&self) -> SpecialEvent {
        SpecialEvent {
            kind: self.kind,
            duration_ms: self.duration_ms,
            effects: self.effects,
        }
    }
}

/// One stage of a section's level progression
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelStage {
    pub level: u32,
    pub name: &'static str,
    /// Distance and score that complete this stage
    pub max_distance: f32,
    pub score_required: u64,
    /// Spawn rate factor for this stage
    pub spawn_rate: f32,
    pub obstacles: &'static [ObjectKind],
}

/// Obstacle-mix, spawn-shaping and event policy for one zone
pub trait Section {
    fn name(&self) -> &'static str;

    fn theme(&self) -> Theme;

    fn difficulty_multiplier(&self) -> f32 {
        1.0
    }

    fn description(&self) -> &'static str {
        ""
    }

    fn initialize(&self, host: &mut SectionHost<'_>) {
        host.background.set_theme(self.theme());
        host.background.reset_atmosphere();
        log::info!("Section loaded: {}", self.name());
    }

    /// Relative obstacle weights at `level`
    fn obstacle_weights(&self, level: u32) -> Vec<(ObjectKind, u32)>;

    fn select_obstacle(&self, level: u32, rng: &mut SimRng) -> ObjectKind {
        weighted_select(&self.obstacle_weights(level), rng).unwrap_or(ObjectKind::Obstacle)
    }

    /// Shape the spawn interval for this zone and level
    fn calculate_spawn_rate(&self, base_interval_ms: f32, _level: u32) -> f32 {
        base_interval_ms * self.difficulty_multiplier()
    }

    fn event_rules(&self) -> &'static [EventRule] {
        &[]
    }

    /// Roll every rule whose window is open, first hit wins
    fn check_special_events(&self, state: &GameState, rng: &mut SimRng) -> Option<SpecialEvent> {
        self.event_rules()
            .iter()
            .filter(|rule| rule.applies(state))
            .find(|rule| rng.random_bool(rule.chance.clamp(0.0, 1.0)))
            .map(EventRule::event)
    }

    fn handle_special_event(&self, event: &SpecialEvent, host: &mut SectionHost<'_>) {
        let effects = &event.effects;
        if effects.changes_atmosphere() {
            host.background.set_visibility(effects.visibility);
            host.background.set_snow_intensity(effects.snow_intensity);
            host.background.set_darkness(effects.darkness);
        }
        log::info!(
            "{}: {} for {:.1}s",
            self.name(),
            event.kind.as_str(),
            event.duration_ms / 1000.0
        );
    }

    fn levels(&self) -> &'static [LevelStage];

    /// Stage for `level`, the last one past the end
    fn stage(&self, level: u32) -> Option<&'static LevelStage> {
        let levels = self.levels();
        levels
            .iter()
            .find(|stage| stage.level == level)
            .or_else(|| levels.last().filter(|last| level > last.level))
    }

    fn level_info(&self, level: u32) -> Option<LevelStage> {
        self.levels().iter().find(|stage| stage.level == level).copied()
    }

    /// Final stage completed on distance and score
    fn is_completed(&self, state: &GameState) -> bool {
        self.levels().last().is_some_and(|last| {
            state.distance_traveled >= last.max_distance && state.score >= last.score_required
        })
    }
}
