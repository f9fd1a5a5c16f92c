//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time comes from the `dt_ms` passed to each update, never the wall clock
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies beyond the feedback sink

pub mod background;
pub mod boss;
pub mod collision;
pub mod multiplier;
pub mod object;
pub mod schedule;
pub mod section;
pub mod sleigh;
pub mod snowball;
pub mod spawn;
pub mod state;
pub mod tick;

/// RNG driving every random choice in a run
pub type SimRng = rand_pcg::Pcg32;

pub use background::{Background, Theme};
pub use boss::{Boss, BossPhase, BossProjectile, Rage};
pub use collision::{Rect, check_collision};
pub use multiplier::{Multiplier, MultiplierKind, Multipliers};
pub use object::{GameObject, ObjectKind};
pub use schedule::Scheduler;
pub use section::{
    CitySection, ForestSection, Section, SectionHost, SectionManager, SpecialEvent,
    SpecialEventKind, weighted_select,
};
pub use sleigh::Sleigh;
pub use snowball::Snowball;
pub use spawn::{SpawnRateInputs, Spawner, WaveChances, calculate_dynamic_spawn_rate};
pub use state::{GameState, LevelAdvance, RunStats, STARTING_LIVES};
pub use tick::{ActiveEvent, FpsCounter, Game, TickInput};
