//! Spawning policy: wave composition, dynamic interval and spawn speed

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::SimRng;
use super::object::ObjectKind;
use super::section::Section;
use crate::config::{DistanceMultiplier, PerformanceConfig, SpawnConfig};

/// FPS ratio bands for the base interval
const SLOW_FPS_RATIO: f32 = 0.8;
const FAST_FPS_RATIO: f32 = 1.1;
const SLOW_FPS_FACTOR: f32 = 1.4;
const FAST_FPS_FACTOR: f32 = 0.8;
/// Difficulty is clamped to this band before dividing the interval
const DIFFICULTY_BAND: (f32, f32) = (0.5, 2.0);
/// Spawn speed only follows difficulty up to this factor
const MAX_SPEED_DIFFICULTY: f32 = 1.5;
/// Extra horizontal room kept free on the right of the spawn band
const SPAWN_RIGHT_PADDING: f32 = 50.0;
/// Life bonuses keep this much room on the right
const LIFE_BONUS_RIGHT_PADDING: f32 = 40.0;
/// Lives below which the wave roll may produce a life
const WAVE_LIFE_MAX_LIVES: i32 = 2;

/// Everything the dynamic interval depends on besides config
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRateInputs {
    pub fps: f32,
    pub level: u32,
    pub distance: f32,
    pub difficulty: f32,
    /// Active section event factor (1.0 without one)
    pub event_factor: f32,
    pub low_performance: bool,
}

/// Base interval from the frame rate: spawn less on slow devices
pub fn performance_base_interval(fps: f32, spawn: &SpawnConfig, perf: &PerformanceConfig) -> f32 {
    let ratio = fps / perf.target_fps;
    if ratio < SLOW_FPS_RATIO {
        spawn.base_interval_ms * SLOW_FPS_FACTOR
    } else if ratio > FAST_FPS_RATIO {
        spawn.base_interval_ms * FAST_FPS_FACTOR
    } else {
        spawn.base_interval_ms
    }
}

/// Multiplier of the furthest table entry already reached
pub fn distance_spawn_multiplier(distance: f32, table: &[DistanceMultiplier]) -> f32 {
    table
        .iter()
        .rev()
        .find(|entry| distance >= entry.distance)
        .map_or(1.0, |entry| entry.spawn_multiplier)
}

/// Interval until the next wave item, always inside the configured band
pub fn calculate_dynamic_spawn_rate(
    section: &dyn Section,
    inputs: &SpawnRateInputs,
    spawn: &SpawnConfig,
    perf: &PerformanceConfig,
) -> f32 {
    let mut interval = performance_base_interval(inputs.fps, spawn, perf);
    interval = section.calculate_spawn_rate(interval, inputs.level);

    let distance_multiplier = distance_spawn_multiplier(inputs.distance, &spawn.distance_multipliers);
    if distance_multiplier > 0.0 {
        interval /= distance_multiplier;
    }

    let (low, high) = DIFFICULTY_BAND;
    let difficulty = if inputs.difficulty.is_finite() {
        inputs.difficulty.clamp(low, high)
    } else {
        1.0
    };
    interval /= difficulty;

    interval *= inputs.event_factor;
    if inputs.low_performance {
        interval *= perf.low_performance_spawn_factor;
    }

    if interval.is_finite() {
        interval.clamp(spawn.min_interval_ms, spawn.max_interval_ms)
    } else {
        spawn.max_interval_ms
    }
}

/// Falling speed for newly spawned objects
pub fn spawn_speed(level: u32, difficulty: f32, spawn: &SpawnConfig) -> f32 {
    let level_factor = 1.0 + level.saturating_sub(1) as f32 * spawn.level_speed_step;
    let difficulty = difficulty.clamp(0.0, MAX_SPEED_DIFFICULTY);
    (spawn.base_object_speed * level_factor * difficulty).min(spawn.max_object_speed)
}

/// Left edge for a wave item
pub fn spawn_x(rng: &mut SimRng, canvas_width: f32, spawn: &SpawnConfig) -> f32 {
    let span = (canvas_width - spawn.margin * 2.0 - SPAWN_RIGHT_PADDING).max(0.0);
    spawn.margin + rng.random::<f32>() * span
}

/// Left edge for an emergency life bonus
pub fn life_bonus_x(rng: &mut SimRng, canvas_width: f32) -> f32 {
    rng.random::<f32>() * (canvas_width - LIFE_BONUS_RIGHT_PADDING).max(0.0)
}

/// Probability bands (percent) for one wave roll
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveChances {
    pub life: u32,
    pub bonus: u32,
    pub gift: u32,
    /// A section event is boosting lives, open the life band below full lives
    pub life_boosted: bool,
}

impl WaveChances {
    pub fn from_config(spawn: &SpawnConfig) -> Self {
        Self {
            life: spawn.life_chance,
            bonus: spawn.bonus_chance,
            gift: spawn.gift_chance,
            life_boosted: false,
        }
    }
}

/// Pick the kind of the next wave item
///
/// Bands are evaluated in order: life (only when lives are low), bonus
/// (snow blower or speed boost, even odds), gift, then the section's
/// weighted obstacle for `level`.
pub fn roll_wave_kind(
    rng: &mut SimRng,
    chances: &WaveChances,
    lives: i32,
    section: &dyn Section,
    level: u32,
) -> ObjectKind {
    let roll = rng.random::<f32>() * 100.0;
    let life_edge = chances.life as f32;
    let bonus_edge = life_edge + chances.bonus as f32;
    let gift_edge = bonus_edge + chances.gift as f32;
    let life_allowed = lives < WAVE_LIFE_MAX_LIVES || (chances.life_boosted && lives <= WAVE_LIFE_MAX_LIVES);

    if roll < life_edge && life_allowed {
        ObjectKind::ExtraLife
    } else if roll < bonus_edge {
        if rng.random_bool(0.5) {
            ObjectKind::SnowBlower
        } else {
            ObjectKind::MoveSpeedBoost
        }
    } else if roll < gift_edge {
        ObjectKind::Gift
    } else {
        section.select_obstacle(level, rng)
    }
}

/// Wave bookkeeping and the spawn timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spawner {
    pub last_spawn_ms: f64,
    pub interval_ms: f32,
    pub objects_in_wave: u32,
    pub wave_size: u32,
}

impl Spawner {
    /// The first wave item still waits out the initial interval
    pub fn new(spawn: &SpawnConfig) -> Self {
        Self {
            last_spawn_ms: 0.0,
            interval_ms: spawn.initial_interval_ms,
            objects_in_wave: 0,
            wave_size: spawn.min_wave_size,
        }
    }

    pub fn reset(&mut self, spawn: &SpawnConfig, now_ms: f64) {
        *self = Self::new(spawn);
        self.last_spawn_ms = now_ms;
    }

    pub fn is_due(&self, now_ms: f64) -> bool {
        now_ms - self.last_spawn_ms > f64::from(self.interval_ms)
    }

    /// Start a new wave once the current one is full; sizes are either end of the band
    pub fn prepare_wave(&mut self, rng: &mut SimRng, spawn: &SpawnConfig) {
        if self.objects_in_wave >= self.wave_size {
            self.objects_in_wave = 0;
            self.wave_size = if rng.random_bool(0.5) {
                spawn.min_wave_size
            } else {
                spawn.max_wave_size
            };
        }
    }

    pub fn record_spawn(&mut self, now_ms: f64, next_interval_ms: f32) {
        self.objects_in_wave += 1;
        self.last_spawn_ms = now_ms;
        self.interval_ms = next_interval_ms;
    }

    /// Low-performance penalty on the running interval
    pub fn slow_down(&mut self, factor: f32) {
        self.interval_ms = (self.interval_ms * factor).floor();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::section::{CitySection, ForestSection};
    use rand::SeedableRng;

    fn inputs() -> SpawnRateInputs {
        SpawnRateInputs {
            fps: 60.0,
            level: 1,
            distance: 0.0,
            difficulty: 1.0,
            event_factor: 1.0,
            low_performance: false,
        }
    }

    #[test]
    fn test_baseline_interval() {
        let spawn = SpawnConfig::default();
        let perf = PerformanceConfig::default();
        let rate = calculate_dynamic_spawn_rate(&ForestSection, &inputs(), &spawn, &perf);
        assert_eq!(rate, 1000.0);
    }

    #[test]
    fn test_distance_and_level_speed_up_spawning() {
        let spawn = SpawnConfig::default();
        let perf = PerformanceConfig::default();
        let rate = calculate_dynamic_spawn_rate(
            &ForestSection,
            &SpawnRateInputs {
                level: 2,
                distance: 2500.0,
                ..inputs()
            },
            &spawn,
            &perf,
        );
        // 1000 / 1.2 / 1.3
        assert!((rate - 641.0256).abs() < 0.01);
    }

    #[test]
    fn test_slow_fps_is_capped_by_max() {
        let spawn = SpawnConfig::default();
        let perf = PerformanceConfig::default();
        let rate = calculate_dynamic_spawn_rate(
            &CitySection,
            &SpawnRateInputs { fps: 10.0, ..inputs() },
            &spawn,
            &perf,
        );
        assert_eq!(rate, spawn.max_interval_ms);
    }

    #[test]
    fn test_non_finite_inputs_map_into_band() {
        let spawn = SpawnConfig::default();
        let perf = PerformanceConfig::default();
        for fps in [f32::NAN, f32::INFINITY, 0.0, -5.0] {
            let rate = calculate_dynamic_spawn_rate(
                &ForestSection,
                &SpawnRateInputs {
                    fps,
                    difficulty: f32::NAN,
                    event_factor: f32::INFINITY,
                    ..inputs()
                },
                &spawn,
                &perf,
            );
            assert!(rate >= spawn.min_interval_ms && rate <= spawn.max_interval_ms);
        }
    }

    #[test]
    fn test_distance_multiplier_table() {
        let table = SpawnConfig::default().distance_multipliers;
        assert_eq!(distance_spawn_multiplier(0.0, &table), 1.0);
        assert_eq!(distance_spawn_multiplier(999.0, &table), 1.0);
        assert_eq!(distance_spawn_multiplier(1000.0, &table), 1.15);
        assert_eq!(distance_spawn_multiplier(50_000.0, &table), 1.5);
        assert_eq!(distance_spawn_multiplier(10.0, &[]), 1.0);
    }

    #[test]
    fn test_spawn_speed() {
        let spawn = SpawnConfig::default();
        assert_eq!(spawn_speed(1, 1.0, &spawn), 3.0);
        assert!((spawn_speed(3, 1.0, &spawn) - 4.8).abs() < 1e-4);
        // Difficulty capped at 1.5
        assert!((spawn_speed(1, 3.0, &spawn) - 4.5).abs() < 1e-4);
        assert_eq!(spawn_speed(100, 1.5, &spawn), 12.0);
    }

    #[test]
    fn test_spawn_x_inside_margin() {
        let mut rng = SimRng::seed_from_u64(4);
        let spawn = SpawnConfig::default();
        for _ in 0..1000 {
            let x = spawn_x(&mut rng, 480.0, &spawn);
            assert!((40.0..390.0).contains(&x));
        }
    }

    #[test]
    fn test_no_wave_lives_at_two_lives() {
        let mut rng = SimRng::seed_from_u64(4);
        let chances = WaveChances::from_config(&SpawnConfig::default());
        for _ in 0..2000 {
            assert_ne!(roll_wave_kind(&mut rng, &chances, 2, &ForestSection, 1), ObjectKind::ExtraLife);
        }
    }

    #[test]
    fn test_wave_mix_covers_every_band() {
        let mut rng = SimRng::seed_from_u64(4);
        let chances = WaveChances::from_config(&SpawnConfig::default());
        let kinds: Vec<_> = (0..5000)
            .map(|_| roll_wave_kind(&mut rng, &chances, 1, &ForestSection, 1))
            .collect();
        for kind in [
            ObjectKind::ExtraLife,
            ObjectKind::SnowBlower,
            ObjectKind::MoveSpeedBoost,
            ObjectKind::Gift,
            ObjectKind::Obstacle,
        ] {
            assert!(kinds.contains(&kind), "{kind:?} never rolled");
        }
    }

    #[test]
    fn test_wave_sizes_are_band_ends() {
        let mut rng = SimRng::seed_from_u64(4);
        let spawn = SpawnConfig::default();
        let mut spawner = Spawner::new(&spawn);
        for i in 0..200 {
            spawner.prepare_wave(&mut rng, &spawn);
            assert!(spawner.wave_size == 3 || spawner.wave_size == 8);
            spawner.record_spawn(f64::from(i), 500.0);
        }
        assert!(spawner.is_due(700.0));
        assert!(!spawner.is_due(199.0 + 500.0));
    }
}
