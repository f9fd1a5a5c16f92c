//! Data-driven game balance
//!
//! Every tunable the simulation reads lives here. The core owns one
//! `GameConfig` and passes it by reference; nothing mutates a shared copy.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH};
use crate::error::ConfigError;

/// Playfield size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

/// Sleigh handling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SleighConfig {
    /// Maximum velocity (pixels per frame)
    pub max_velocity: f32,
    /// Fraction of the gap to the target velocity closed each input frame
    pub acceleration: f32,
    /// Velocity retained per frame while idle
    pub friction: f32,
    /// Joystick sensitivity applied to the target velocity
    pub sensitivity: f32,
    /// Distance kept from the canvas edges
    pub margin: f32,
    /// Hitbox inset on every side
    pub collision_tolerance: f32,
}

impl Default for SleighConfig {
    fn default() -> Self {
        Self {
            max_velocity: 15.0,
            acceleration: 0.9,
            friction: 0.82,
            sensitivity: 1.3,
            margin: 5.0,
            collision_tolerance: 8.0,
        }
    }
}

/// Spawn multiplier kicking in past a distance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceMultiplier {
    pub distance: f32,
    pub spawn_multiplier: f32,
}

/// Spawning policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Probability bands (out of 100), evaluated life → bonus → gift → obstacle
    pub life_chance: u32,
    pub bonus_chance: u32,
    pub gift_chance: u32,
    /// Wave size band
    pub min_wave_size: u32,
    pub max_wave_size: u32,
    /// Interval before the first spawn
    pub initial_interval_ms: f32,
    /// Interval at the performance baseline
    pub base_interval_ms: f32,
    /// Final clamp for the dynamic interval
    pub min_interval_ms: f32,
    pub max_interval_ms: f32,
    /// Distance-based spawn acceleration (ascending distance)
    pub distance_multipliers: Vec<DistanceMultiplier>,
    /// Horizontal spawn margin
    pub margin: f32,
    /// Falling speed at level 1 (pixels per frame)
    pub base_object_speed: f32,
    /// Falling speed increase per level
    pub level_speed_step: f32,
    pub max_object_speed: f32,
    /// Life bonus objects fall slower than the rest
    pub life_bonus_speed_factor: f32,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            life_chance: 2,
            bonus_chance: 8,
            gift_chance: 25,
            min_wave_size: 3,
            max_wave_size: 8,
            initial_interval_ms: 800.0,
            base_interval_ms: 1000.0,
            min_interval_ms: 300.0,
            max_interval_ms: 1000.0,
            distance_multipliers: vec![
                DistanceMultiplier { distance: 0.0, spawn_multiplier: 1.0 },
                DistanceMultiplier { distance: 1000.0, spawn_multiplier: 1.15 },
                DistanceMultiplier { distance: 2000.0, spawn_multiplier: 1.3 },
                DistanceMultiplier { distance: 3000.0, spawn_multiplier: 1.5 },
            ],
            margin: 40.0,
            base_object_speed: 3.0,
            level_speed_step: 0.3,
            max_object_speed: 12.0,
            life_bonus_speed_factor: 0.8,
        }
    }
}

/// Fire multiplier (snow blower pickup)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireMultiplierConfig {
    pub duration_ms: f64,
    pub projectiles: u32,
    /// Continuous fire cadence factor while active
    pub cooldown_reduction: f32,
    /// Half of the fan angle, degrees
    pub spread_angle_deg: f32,
}

impl Default for FireMultiplierConfig {
    fn default() -> Self {
        Self {
            duration_ms: 15_000.0,
            projectiles: 3,
            cooldown_reduction: 0.5,
            spread_angle_deg: 15.0,
        }
    }
}

/// Speed multiplier (move speed boost pickup)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedMultiplierConfig {
    pub duration_ms: f64,
    pub speed_boost: f32,
}

impl Default for SpeedMultiplierConfig {
    fn default() -> Self {
        Self {
            duration_ms: 20_000.0,
            speed_boost: 1.8,
        }
    }
}

/// Score multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreMultiplierConfig {
    pub duration_ms: f64,
    pub multiplier: u32,
}

impl Default for ScoreMultiplierConfig {
    fn default() -> Self {
        Self {
            duration_ms: 10_000.0,
            multiplier: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiplierConfig {
    pub fire: FireMultiplierConfig,
    pub speed: SpeedMultiplierConfig,
    pub score: ScoreMultiplierConfig,
}

/// Distance and gifts required for a level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelThreshold {
    pub level: u32,
    pub distance: f32,
    pub gifts: u64,
}

/// Progression and difficulty ramp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyConfig {
    /// Level gates; the last entry is the boss gate
    pub thresholds: Vec<LevelThreshold>,
    pub step_interval_ms: f32,
    pub step: f32,
    /// Distance past a threshold after which the level advances without gifts
    pub grace_distance: f32,
    /// Minimum distance between emergency life bonuses at one life
    pub life_bonus_max_frequency: f32,
    /// Roll once the life bonus gate is open
    pub life_bonus_chance: f64,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![
                LevelThreshold { level: 1, distance: 0.0, gifts: 0 },
                LevelThreshold { level: 2, distance: 1200.0, gifts: 10 },
                LevelThreshold { level: 3, distance: 2400.0, gifts: 20 },
                LevelThreshold { level: 4, distance: 3600.0, gifts: 35 },
            ],
            step_interval_ms: 15_000.0,
            step: 0.03,
            grace_distance: 300.0,
            life_bonus_max_frequency: 800.0,
            life_bonus_chance: 0.3,
        }
    }
}

/// Frame-rate monitoring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub target_fps: f32,
    /// Below this the game switches to low-performance mode for good
    pub min_fps: f32,
    pub max_objects: usize,
    /// Spawn interval penalty in low-performance mode
    pub low_performance_spawn_factor: f32,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            min_fps: 30.0,
            max_objects: 35,
            low_performance_spawn_factor: 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub gift_points: u64,
    pub obstacle_points: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            gift_points: 10,
            obstacle_points: 5,
        }
    }
}

/// Complete tuning table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub canvas: CanvasConfig,
    pub sleigh: SleighConfig,
    pub spawn: SpawnConfig,
    pub multipliers: MultiplierConfig,
    pub difficulty: DifficultyConfig,
    pub performance: PerformanceConfig,
    pub scoring: ScoringConfig,
    /// Distance units gained per second of play
    pub distance_per_second: f32,
    /// Continuous fire cadence
    pub fire_rate_ms: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            sleigh: SleighConfig::default(),
            spawn: SpawnConfig::default(),
            multipliers: MultiplierConfig::default(),
            difficulty: DifficultyConfig::default(),
            performance: PerformanceConfig::default(),
            scoring: ScoringConfig::default(),
            distance_per_second: 20.0,
            fire_rate_ms: 120.0,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON config, filling gaps with defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("canvas.width", self.canvas.width)?;
        positive("canvas.height", self.canvas.height)?;
        positive("sleigh.max_velocity", self.sleigh.max_velocity)?;
        positive("performance.target_fps", self.performance.target_fps)?;
        positive("distance_per_second", self.distance_per_second)?;
        positive("fire_rate_ms", self.fire_rate_ms as f32)?;

        let thresholds = &self.difficulty.thresholds;
        if thresholds.is_empty() {
            return Err(ConfigError::NoLevelThresholds);
        }
        for pair in thresholds.windows(2) {
            if pair[1].level <= pair[0].level {
                return Err(ConfigError::UnsortedThresholds {
                    previous: pair[0].level,
                    level: pair[1].level,
                });
            }
        }

        let spawn = &self.spawn;
        if !(spawn.min_interval_ms > 0.0 && spawn.min_interval_ms <= spawn.max_interval_ms) {
            return Err(ConfigError::SpawnBand {
                min: spawn.min_interval_ms,
                max: spawn.max_interval_ms,
            });
        }
        if spawn.min_wave_size > spawn.max_wave_size {
            return Err(ConfigError::WaveBand {
                min: spawn.min_wave_size,
                max: spawn.max_wave_size,
            });
        }
        let total = spawn.life_chance + spawn.bonus_chance + spawn.gift_chance;
        if total > 100 {
            return Err(ConfigError::ChanceOverflow { total });
        }
        Ok(())
    }

    /// Boss gate (last level threshold)
    pub fn boss_threshold(&self) -> Option<&LevelThreshold> {
        self.difficulty.thresholds.last()
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = GameConfig::from_json(r#"{ "canvas": { "width": 360.0 } }"#).unwrap();
        assert_eq!(config.canvas.width, 360.0);
        assert_eq!(config.canvas.height, DEFAULT_CANVAS_HEIGHT);
        assert_eq!(config.difficulty.thresholds.len(), 4);
        assert_eq!(config.distance_per_second, 20.0);
    }

    #[test]
    fn test_json_round_trip_preserves_thresholds() {
        let config = GameConfig::default();
        let json = config.to_json().unwrap();
        let parsed = GameConfig::from_json(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_inverted_spawn_band() {
        let mut config = GameConfig::default();
        config.spawn.min_interval_ms = 2000.0;
        assert!(matches!(config.validate(), Err(ConfigError::SpawnBand { .. })));
    }

    #[test]
    fn test_rejects_unsorted_thresholds() {
        let mut config = GameConfig::default();
        config.difficulty.thresholds.swap(1, 2);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::UnsortedThresholds { previous: 3, level: 2 })
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(GameConfig::from_json("{ not json"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_rejects_chance_overflow() {
        let mut config = GameConfig::default();
        config.spawn.gift_chance = 95;
        assert!(matches!(config.validate(), Err(ConfigError::ChanceOverflow { total: 105 })));
    }
}
