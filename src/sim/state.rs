//! Run progress: score, lives, level, zone and distance
//!
//! `GameState` is owned by the game and only changes through the methods
//! below. Terminal flags latch: `lives <= 0` implies `game_over`, and a
//! defeated boss implies `game_won`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{DifficultyConfig, LevelThreshold};
use crate::platform::FeedbackCue;

pub const STARTING_LIVES: i32 = 3;
/// Life bonuses never spawn at or above this many lives
const LIFE_BONUS_MAX_LIVES: i32 = 3;
/// Floors for the life bonus distance gate at one and two lives
const LIFE_BONUS_FLOOR_ONE: f32 = 600.0;
const LIFE_BONUS_FLOOR_TWO: f32 = 800.0;
/// At two lives the gate is this much wider than at one
const LIFE_BONUS_TWO_LIVES_FACTOR: f32 = 1.3;

/// How a level advance was earned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelAdvance {
    /// Distance and score both met
    Earned,
    /// Distance exceeded the threshold by the grace margin
    Grace,
}

/// Requirements for the next level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NextLevelInfo {
    pub level: u32,
    pub distance_required: f32,
    pub distance_remaining: f32,
    pub score_required: u64,
    pub score_remaining: u64,
}

/// End-of-run summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub survival_secs: u64,
    pub points_per_second: f64,
    pub touch_score: u64,
    pub level: u32,
    pub zone: u32,
    pub lives: i32,
    pub distance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub score: u64,
    pub lives: i32,
    pub level: u32,
    pub zone: u32,
    pub distance_traveled: f32,
    pub difficulty_multiplier: f32,
    pub game_over: bool,
    pub game_won: bool,
    pub boss_spawned: bool,
    pub boss_defeated: bool,
    pub last_life_bonus_distance: f32,
    /// Time survived in the current zone
    pub survival_ms: f64,
    /// Points earned this run
    pub touch_score: u64,
    difficulty_timer_ms: f32,
    #[serde(skip)]
    config: DifficultyConfig,
    #[serde(skip)]
    pending_cues: Vec<FeedbackCue>,
}

impl GameState {
    pub fn new(config: DifficultyConfig) -> Self {
        Self {
            score: 0,
            lives: STARTING_LIVES,
            level: 1,
            zone: 1,
            distance_traveled: 0.0,
            difficulty_multiplier: 1.0,
            game_over: false,
            game_won: false,
            boss_spawned: false,
            boss_defeated: false,
            last_life_bonus_distance: 0.0,
            survival_ms: 0.0,
            touch_score: 0,
            difficulty_timer_ms: 0.0,
            config,
            pending_cues: Vec::new(),
        }
    }

    pub fn thresholds(&self) -> &[LevelThreshold] {
        &self.config.thresholds
    }

    pub fn is_terminal(&self) -> bool {
        self.game_over || self.game_won
    }

    /// Feedback cues raised since the last drain
    pub fn drain_cues(&mut self) -> Vec<FeedbackCue> {
        std::mem::take(&mut self.pending_cues)
    }

    /// Queue a cue raised outside the state methods
    pub fn push_cue(&mut self, cue: FeedbackCue) {
        self.pending_cues.push(cue);
    }

    /// Advance survival time and the difficulty ramp
    pub fn update(&mut self, dt_ms: f32) {
        self.survival_ms += f64::from(dt_ms);
        self.difficulty_timer_ms += dt_ms;
        if self.difficulty_timer_ms >= self.config.step_interval_ms {
            self.difficulty_multiplier += self.config.step;
            self.difficulty_timer_ms = 0.0;
            log::debug!("Difficulty now x{:.2}", self.difficulty_multiplier);
        }
        self.check_level_progress();
    }

    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
        self.touch_score = self.touch_score.saturating_add(points);
        self.check_level_progress();
    }

    pub fn remove_life(&mut self) {
        self.lives -= 1;
        self.pending_cues.push(FeedbackCue::Damage);
        if self.lives <= 0 && !self.game_over {
            self.game_over = true;
            log::info!(
                "Game over after {}s, score {}",
                (self.survival_ms / 1000.0) as u64,
                self.score
            );
        }
    }

    pub fn add_life(&mut self) {
        self.lives += 1;
        self.pending_cues.push(FeedbackCue::LifeGained);
        log::debug!("Life gained, now {}", self.lives);
    }

    /// Set the travelled distance; callers only ever move it forward
    pub fn update_distance(&mut self, distance: f32) {
        if distance.is_finite() && distance > self.distance_traveled {
            let previous = self.distance_traveled;
            self.distance_traveled = distance;
            if (distance / 500.0).floor() > (previous / 500.0).floor() {
                log::debug!(
                    "{} | level {} | score {}",
                    self.formatted_distance(),
                    self.level,
                    self.score
                );
            }
        }
        self.check_level_progress();
    }

    /// Walk the thresholds from the top and take the first one reached
    ///
    /// A threshold is reached when distance and score both meet it, or when
    /// distance alone is past it by the grace margin.
    pub fn check_level_progress(&mut self) -> Option<LevelAdvance> {
        let grace = self.config.grace_distance;
        let reached = self.config.thresholds.iter().rev().find_map(|t| {
            if self.level >= t.level {
                None
            } else if self.distance_traveled >= t.distance && self.score >= t.gifts {
                Some((t.level, LevelAdvance::Earned))
            } else if self.distance_traveled >= t.distance + grace {
                Some((t.level, LevelAdvance::Grace))
            } else {
                None
            }
        });

        let (level, how) = reached?;
        self.level = level;
        match how {
            LevelAdvance::Earned => {
                log::info!("Level {} reached at {}", level, self.formatted_distance());
                self.pending_cues.push(FeedbackCue::LevelUp);
            }
            LevelAdvance::Grace => {
                log::info!(
                    "Level {} reached on distance alone (score {})",
                    level,
                    self.score
                );
                self.pending_cues.push(FeedbackCue::LevelUpByDistance);
            }
        }
        Some(how)
    }

    /// Distance that must pass between emergency life bonuses
    fn life_bonus_gate(&self) -> Option<f32> {
        let frequency = self.config.life_bonus_max_frequency;
        match self.lives {
            1 => Some(frequency.max(LIFE_BONUS_FLOOR_ONE)),
            2 => Some((frequency * LIFE_BONUS_TWO_LIVES_FACTOR).max(LIFE_BONUS_FLOOR_TWO)),
            _ => None,
        }
    }

    /// Roll for an emergency life bonus
    pub fn check_life_bonus_spawn<R: Rng>(&mut self, rng: &mut R) -> bool {
        if self.lives >= LIFE_BONUS_MAX_LIVES {
            return false;
        }
        let Some(gate) = self.life_bonus_gate() else {
            return false;
        };

        let distance = self.distance_traveled.floor();
        if distance < self.last_life_bonus_distance + gate {
            return false;
        }
        if rng.random_bool(self.config.life_bonus_chance.clamp(0.0, 1.0)) {
            self.last_life_bonus_distance = distance;
            log::info!("Emergency life bonus at {} with {} lives", distance, self.lives);
            true
        } else {
            false
        }
    }

    /// True exactly once per zone, when the boss gate is met
    pub fn should_spawn_boss(&mut self) -> bool {
        if self.boss_spawned {
            return false;
        }
        let Some(gate) = self.config.thresholds.last() else {
            return false;
        };
        if self.distance_traveled >= gate.distance && self.score >= gate.gifts {
            self.boss_spawned = true;
            self.pending_cues.push(FeedbackCue::BossSpawned);
            log::info!(
                "Boss spawning at {} with score {}",
                self.formatted_distance(),
                self.score
            );
            true
        } else {
            false
        }
    }

    pub fn set_boss_defeated(&mut self) {
        if self.boss_defeated {
            return;
        }
        self.boss_defeated = true;
        self.game_won = true;
        self.pending_cues.push(FeedbackCue::BossDefeated);
        log::info!("Zone {} cleared", self.zone);
    }

    /// Next zone: keeps score and lives, resets level and boss latches
    pub fn advance_to_next_zone(&mut self) {
        self.zone += 1;
        self.level = 1;
        self.boss_spawned = false;
        self.boss_defeated = false;
        self.game_won = false;
        self.last_life_bonus_distance = 0.0;
        self.survival_ms = 0.0;
        log::info!(
            "Zone {} started with {} lives, score {}",
            self.zone,
            self.lives,
            self.score
        );
    }

    pub fn reset(&mut self) {
        let config = std::mem::take(&mut self.config);
        *self = Self::new(config);
    }

    /// "523m" below a kilometre, "1.2km" above
    pub fn formatted_distance(&self) -> String {
        let meters = self.distance_traveled.max(0.0).floor();
        if meters >= 1000.0 {
            format!("{:.1}km", meters / 1000.0)
        } else {
            format!("{}m", meters as u64)
        }
    }

    pub fn next_level_info(&self) -> Option<NextLevelInfo> {
        let thresholds = &self.config.thresholds;
        let current = thresholds.iter().position(|t| t.level == self.level)?;
        let next = thresholds.get(current + 1)?;
        Some(NextLevelInfo {
            level: next.level,
            distance_required: next.distance,
            distance_remaining: (next.distance - self.distance_traveled).max(0.0),
            score_required: next.gifts,
            score_remaining: next.gifts.saturating_sub(self.score),
        })
    }

    /// Distance units per second survived
    pub fn average_speed(&self) -> f32 {
        if self.survival_ms > 0.0 {
            (f64::from(self.distance_traveled) / (self.survival_ms / 1000.0)) as f32
        } else {
            0.0
        }
    }

    pub fn stats(&self) -> RunStats {
        let survival_secs = (self.survival_ms / 1000.0).floor() as u64;
        let points_per_second = if survival_secs > 0 {
            self.touch_score as f64 / survival_secs as f64
        } else {
            0.0
        };
        RunStats {
            survival_secs,
            points_per_second,
            touch_score: self.touch_score,
            level: self.level,
            zone: self.zone,
            lives: self.lives,
            distance: self.distance_traveled,
        }
    }
}
