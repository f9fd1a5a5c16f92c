//! Timed gameplay multipliers
//!
//! Deadlines are absolute times on the game clock. A multiplier expires on
//! the first tick where the clock is strictly past its end time.

use serde::{Deserialize, Serialize};

use crate::config::MultiplierConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiplierKind {
    Fire,
    Speed,
    Score,
}

/// One timed modifier
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Multiplier {
    pub active: bool,
    pub end_ms: f64,
}

impl Multiplier {
    fn activate(&mut self, now_ms: f64, duration_ms: f64) {
        self.active = true;
        self.end_ms = now_ms + duration_ms;
    }

    /// Deactivate if past the deadline; returns true when it just expired
    fn expire(&mut self, now_ms: f64) -> bool {
        if self.active && now_ms > self.end_ms {
            self.active = false;
            true
        } else {
            false
        }
    }

    /// Milliseconds left (0 when inactive)
    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        if self.active { (self.end_ms - now_ms).max(0.0) } else { 0.0 }
    }
}

/// Fire, speed and score multipliers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Multipliers {
    pub fire: Multiplier,
    pub speed: Multiplier,
    pub score: Multiplier,
    /// Sleigh max velocity to restore when the speed boost ends
    pub speed_restore: Option<f32>,
    config: MultiplierConfig,
}

impl Multipliers {
    pub fn new(config: MultiplierConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &MultiplierConfig {
        &self.config
    }

    pub fn activate_fire(&mut self, now_ms: f64) {
        self.fire.activate(now_ms, self.config.fire.duration_ms);
        log::info!(
            "Fire multiplier on: {} shots for {:.0}s",
            self.config.fire.projectiles,
            self.config.fire.duration_ms / 1000.0
        );
    }

    /// Start (or extend) the speed boost. Returns the boost factor to apply.
    ///
    /// `current_max_velocity` is remembered only when no boost is running, so
    /// stacking pickups never bakes a boosted value into the restore point.
    pub fn activate_speed(&mut self, now_ms: f64, current_max_velocity: f32) -> f32 {
        if !self.speed.active || self.speed_restore.is_none() {
            self.speed_restore = Some(current_max_velocity);
        }
        self.speed.activate(now_ms, self.config.speed.duration_ms);
        log::info!(
            "Speed multiplier on: x{} for {:.0}s",
            self.config.speed.speed_boost,
            self.config.speed.duration_ms / 1000.0
        );
        self.config.speed.speed_boost
    }

    pub fn activate_score(&mut self, now_ms: f64) {
        self.score.activate(now_ms, self.config.score.duration_ms);
        log::info!("Score multiplier on: x{}", self.config.score.multiplier);
    }

    /// Expire everything past its deadline, returning what just ended
    pub fn expire(&mut self, now_ms: f64) -> Vec<MultiplierKind> {
        let mut ended = Vec::new();
        if self.fire.expire(now_ms) {
            log::info!("Fire multiplier ended");
            ended.push(MultiplierKind::Fire);
        }
        if self.speed.expire(now_ms) {
            log::info!("Speed multiplier ended");
            ended.push(MultiplierKind::Speed);
        }
        if self.score.expire(now_ms) {
            log::info!("Score multiplier ended");
            ended.push(MultiplierKind::Score);
        }
        ended
    }

    /// Take the remembered max velocity once the speed boost has ended
    pub fn take_speed_restore(&mut self) -> Option<f32> {
        self.speed_restore.take()
    }

    /// Snowballs per shot
    pub fn projectile_count(&self) -> u32 {
        if self.fire.active { self.config.fire.projectiles.max(1) } else { 1 }
    }

    /// Continuous fire cadence factor
    pub fn fire_rate_factor(&self) -> f32 {
        if self.fire.active { self.config.fire.cooldown_reduction } else { 1.0 }
    }

    /// Gift score factor
    pub fn score_factor(&self) -> u64 {
        if self.score.active { u64::from(self.config.score.multiplier) } else { 1 }
    }

    pub fn is_active(&self, kind: MultiplierKind) -> bool {
        match kind {
            MultiplierKind::Fire => self.fire.active,
            MultiplierKind::Speed => self.speed.active,
            MultiplierKind::Score => self.score.active,
        }
    }

    /// Drop every multiplier (restart)
    pub fn clear(&mut self) {
        self.fire = Multiplier::default();
        self.speed = Multiplier::default();
        self.score = Multiplier::default();
        self.speed_restore = None;
    }
}
