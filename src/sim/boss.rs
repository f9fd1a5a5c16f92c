//! Zone boss: entrance, movement phases, attack patterns and rage
//!
//! The boss descends to its resting height, then cycles through four
//! time-boxed movement phases while firing on a fixed interval. Delayed
//! attacks (bursts, rain) go through a [`Scheduler`] that is invalidated on
//! defeat, and the whole boss is dropped on restart or zone advance.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::schedule::Scheduler;
use crate::consts::{BOSS_REST_Y, BOSS_SIZE};
use crate::frame_factor;

/// Base projectile speed (pixels per frame, downward)
const PROJECTILE_SPEED: f32 = 5.0;
const ENTRANCE_SPEED: f32 = 2.0;
/// Circle phase time scale (ms per radian)
const CIRCLE_PERIOD_MS: f32 = 400.0;
const CIRCLE_MIN_Y: f32 = BOSS_REST_Y - 20.0;
const CIRCLE_MAX_Y: f32 = BOSS_REST_Y + 50.0;
/// Below this health fraction every zone fires the angled pair
const ENRAGE_FRACTION: f32 = 0.6;
const FURIOUS_FRACTION: f32 = 0.3;
const BURST_CHANCE: f64 = 0.3;
const BURST_DELAY_MS: f64 = 400.0;
const RAIN_CHANCE: f64 = 0.4;
const RAIN_DROPS: u32 = 4;
const RAIN_INTERVAL_MS: f64 = 250.0;
/// Projectiles further than this below the canvas are dropped
const PROJECTILE_CLEANUP_MARGIN: f32 = 20.0;

/// Movement phases, cycled in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhase {
    SweepLeft,
    SweepRight,
    Circle,
    /// Homes on the canvas centre, not the real sleigh
    Chase,
}

impl BossPhase {
    pub fn next(self) -> Self {
        match self {
            BossPhase::SweepLeft => BossPhase::SweepRight,
            BossPhase::SweepRight => BossPhase::Circle,
            BossPhase::Circle => BossPhase::Chase,
            BossPhase::Chase => BossPhase::SweepLeft,
        }
    }
}

/// Aggression band, escalates one way as health drops
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rage {
    Calm,
    Angry,
    Furious,
}

/// Enemy projectile owned by the boss
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BossProjectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
}

impl BossProjectile {
    pub fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }
}

/// Delayed attacks waiting in the boss scheduler
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BossAttack {
    Burst,
    RainDrop,
}

/// Zone boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub pos: Vec2,
    pub size: Vec2,
    pub zone: u32,
    pub health: u32,
    pub max_health: u32,
    pub active: bool,
    /// Still moving down to the resting height
    pub descending: bool,
    pub phase: BossPhase,
    pub rage: Rage,
    pub projectiles: Vec<BossProjectile>,
    pub max_projectiles: usize,
    phase_timer_ms: f32,
    phase_interval_ms: f32,
    attack_cooldown_ms: f32,
    attack_interval_ms: f32,
    /// Low-performance slowdown, survives rage changes
    interval_scale: f32,
    horizontal_speed: f32,
    vertical_speed: f32,
    canvas: Vec2,
    scheduler: Scheduler<BossAttack>,
}

impl Boss {
    pub fn new(zone: u32, canvas: Vec2) -> Self {
        let first = zone <= 1;
        let health = if first { 40 } else { 120 };
        let size = Vec2::splat(BOSS_SIZE);
        Self {
            pos: Vec2::new((canvas.x - size.x) / 2.0, -size.y),
            size,
            zone,
            health,
            max_health: health,
            active: true,
            descending: true,
            phase: BossPhase::SweepLeft,
            rage: Rage::Calm,
            projectiles: Vec::new(),
            max_projectiles: if first { 15 } else { 25 },
            phase_timer_ms: 0.0,
            phase_interval_ms: if first { 2500.0 } else { 2000.0 },
            attack_cooldown_ms: 0.0,
            attack_interval_ms: if first { 1400.0 } else { 1000.0 },
            interval_scale: 1.0,
            horizontal_speed: if first { 2.5 } else { 3.5 },
            vertical_speed: if first { 1.0 } else { 1.5 },
            canvas,
            scheduler: Scheduler::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32
    }

    pub fn attack_interval_ms(&self) -> f32 {
        self.attack_interval_ms * self.interval_scale
    }

    pub fn horizontal_speed(&self) -> f32 {
        self.horizontal_speed
    }

    /// Delayed attacks still queued
    pub fn pending_attacks(&self) -> usize {
        self.scheduler.len()
    }

    pub fn update<R: Rng>(&mut self, dt_ms: f32, rng: &mut R) {
        if !self.active {
            return;
        }
        let f = frame_factor(dt_ms);

        if self.descending {
            self.pos.y += ENTRANCE_SPEED * f;
            if self.pos.y >= BOSS_REST_Y {
                self.pos.y = BOSS_REST_Y;
                self.descending = false;
            }
        } else {
            self.update_movement(dt_ms);
            self.attack_cooldown_ms -= dt_ms;
            if self.attack_cooldown_ms <= 0.0 {
                self.attack(rng);
                self.attack_cooldown_ms = self.attack_interval_ms();
            }
        }

        for action in self.scheduler.advance(dt_ms as f64) {
            self.run_delayed(action, rng);
        }

        self.update_projectiles(f);
    }

    fn update_movement(&mut self, dt_ms: f32) {
        self.phase_timer_ms += dt_ms;
        if self.phase_timer_ms > self.phase_interval_ms {
            self.phase = self.phase.next();
            self.phase_timer_ms = 0.0;
        }

        let f = frame_factor(dt_ms);
        let max_x = (self.canvas.x - self.size.x).max(0.0);

        match self.phase {
            BossPhase::SweepLeft => {
                self.pos.x -= self.horizontal_speed * f;
                if self.pos.x < 0.0 {
                    self.pos.x = 0.0;
                    self.phase = BossPhase::SweepRight;
                }
            }
            BossPhase::SweepRight => {
                self.pos.x += self.horizontal_speed * f;
                if self.pos.x > max_x {
                    self.pos.x = max_x;
                    self.phase = BossPhase::SweepLeft;
                }
            }
            BossPhase::Circle => {
                let t = self.phase_timer_ms / CIRCLE_PERIOD_MS;
                self.pos.x += self.horizontal_speed * t.cos() * f;
                self.pos.y += self.vertical_speed * t.sin() * f * 0.5;
                self.pos.y = self.pos.y.clamp(CIRCLE_MIN_Y, CIRCLE_MAX_Y);
            }
            BossPhase::Chase => {
                let target_x = self.canvas.x / 2.0 - self.size.x / 2.0;
                let diff = target_x - self.pos.x;
                self.pos.x += diff.signum() * diff.abs().min(self.horizontal_speed * f);
            }
        }

        self.pos.x = self.pos.x.clamp(0.0, max_x);
    }

    fn muzzle(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.size.x / 2.0 - 5.0, self.pos.y + self.size.y)
    }

    fn attack<R: Rng>(&mut self, rng: &mut R) {
        let muzzle = self.muzzle();
        self.projectiles.push(BossProjectile {
            pos: muzzle,
            vel: Vec2::new(0.0, PROJECTILE_SPEED),
            size: Vec2::splat(10.0),
        });

        let enraged = self.health_fraction() < ENRAGE_FRACTION || self.zone > 1;
        if enraged {
            for side in [-1.0_f32, 1.0] {
                self.projectiles.push(BossProjectile {
                    pos: muzzle + Vec2::new(side * 25.0, 0.0),
                    vel: Vec2::new(side * PROJECTILE_SPEED / 4.0, PROJECTILE_SPEED * 0.9),
                    size: Vec2::splat(8.0),
                });
            }
        }

        if self.zone > 1 && rng.random_bool(BURST_CHANCE) {
            self.scheduler.schedule_in(BURST_DELAY_MS, BossAttack::Burst);
        }

        if self.phase == BossPhase::Chase && rng.random_bool(RAIN_CHANCE) {
            for i in 1..=RAIN_DROPS {
                self.scheduler
                    .schedule_in(RAIN_INTERVAL_MS * f64::from(i), BossAttack::RainDrop);
            }
        }
    }

    fn run_delayed<R: Rng>(&mut self, action: BossAttack, rng: &mut R) {
        if !self.active || self.projectiles.len() >= self.max_projectiles {
            return;
        }
        match action {
            BossAttack::Burst => {
                let muzzle = self.muzzle();
                for _ in 0..2 {
                    let jitter = rng.random_range(-15.0..15.0);
                    self.projectiles.push(BossProjectile {
                        pos: muzzle + Vec2::new(jitter, 0.0),
                        vel: Vec2::new(
                            (rng.random::<f32>() - 0.5) * 3.0,
                            PROJECTILE_SPEED + 1.0,
                        ),
                        size: Vec2::splat(8.0),
                    });
                }
            }
            BossAttack::RainDrop => {
                let x = rng.random_range(0.0..(self.canvas.x - 10.0).max(1.0));
                self.projectiles.push(BossProjectile {
                    pos: Vec2::new(x, -10.0),
                    vel: Vec2::new(0.0, PROJECTILE_SPEED * 0.7),
                    size: Vec2::splat(10.0),
                });
            }
        }
    }

    fn update_projectiles(&mut self, f: f32) {
        let canvas = self.canvas;
        self.projectiles.retain_mut(|p| {
            p.pos += p.vel * f;
            p.pos.y < canvas.y + PROJECTILE_CLEANUP_MARGIN
                && p.pos.y > -p.size.y
                && p.pos.x > -p.size.x
                && p.pos.x < canvas.x + p.size.x
        });
    }

    /// Apply damage. Returns true only for the hit that defeats the boss.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if !self.active {
            return false;
        }
        self.health = self.health.saturating_sub(amount);
        if self.health == 0 {
            self.defeat();
            return true;
        }

        let fraction = self.health_fraction();
        let first = self.zone <= 1;
        if fraction <= FURIOUS_FRACTION {
            self.escalate(Rage::Furious, first);
        } else if fraction < ENRAGE_FRACTION {
            self.escalate(Rage::Angry, first);
        }
        false
    }

    fn escalate(&mut self, rage: Rage, first: bool) {
        if rage <= self.rage {
            return;
        }
        self.rage = rage;
        match rage {
            Rage::Calm => {}
            Rage::Angry => {
                self.horizontal_speed = if first { 3.0 } else { 4.0 };
                self.attack_interval_ms = if first { 1200.0 } else { 800.0 };
            }
            Rage::Furious => {
                self.horizontal_speed = if first { 3.5 } else { 4.5 };
                self.attack_interval_ms = if first { 1000.0 } else { 600.0 };
                self.vertical_speed = if first { 1.5 } else { 2.0 };
            }
        }
        log::debug!("Boss escalated to {:?} at {}/{}", rage, self.health, self.max_health);
    }

    /// Terminal: deactivate and drop every queued attack
    pub fn defeat(&mut self) {
        self.active = false;
        self.scheduler.invalidate();
        log::info!("Boss of zone {} defeated", self.zone);
    }

    /// Lighter boss for struggling devices
    pub fn reduce_difficulty(&mut self) {
        self.max_projectiles = (self.max_projectiles as f32 * 0.7).floor() as usize;
        self.interval_scale *= 1.2;
        log::info!(
            "Boss difficulty reduced: {} projectiles max, {:.0}ms between attacks",
            self.max_projectiles,
            self.attack_interval_ms()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const CANVAS: Vec2 = Vec2::new(480.0, 800.0);

    fn rested(zone: u32) -> Boss {
        let mut boss = Boss::new(zone, CANVAS);
        boss.pos.y = BOSS_REST_Y;
        boss.descending = false;
        boss
    }

    #[test]
    fn test_zone_scaling() {
        let first = Boss::new(1, CANVAS);
        let second = Boss::new(2, CANVAS);
        assert_eq!(first.max_health, 40);
        assert_eq!(second.max_health, 120);
        assert_eq!(first.attack_interval_ms(), 1400.0);
        assert_eq!(second.max_projectiles, 25);
    }

    #[test]
    fn test_descends_to_rest() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut boss = Boss::new(1, CANVAS);
        for _ in 0..200 {
            boss.update(FRAME_MS, &mut rng);
        }
        assert!(!boss.descending);
        assert!(boss.pos.y >= CIRCLE_MIN_Y && boss.pos.y <= CIRCLE_MAX_Y);
    }

    #[test]
    fn test_first_attack_on_arrival_is_single_when_calm() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut boss = rested(1);
        boss.update(FRAME_MS, &mut rng);
        assert_eq!(boss.projectiles.len(), 1);
        assert_eq!(boss.projectiles[0].size, Vec2::splat(10.0));
    }

    #[test]
    fn test_enraged_attack_fires_symmetric_pair() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut boss = rested(2);
        boss.update(FRAME_MS, &mut rng);
        assert!(boss.projectiles.len() >= 3);
        let pair: Vec<_> = boss.projectiles.iter().filter(|p| p.size.x == 8.0).collect();
        assert_eq!(pair.len(), 2);
        assert_eq!(pair[0].vel.x, -pair[1].vel.x);
    }

    #[test]
    fn test_defeat_happens_exactly_once() {
        let mut boss = Boss::new(1, CANVAS);
        assert!(!boss.take_damage(39));
        assert!(boss.take_damage(1));
        assert!(!boss.active);
        assert_eq!(boss.health, 0);
        assert!(!boss.take_damage(5));
        assert_eq!(boss.health, 0);
    }

    #[test]
    fn test_rage_only_escalates() {
        let mut boss = Boss::new(1, CANVAS);
        boss.take_damage(20);
        assert_eq!(boss.rage, Rage::Angry);
        assert_eq!(boss.horizontal_speed(), 3.0);
        boss.take_damage(10);
        assert_eq!(boss.rage, Rage::Furious);
        assert_eq!(boss.attack_interval_ms(), 1000.0);
        // Healing is impossible, but even a higher fraction never calms it
        boss.health = 39;
        boss.take_damage(1);
        assert_eq!(boss.rage, Rage::Furious);
    }

    #[test]
    fn test_defeat_invalidates_delayed_attacks() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut boss = rested(2);
        boss.phase = BossPhase::Chase;
        boss.scheduler.schedule_in(250.0, BossAttack::RainDrop);
        boss.scheduler.schedule_in(400.0, BossAttack::Burst);
        boss.defeat();
        assert_eq!(boss.pending_attacks(), 0);
        let before = boss.projectiles.len();
        boss.update(1000.0, &mut rng);
        assert_eq!(boss.projectiles.len(), before);
    }

    #[test]
    fn test_delayed_attacks_respect_cap() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut boss = rested(2);
        boss.max_projectiles = 0;
        boss.attack_cooldown_ms = 10_000.0;
        boss.scheduler.schedule_in(0.0, BossAttack::Burst);
        boss.update(FRAME_MS, &mut rng);
        assert!(boss.projectiles.is_empty());
    }

    #[test]
    fn test_chase_homes_on_canvas_centre() {
        let mut boss = rested(1);
        boss.pos.x = 0.0;
        boss.phase = BossPhase::Chase;
        for _ in 0..100 {
            boss.update_movement(FRAME_MS);
        }
        assert_eq!(boss.phase, BossPhase::Chase);
        let centre = CANVAS.x / 2.0 - BOSS_SIZE / 2.0;
        assert!((boss.pos.x - centre).abs() < 1e-3);
    }

    #[test]
    fn test_reduce_difficulty_survives_rage() {
        let mut boss = Boss::new(1, CANVAS);
        boss.reduce_difficulty();
        assert_eq!(boss.max_projectiles, 10);
        boss.take_damage(30);
        assert!((boss.attack_interval_ms() - 1200.0).abs() < 1e-3);
    }
}
