//! Per-frame game loop
//!
//! `Game` owns every entity and advances them in a fixed order once per
//! [`Game::update`]. Time only moves through the `dt_ms` handed to update, so
//! a seeded game replays identically.

use glam::Vec2;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::SimRng;
use super::background::Background;
use super::boss::Boss;
use super::collision::check_collision;
use super::multiplier::{MultiplierKind, Multipliers};
use super::object::{GameObject, ObjectKind};
use super::section::{EventEffects, Section, SectionHost, SectionManager, SpecialEvent};
use super::sleigh::Sleigh;
use super::snowball::Snowball;
use super::spawn::{self, SpawnRateInputs, Spawner, WaveChances};
use super::state::GameState;
use crate::config::GameConfig;
use crate::consts::{CLEANUP_MARGIN, MAX_FRAME_MS, SNOWBALL_CLEANUP_Y, SNOWBALL_SIZE, SNOWBALL_SPEED, SPAWN_Y};
use crate::platform::{FeedbackCue, FeedbackSink, NoFeedback};
use crate::settings::Settings;
use crate::view::Snapshot;

/// FPS is re-measured once this much clock time has passed
const FPS_WINDOW_MS: f64 = 1000.0;
/// Spread shots leave the sleigh this far apart per unit of sin(angle)
const SPREAD_OFFSET: f32 = 10.0;
/// Lateral speed per unit of sin(angle)
const SPREAD_LATERAL_SPEED: f32 = 2.0;
/// Spread shots are slightly faster than a single shot
const SPREAD_SPEEDUP: f32 = 1.1;
/// Battery saver
const BATTERY_TARGET_FPS: f32 = 30.0;
const BATTERY_SPAWN_FACTOR: f32 = 1.3;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Normalized joystick vector, components in [-1, 1]
    pub movement: Vec2,
    /// Fire once this tick
    pub fire: bool,
    /// Toggle continuous fire
    pub fire_toggle: bool,
}

/// Frame counter measured over one-second windows of game clock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FpsCounter {
    frames: u32,
    window_start_ms: f64,
    /// Last measured frame rate
    pub fps: f32,
}

impl FpsCounter {
    pub fn new(initial_fps: f32) -> Self {
        Self {
            frames: 0,
            window_start_ms: 0.0,
            fps: initial_fps,
        }
    }

    /// Count one frame; returns the new reading when a window closes
    pub fn record(&mut self, now_ms: f64) -> Option<f32> {
        self.frames += 1;
        let elapsed = now_ms - self.window_start_ms;
        if elapsed <= FPS_WINDOW_MS {
            return None;
        }
        self.fps = (f64::from(self.frames) * 1000.0 / elapsed) as f32;
        self.frames = 0;
        self.window_start_ms = now_ms;
        Some(self.fps)
    }
}

/// A section event currently in effect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub event: SpecialEvent,
    pub ends_ms: f64,
}

/// The simulation core
pub struct Game {
    config: GameConfig,
    settings: Settings,
    state: GameState,
    sleigh: Sleigh,
    objects: Vec<GameObject>,
    snowballs: Vec<Snowball>,
    boss: Option<Boss>,
    background: Background,
    sections: SectionManager,
    multipliers: Multipliers,
    spawner: Spawner,
    active_event: Option<ActiveEvent>,
    rng: SimRng,
    clock_ms: f64,
    fps: FpsCounter,
    low_performance: bool,
    continuous_fire: bool,
    last_fire_ms: f64,
    next_id: u32,
    feedback: Box<dyn FeedbackSink>,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("clock_ms", &self.clock_ms)
            .field("state", &self.state)
            .field("objects", &self.objects.len())
            .field("snowballs", &self.snowballs.len())
            .field("boss", &self.boss.as_ref().map(|b| b.health))
            .field("section", &self.sections)
            .field("low_performance", &self.low_performance)
            .finish()
    }
}

impl Game {
    pub fn new(config: GameConfig, settings: Settings, seed: u64) -> Self {
        let mut rng = SimRng::seed_from_u64(seed);
        let canvas = Vec2::new(config.canvas.width, config.canvas.height);
        let mut background = Background::new(canvas, 1, &mut rng);
        let sections = SectionManager::new();
        sections.initialize_current(&mut SectionHost {
            background: &mut background,
        });

        log::info!(
            "Game initialized: {}x{} canvas, seed {}",
            canvas.x,
            canvas.y,
            seed
        );

        Self {
            state: GameState::new(config.difficulty.clone()),
            sleigh: Sleigh::new(config.sleigh, canvas),
            objects: Vec::new(),
            snowballs: Vec::new(),
            boss: None,
            background,
            sections,
            multipliers: Multipliers::new(config.multipliers),
            spawner: Spawner::new(&config.spawn),
            active_event: None,
            rng,
            clock_ms: 0.0,
            fps: FpsCounter::new(config.performance.target_fps),
            low_performance: false,
            continuous_fire: false,
            last_fire_ms: 0.0,
            next_id: 1,
            feedback: Box::new(NoFeedback),
            config,
            settings,
        }
    }

    /// Route feedback cues to `sink` (used when haptics are enabled)
    pub fn with_feedback(mut self, sink: impl FeedbackSink + 'static) -> Self {
        self.feedback = Box::new(sink);
        self
    }

    pub fn set_feedback(&mut self, sink: Box<dyn FeedbackSink>) {
        self.feedback = sink;
    }

    /// Advance the game by `dt_ms` milliseconds
    pub fn update(&mut self, input: &TickInput, dt_ms: f32) {
        let dt = sanitize_dt(dt_ms);
        self.clock_ms += f64::from(dt);
        self.update_performance();

        if self.state.is_terminal() {
            self.flush_feedback();
            return;
        }

        self.expire_timed_effects();

        self.state.update(dt);
        let distance = self.state.distance_traveled + self.config.distance_per_second * dt / 1000.0;
        self.state.update_distance(distance);

        self.check_section_events();
        self.handle_input(input);
        self.update_entities(dt);
        self.handle_spawning();
        self.check_collisions();
        self.cleanup();
        self.flush_feedback();
    }

    fn update_performance(&mut self) {
        let Some(fps) = self.fps.record(self.clock_ms) else {
            return;
        };
        if fps < self.config.performance.min_fps
            && self.settings.auto_low_performance
            && !self.state.is_terminal()
        {
            self.enter_low_performance();
        }
    }

    /// One-way switch to the lighter game
    pub fn enter_low_performance(&mut self) {
        if self.low_performance {
            return;
        }
        self.low_performance = true;
        self.spawner.slow_down(self.config.performance.low_performance_spawn_factor);
        self.objects.truncate(self.config.performance.max_objects);
        if let Some(boss) = self.boss.as_mut().filter(|b| b.active) {
            boss.reduce_difficulty();
        }
        self.background.optimize_for_performance();
        log::warn!(
            "Frame rate {:.0} below {:.0} fps, low-performance mode on",
            self.fps.fps,
            self.config.performance.min_fps
        );
    }

    /// Lower the frame-rate target and spawn less
    pub fn optimize_for_battery(&mut self) {
        self.config.performance.target_fps = BATTERY_TARGET_FPS;
        self.spawner.slow_down(BATTERY_SPAWN_FACTOR);
        log::info!("Battery saver on: targeting {} fps", BATTERY_TARGET_FPS);
    }

    fn expire_timed_effects(&mut self) {
        for kind in self.multipliers.expire(self.clock_ms) {
            if kind == MultiplierKind::Speed {
                match self.multipliers.take_speed_restore() {
                    Some(max_velocity) if max_velocity > 0.0 => self.sleigh.max_velocity = max_velocity,
                    _ => self.sleigh.restore_max_velocity(),
                }
            }
        }

        if let Some(active) = self.active_event {
            if self.clock_ms > active.ends_ms {
                self.background.reset_atmosphere();
                self.active_event = None;
                log::info!("{} ended", active.event.kind.as_str());
            }
        }
    }

    fn check_section_events(&mut self) {
        if self.active_event.is_some() {
            return;
        }
        let section = self.sections.current();
        let Some(event) = section.check_special_events(&self.state, &mut self.rng) else {
            return;
        };
        section.handle_special_event(
            &event,
            &mut SectionHost {
                background: &mut self.background,
            },
        );
        self.active_event = Some(ActiveEvent {
            event,
            ends_ms: self.clock_ms + event.duration_ms,
        });
    }

    fn handle_input(&mut self, input: &TickInput) {
        self.sleigh.apply_movement_input(input.movement.x, input.movement.y);

        if input.fire_toggle {
            self.set_continuous_fire(!self.continuous_fire);
        }
        if input.fire {
            self.fire();
        }
        if self.continuous_fire {
            let cadence = self.config.fire_rate_ms * f64::from(self.multipliers.fire_rate_factor());
            if self.clock_ms - self.last_fire_ms >= cadence {
                self.fire();
                self.last_fire_ms = self.clock_ms;
            }
        }
    }

    /// Start or stop continuous fire; starting fires immediately
    pub fn set_continuous_fire(&mut self, firing: bool) {
        if self.continuous_fire == firing {
            return;
        }
        self.continuous_fire = firing;
        if firing {
            self.fire();
            self.last_fire_ms = self.clock_ms;
        }
        self.state.push_cue(FeedbackCue::FireToggled { firing });
        log::debug!("Continuous fire {}", if firing { "on" } else { "off" });
    }

    /// Fire from the sleigh, fanning out under the fire multiplier.
    /// Returns the number of snowballs launched.
    pub fn fire(&mut self) -> usize {
        let count = self.multipliers.projectile_count();
        let x = self.sleigh.center().x - SNOWBALL_SIZE / 2.0;
        let y = self.sleigh.pos.y;

        if count <= 1 {
            let id = self.next_entity_id();
            self.snowballs.push(Snowball::new(id, Vec2::new(x, y)));
            return 1;
        }

        let spread = self.multipliers.config().fire.spread_angle_deg;
        let step = spread * 2.0 / (count - 1) as f32;
        for i in 0..count {
            let (sin, _) = (-spread + step * i as f32).to_radians().sin_cos();
            let id = self.next_entity_id();
            self.snowballs.push(Snowball::with_velocity(
                id,
                Vec2::new(x + sin * SPREAD_OFFSET, y),
                Vec2::new(sin * SPREAD_LATERAL_SPEED, -SNOWBALL_SPEED * SPREAD_SPEEDUP),
            ));
        }
        count as usize
    }

    fn update_entities(&mut self, dt: f32) {
        self.sleigh.update(dt);
        self.background.update(dt, &mut self.rng);

        let canvas = self.canvas_size();
        for object in &mut self.objects {
            if self.low_performance {
                object.update_if_visible(dt, canvas);
            } else {
                object.update(dt);
            }
        }
        for snowball in &mut self.snowballs {
            snowball.update(dt, canvas.x);
        }
        if let Some(boss) = self.boss.as_mut() {
            boss.update(dt, &mut self.rng);
        }
    }

    fn handle_spawning(&mut self) {
        if self.state.should_spawn_boss() && self.boss.is_none() {
            self.create_boss();
            return;
        }

        let boss_fighting = self.boss.as_ref().is_some_and(|b| b.active);
        if self.spawner.is_due(self.clock_ms) && !boss_fighting {
            self.spawn_wave_item();
        }

        if self.state.check_life_bonus_spawn(&mut self.rng) {
            self.spawn_life_bonus();
        }
    }

    fn spawn_wave_item(&mut self) {
        self.spawner.prepare_wave(&mut self.rng, &self.config.spawn);
        let chances = self.wave_chances();
        let kind = spawn::roll_wave_kind(
            &mut self.rng,
            &chances,
            self.state.lives,
            self.sections.current(),
            self.state.level,
        );
        self.spawn_single_object(kind);

        let interval = self.next_spawn_interval();
        self.spawner.record_spawn(self.clock_ms, interval);
    }

    fn wave_chances(&self) -> WaveChances {
        let mut chances = WaveChances::from_config(&self.config.spawn);
        let effects = self.event_effects();
        if let Some(bonus) = effects.bonus_chance {
            chances.bonus = bonus;
        }
        if let Some(life) = effects.life_chance {
            chances.life = life;
            chances.life_boosted = true;
        }
        chances
    }

    /// Interval until the next wave item under the current conditions
    pub fn next_spawn_interval(&self) -> f32 {
        let inputs = SpawnRateInputs {
            fps: self.fps.fps,
            level: self.state.level,
            distance: self.state.distance_traveled,
            difficulty: self.state.difficulty_multiplier,
            event_factor: self.event_effects().spawn_interval_factor,
            low_performance: self.low_performance,
        };
        spawn::calculate_dynamic_spawn_rate(
            self.sections.current(),
            &inputs,
            &self.config.spawn,
            &self.config.performance,
        )
    }

    fn spawn_speed(&self) -> f32 {
        let speed = spawn::spawn_speed(
            self.state.level,
            self.state.difficulty_multiplier,
            &self.config.spawn,
        );
        speed * self.event_effects().object_speed_factor
    }

    /// Spawn `kind` at a random x just above the canvas
    pub fn spawn_single_object(&mut self, kind: ObjectKind) -> u32 {
        let x = spawn::spawn_x(&mut self.rng, self.config.canvas.width, &self.config.spawn);
        let speed = self.spawn_speed();
        if kind.is_bonus() && kind != ObjectKind::Gift {
            log::debug!("Spawned {} at x {:.0}", kind.as_str(), x);
        }
        self.place_object(kind, Vec2::new(x, SPAWN_Y), speed)
    }

    /// Add an object at an exact position with its spawn health
    pub fn place_object(&mut self, kind: ObjectKind, pos: Vec2, speed: f32) -> u32 {
        let id = self.next_entity_id();
        self.objects
            .push(GameObject::new(id, kind, pos, speed, kind.spawn_health()));
        id
    }

    fn spawn_life_bonus(&mut self) {
        let x = spawn::life_bonus_x(&mut self.rng, self.config.canvas.width);
        let speed = self.spawn_speed() * self.config.spawn.life_bonus_speed_factor;
        self.place_object(ObjectKind::ExtraLife, Vec2::new(x, SPAWN_Y), speed);
    }

    /// Bring in this zone's boss now, latching the spawn for the zone
    pub fn spawn_boss(&mut self) {
        if !self.state.boss_spawned {
            self.state.boss_spawned = true;
            self.state.push_cue(FeedbackCue::BossSpawned);
        }
        self.create_boss();
    }

    fn create_boss(&mut self) {
        let mut boss = Boss::new(self.state.zone, self.canvas_size());
        if self.low_performance {
            boss.reduce_difficulty();
        }
        log::info!(
            "Boss of zone {} spawned with {} health",
            self.state.zone,
            boss.max_health
        );
        self.boss = Some(boss);
    }

    fn check_collisions(&mut self) {
        self.collide_sleigh_with_objects();
        self.collide_snowballs_with_objects();
        self.collide_with_boss();
    }

    fn collide_sleigh_with_objects(&mut self) {
        for i in 0..self.objects.len() {
            let object = &self.objects[i];
            if !object.active || !check_collision(&self.sleigh.bounds(), &object.bounds()) {
                continue;
            }
            let kind = object.kind;
            self.objects[i].active = false;

            match kind {
                ObjectKind::Gift => {
                    let points = self.gift_points();
                    self.state.add_score(points);
                }
                ObjectKind::ExtraLife => self.state.add_life(),
                ObjectKind::SnowBlower => self.activate_fire_multiplier(),
                ObjectKind::MoveSpeedBoost => self.activate_speed_multiplier(),
                _ => {
                    self.state.remove_life();
                    self.sleigh.collision_feedback(&mut self.rng);
                }
            }
        }
    }

    /// Points for one gift under the active multipliers and event
    pub fn gift_points(&self) -> u64 {
        let base = self.config.scoring.gift_points * self.multipliers.score_factor();
        let effects = self.event_effects();
        let factor = effects.gift_factor * effects.score_factor;
        if (factor - 1.0).abs() < f32::EPSILON || !factor.is_finite() || factor <= 0.0 {
            base
        } else {
            (base as f32 * factor).round() as u64
        }
    }

    fn collide_snowballs_with_objects(&mut self) {
        let friendly_fire = self.settings.friendly_fire;
        let points = self.config.scoring.obstacle_points;

        for snowball in self.snowballs.iter_mut().filter(|s| s.active) {
            for object in self.objects.iter_mut() {
                if !snowball.active {
                    break;
                }
                if !object.active || !check_collision(&snowball.bounds(), &object.bounds()) {
                    continue;
                }

                if object.kind.is_obstacle() {
                    snowball.active = false;
                    if object.take_damage(1) {
                        self.state.add_score(points);
                        self.state.push_cue(FeedbackCue::ObstacleDestroyed);
                    }
                } else if friendly_fire {
                    snowball.active = false;
                    object.active = false;
                    log::debug!("Friendly fire destroyed {}", object.kind.as_str());
                }
                // Friendly fire off: bonuses are immune and the snowball flies on
            }
        }
    }

    fn collide_with_boss(&mut self) {
        let Some(boss) = self.boss.as_mut() else {
            return;
        };
        if !boss.active {
            return;
        }

        if check_collision(&self.sleigh.bounds(), &boss.bounds()) {
            self.state.remove_life();
            self.sleigh.collision_feedback(&mut self.rng);
        }

        let boss_bounds = boss.bounds();
        for snowball in self.snowballs.iter_mut().filter(|s| s.active) {
            if !boss.active {
                break;
            }
            if !check_collision(&snowball.bounds(), &boss_bounds) {
                continue;
            }
            snowball.active = false;
            if boss.take_damage(1) {
                self.state.set_boss_defeated();
            } else {
                self.state.push_cue(FeedbackCue::BossHit);
            }
        }

        if !boss.active {
            return;
        }
        // Projectiles keep flying after a hit; only the sleigh pays
        let sleigh_bounds = self.sleigh.bounds();
        let hits = boss
            .projectiles
            .iter()
            .filter(|p| check_collision(&sleigh_bounds, &p.bounds()))
            .count();
        for _ in 0..hits {
            self.state.remove_life();
            self.sleigh.collision_feedback(&mut self.rng);
        }
    }

    fn cleanup(&mut self) {
        let floor = self.config.canvas.height + CLEANUP_MARGIN;
        self.objects.retain(|o| o.active && o.pos.y <= floor);
        self.snowballs
            .retain(|s| s.active && s.pos.y > SNOWBALL_CLEANUP_Y);
        self.objects.truncate(self.config.performance.max_objects);
    }

    fn flush_feedback(&mut self) {
        let cues = self.state.drain_cues();
        if !self.settings.haptics {
            return;
        }
        for cue in cues {
            self.feedback.emit(cue);
        }
    }

    pub fn activate_fire_multiplier(&mut self) {
        self.multipliers.activate_fire(self.clock_ms);
        self.state.push_cue(FeedbackCue::FireMultiplier);
    }

    pub fn activate_speed_multiplier(&mut self) {
        let factor = self
            .multipliers
            .activate_speed(self.clock_ms, self.sleigh.max_velocity);
        self.sleigh.apply_boost(factor);
        self.state.push_cue(FeedbackCue::SpeedMultiplier);
    }

    pub fn activate_score_multiplier(&mut self) {
        self.multipliers.activate_score(self.clock_ms);
    }

    pub fn set_friendly_fire_mode(&mut self, enabled: bool) {
        self.settings.friendly_fire = enabled;
        log::info!("Friendly fire {}", if enabled { "on" } else { "off" });
    }

    /// Fresh run from zone 1; low-performance mode and the clock carry over
    pub fn restart(&mut self) {
        self.state.reset();
        self.sleigh.reset();
        self.objects.clear();
        self.snowballs.clear();
        self.boss = None;
        self.multipliers.clear();
        self.active_event = None;
        self.continuous_fire = false;
        self.spawner.reset(&self.config.spawn, self.clock_ms);
        self.background.set_zone(1);
        let reset = self.sections.reset(&mut SectionHost {
            background: &mut self.background,
        });
        if let Err(err) = reset {
            log::error!("Restart kept the current section: {}", err);
        }
        log::info!("Game restarted");
    }

    /// Next zone: keeps score, lives and multipliers, clears the field
    pub fn advance_to_next_zone(&mut self) {
        self.state.advance_to_next_zone();
        self.background.set_zone(self.state.zone);
        self.boss = None;
        self.objects.clear();
        self.snowballs.clear();
        self.active_event = None;
        self.spawner.reset(&self.config.spawn, self.clock_ms);

        let loaded = self.sections.advance_to_next_section(&mut SectionHost {
            background: &mut self.background,
        });
        if loaded.is_err() {
            // The previous section stays; only its atmosphere is reset
            self.background.reset_atmosphere();
        }
        log::info!(
            "Advanced to zone {} ({})",
            self.state.zone,
            self.sections.current().name()
        );
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    fn event_effects(&self) -> EventEffects {
        self.active_event
            .map_or(EventEffects::NEUTRAL, |active| active.event.effects)
    }

    pub fn canvas_size(&self) -> Vec2 {
        Vec2::new(self.config.canvas.width, self.config.canvas.height)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn sleigh(&self) -> &Sleigh {
        &self.sleigh
    }

    pub fn objects(&self) -> &[GameObject] {
        &self.objects
    }

    pub fn snowballs(&self) -> &[Snowball] {
        &self.snowballs
    }

    pub fn boss(&self) -> Option<&Boss> {
        self.boss.as_ref()
    }

    pub fn boss_mut(&mut self) -> Option<&mut Boss> {
        self.boss.as_mut()
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn sections(&self) -> &SectionManager {
        &self.sections
    }

    pub fn current_section(&self) -> &dyn Section {
        self.sections.current()
    }

    pub fn multipliers(&self) -> &Multipliers {
        &self.multipliers
    }

    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    pub fn active_event(&self) -> Option<&ActiveEvent> {
        self.active_event.as_ref()
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn fps(&self) -> f32 {
        self.fps.fps
    }

    pub fn is_low_performance(&self) -> bool {
        self.low_performance
    }

    pub fn is_firing(&self) -> bool {
        self.continuous_fire
    }
}

/// Negative and non-finite deltas count as no time; long stalls are capped,
/// so the run's distance and timers lose whatever the cap cuts off
fn sanitize_dt(dt_ms: f32) -> f32 {
    if dt_ms.is_finite() {
        dt_ms.clamp(0.0, MAX_FRAME_MS)
    } else {
        0.0
    }
}
