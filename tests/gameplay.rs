//! End-to-end runs through the public `Game` API

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use sleigh_rush::config::{DifficultyConfig, LevelThreshold};
use sleigh_rush::consts::FRAME_MS;
use sleigh_rush::platform::{FeedbackCue, RecordingFeedback};
use sleigh_rush::sim::{GameState, LevelAdvance, ObjectKind, Theme};
use sleigh_rush::view::{AssetCache, DisplayList, StaticAssets, draw_frame};
use sleigh_rush::{ConfigError, Game, GameConfig, Settings, TickInput};

fn game(seed: u64) -> Game {
    Game::new(GameConfig::default(), Settings::default(), seed)
}

fn idle(game: &mut Game, frames: usize) {
    for _ in 0..frames {
        game.update(&TickInput::default(), FRAME_MS);
    }
}

fn three_stage_difficulty() -> DifficultyConfig {
    DifficultyConfig {
        thresholds: vec![
            LevelThreshold { level: 1, distance: 0.0, gifts: 0 },
            LevelThreshold { level: 2, distance: 1200.0, gifts: 10 },
            LevelThreshold { level: 3, distance: 2400.0, gifts: 20 },
        ],
        ..DifficultyConfig::default()
    }
}

#[test]
fn test_grace_distance_advances_without_gifts() {
    let mut state = GameState::new(three_stage_difficulty());
    state.score = 5;
    state.distance_traveled = 2500.0;

    assert_eq!(state.check_level_progress(), Some(LevelAdvance::Grace));
    assert_eq!(state.level, 2);
    assert_eq!(state.check_level_progress(), None);

    state.update_distance(2699.0);
    assert_eq!(state.level, 2);
    state.update_distance(2700.0);
    assert_eq!(state.level, 3);
    assert!(state.drain_cues().contains(&FeedbackCue::LevelUpByDistance));
}

#[test]
fn test_earned_level_needs_distance_and_score() {
    let mut state = GameState::new(three_stage_difficulty());
    state.add_score(20);
    assert_eq!(state.level, 1);
    state.update_distance(2400.0);
    assert_eq!(state.level, 3);
    assert!(state.drain_cues().contains(&FeedbackCue::LevelUp));
}

#[test]
fn test_game_over_latches_once() {
    let mut state = GameState::new(DifficultyConfig::default());
    for _ in 0..5 {
        state.remove_life();
    }
    assert!(state.game_over);
    assert!(state.lives <= 0);
    let damage = state
        .drain_cues()
        .into_iter()
        .filter(|c| *c == FeedbackCue::Damage)
        .count();
    assert_eq!(damage, 5);
}

#[test]
fn test_snow_blower_pickup_fans_out_three_shots() {
    let feedback = Rc::new(RefCell::new(RecordingFeedback::default()));
    let mut game = game(4).with_feedback(Rc::clone(&feedback));

    let at_sleigh = game.sleigh().pos;
    game.place_object(ObjectKind::SnowBlower, at_sleigh, 0.0);
    idle(&mut game, 1);

    assert!(game.objects().is_empty());
    assert_eq!(feedback.borrow().count(FeedbackCue::FireMultiplier), 1);
    assert_eq!(game.fire(), 3);
    assert_eq!(game.snowballs().len(), 3);
}

#[test]
fn test_gift_pickup_scores() {
    let mut game = game(5);
    let at_sleigh = game.sleigh().pos;
    game.place_object(ObjectKind::Gift, at_sleigh, 0.0);
    idle(&mut game, 1);
    assert_eq!(game.state().score, 10);
}

#[test]
fn test_restart_gives_fresh_run() {
    let mut game = game(6);
    game.set_continuous_fire(true);
    idle(&mut game, 300);
    game.state_mut().lives = 1;
    game.activate_score_multiplier();

    game.restart();

    let state = game.state();
    assert_eq!(state.score, 0);
    assert_eq!(state.lives, 3);
    assert_eq!(state.level, 1);
    assert_eq!(state.zone, 1);
    assert_eq!(state.distance_traveled, 0.0);
    assert!(game.objects().is_empty());
    assert!(game.snowballs().is_empty());
    assert!(!game.is_firing());
    assert_eq!(game.multipliers().score_factor(), 1);
    assert_eq!(game.current_section().name(), "Enchanted Forest");
}

#[test]
fn test_zone_advance_moves_to_city() {
    let mut game = game(7);
    game.state_mut().score = 120;
    game.state_mut().lives = 2;
    game.spawn_boss();

    game.advance_to_next_zone();

    assert_eq!(game.state().zone, 2);
    assert_eq!(game.state().level, 1);
    assert_eq!(game.state().score, 120);
    assert_eq!(game.state().lives, 2);
    assert!(game.boss().is_none());
    assert_eq!(game.background().theme, Theme::City);
    assert_eq!(game.current_section().name(), "Christmas City");
}

#[test]
fn test_seeded_runs_replay_identically() {
    let run = |seed| {
        let mut game = game(seed);
        game.set_continuous_fire(true);
        for i in 0..900 {
            let dx = if (i / 60) % 2 == 0 { 1.0 } else { -1.0 };
            let input = TickInput {
                movement: Vec2::new(dx, 0.0),
                ..TickInput::default()
            };
            game.update(&input, FRAME_MS);
        }
        serde_json::to_string(&game.snapshot()).unwrap()
    };
    assert_eq!(run(42), run(42));
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = GameConfig::default();
    config.spawn.min_interval_ms = 5000.0;
    let json = config.to_json().unwrap();
    assert!(matches!(
        GameConfig::from_json(&json),
        Err(ConfigError::SpawnBand { .. })
    ));
    assert!(matches!(GameConfig::from_json("{"), Err(ConfigError::Parse(_))));
}

#[test]
fn test_partial_config_keeps_defaults() {
    let config = GameConfig::from_json(r#"{ "canvas": { "width": 360.0 } }"#).unwrap();
    assert_eq!(config.canvas.width, 360.0);
    assert_eq!(config.canvas.height, 800.0);
    assert_eq!(config.performance.max_objects, 35);
}

#[test]
fn test_frame_draws_after_a_run() {
    let mut game = game(8);
    idle(&mut game, 200);
    let mut list = DisplayList::new();
    let mut assets = AssetCache::new(StaticAssets::complete());
    let stats = draw_frame(&game.snapshot(), &mut list, &mut assets);
    assert_eq!(stats.placeholders, 0);
    assert!(stats.images >= 1);
    assert!(!list.is_empty());
}
