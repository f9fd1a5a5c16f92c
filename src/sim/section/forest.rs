//! Zone 1: the enchanted forest

use super::{EventEffects, EventRule, LevelStage, Section, SpecialEventKind};
use crate::sim::background::Theme;
use crate::sim::object::ObjectKind;

const LEVELS: [LevelStage; 4] = [
    LevelStage {
        level: 1,
        name: "Village Trail",
        max_distance: 2500.0,
        score_required: 15,
        spawn_rate: 1.0,
        obstacles: &[ObjectKind::Obstacle],
    },
    LevelStage {
        level: 2,
        name: "Deep Woods",
        max_distance: 5000.0,
        score_required: 35,
        spawn_rate: 1.2,
        obstacles: &[ObjectKind::Obstacle, ObjectKind::SnowmanObstacle],
    },
    LevelStage {
        level: 3,
        name: "Lamplight Glade",
        max_distance: 8000.0,
        score_required: 60,
        spawn_rate: 1.4,
        obstacles: &[
            ObjectKind::Obstacle,
            ObjectKind::SnowmanObstacle,
            ObjectKind::LampPostObstacle,
        ],
    },
    LevelStage {
        level: 4,
        name: "Forest Edge",
        max_distance: 12_000.0,
        score_required: 100,
        spawn_rate: 1.6,
        obstacles: &[
            ObjectKind::Obstacle,
            ObjectKind::SnowmanObstacle,
            ObjectKind::LampPostObstacle,
            ObjectKind::ReinforcedObstacle,
        ],
    },
];

const EVENTS: [EventRule; 3] = [
    EventRule {
        kind: SpecialEventKind::Snowstorm,
        after: 3000.0,
        before: 3200.0,
        max_lives: None,
        chance: 0.1,
        duration_ms: 5000.0,
        effects: EventEffects {
            visibility: 0.7,
            snow_intensity: 2.0,
            gift_factor: 2.0,
            ..EventEffects::NEUTRAL
        },
    },
    EventRule {
        kind: SpecialEventKind::ForestBlessing,
        after: 6000.0,
        before: 6100.0,
        max_lives: Some(2),
        chance: 0.15,
        duration_ms: 3000.0,
        effects: EventEffects {
            life_chance: Some(15),
            ..EventEffects::NEUTRAL
        },
    },
    EventRule {
        kind: SpecialEventKind::ClearPath,
        after: 9000.0,
        before: 9200.0,
        max_lives: None,
        chance: 0.08,
        duration_ms: 4000.0,
        // 60% fewer obstacles, 30% faster
        effects: EventEffects {
            spawn_interval_factor: 2.5,
            object_speed_factor: 1.3,
            ..EventEffects::NEUTRAL
        },
    },
];

#[derive(Debug, Default, Clone, Copy)]
pub struct ForestSection;

impl Section for ForestSection {
    fn name(&self) -> &'static str {
        "Enchanted Forest"
    }

    fn theme(&self) -> Theme {
        Theme::Forest
    }

    fn description(&self) -> &'static str {
        "The enchanted forest where the journey begins"
    }

    /// Trees only at first, then snowmen, lamp posts and fenced trees
    fn obstacle_weights(&self, level: u32) -> Vec<(ObjectKind, u32)> {
        match level {
            0 | 1 => vec![(ObjectKind::Obstacle, 100)],
            2 => vec![(ObjectKind::Obstacle, 60), (ObjectKind::SnowmanObstacle, 40)],
            3 => vec![
                (ObjectKind::Obstacle, 45),
                (ObjectKind::SnowmanObstacle, 35),
                (ObjectKind::LampPostObstacle, 20),
            ],
            _ => vec![
                (ObjectKind::Obstacle, 50),
                (ObjectKind::SnowmanObstacle, 30),
                (ObjectKind::LampPostObstacle, 15),
                (ObjectKind::ReinforcedObstacle, 5),
            ],
        }
    }

    /// Deeper stages spawn faster
    fn calculate_spawn_rate(&self, base_interval_ms: f32, level: u32) -> f32 {
        let factor = self.stage(level).map_or(1.0, |stage| stage.spawn_rate);
        base_interval_ms / factor.max(f32::EPSILON)
    }

    fn event_rules(&self) -> &'static [EventRule] {
        &EVENTS
    }

    fn levels(&self) -> &'static [LevelStage] {
        &LEVELS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DifficultyConfig;
    use crate::sim::SimRng;
    use crate::sim::state::GameState;
    use rand::SeedableRng;

    #[test]
    fn test_level_one_is_trees_only() {
        let mut rng = SimRng::seed_from_u64(9);
        for _ in 0..500 {
            assert_eq!(ForestSection.select_obstacle(1, &mut rng), ObjectKind::Obstacle);
        }
    }

    #[test]
    fn test_later_levels_never_pick_armored_snowman() {
        let mut rng = SimRng::seed_from_u64(9);
        for level in 1..=6 {
            for _ in 0..200 {
                assert_ne!(ForestSection.select_obstacle(level, &mut rng), ObjectKind::ArmoredSnowman);
            }
        }
    }

    #[test]
    fn test_spawn_rate_shrinks_with_level() {
        assert_eq!(ForestSection.calculate_spawn_rate(1000.0, 1), 1000.0);
        assert!((ForestSection.calculate_spawn_rate(1000.0, 4) - 625.0).abs() < 1e-3);
        // Past the table: last stage
        assert!((ForestSection.calculate_spawn_rate(1000.0, 9) - 625.0).abs() < 1e-3);
    }

    #[test]
    fn test_snowstorm_only_inside_window() {
        let mut rng = SimRng::seed_from_u64(9);
        let mut state = GameState::new(DifficultyConfig::default());
        state.distance_traveled = 2000.0;
        assert!((0..1000).all(|_| ForestSection.check_special_events(&state, &mut rng).is_none()));

        state.distance_traveled = 3100.0;
        let event = (0..1000).find_map(|_| ForestSection.check_special_events(&state, &mut rng));
        let event = event.expect("10% roll over 1000 tries");
        assert_eq!(event.kind, SpecialEventKind::Snowstorm);
        assert_eq!(event.effects.gift_factor, 2.0);
    }

    #[test]
    fn test_completion_needs_final_stage() {
        let mut state = GameState::new(DifficultyConfig::default());
        state.distance_traveled = 12_000.0;
        state.score = 99;
        assert!(!ForestSection.is_completed(&state));
        state.score = 100;
        assert!(ForestSection.is_completed(&state));
    }
}
