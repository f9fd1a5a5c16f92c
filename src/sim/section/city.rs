//! Zone 2: the Christmas city
//!
//! Urban obstacles reuse the shared sprite set: traffic lights are fenced
//! trees, buildings are armored snowmen and parked cars are snowmen.

use super::{EventEffects, EventRule, LevelStage, Section, SpecialEventKind};
use crate::sim::background::Theme;
use crate::sim::object::ObjectKind;

const TRAFFIC_LIGHT: ObjectKind = ObjectKind::ReinforcedObstacle;
const BUILDING: ObjectKind = ObjectKind::ArmoredSnowman;
const CAR: ObjectKind = ObjectKind::SnowmanObstacle;

const LEVELS: [LevelStage; 4] = [
    LevelStage {
        level: 1,
        name: "Suburbs",
        max_distance: 3000.0,
        score_required: 25,
        spawn_rate: 1.1,
        obstacles: &[ObjectKind::LampPostObstacle, TRAFFIC_LIGHT],
    },
    LevelStage {
        level: 2,
        name: "Old Town",
        max_distance: 6000.0,
        score_required: 50,
        spawn_rate: 1.3,
        obstacles: &[ObjectKind::LampPostObstacle, TRAFFIC_LIGHT, BUILDING],
    },
    LevelStage {
        level: 3,
        name: "Shopping District",
        max_distance: 10_000.0,
        score_required: 80,
        spawn_rate: 1.5,
        obstacles: &[ObjectKind::LampPostObstacle, TRAFFIC_LIGHT, BUILDING, CAR],
    },
    LevelStage {
        level: 4,
        name: "Downtown Towers",
        max_distance: 15_000.0,
        score_required: 120,
        spawn_rate: 1.8,
        obstacles: &[ObjectKind::LampPostObstacle, TRAFFIC_LIGHT, BUILDING, CAR],
    },
];

const EVENTS: [EventRule; 3] = [
    EventRule {
        kind: SpecialEventKind::RushHour,
        after: 4000.0,
        before: 4200.0,
        max_lives: None,
        chance: 0.12,
        duration_ms: 6000.0,
        // Twice the traffic, but more bonuses and points
        effects: EventEffects {
            spawn_interval_factor: 0.5,
            bonus_chance: Some(15),
            score_factor: 1.5,
            ..EventEffects::NEUTRAL
        },
    },
    EventRule {
        kind: SpecialEventKind::Blackout,
        after: 8000.0,
        before: 8100.0,
        max_lives: None,
        chance: 0.08,
        duration_ms: 4000.0,
        effects: EventEffects {
            visibility: 0.4,
            darkness: 0.6,
            spawn_interval_factor: 1.0 / 0.6,
            ..EventEffects::NEUTRAL
        },
    },
    EventRule {
        kind: SpecialEventKind::ChristmasParty,
        after: 12_000.0,
        before: 12_200.0,
        max_lives: None,
        chance: 0.1,
        duration_ms: 5000.0,
        effects: EventEffects {
            gift_factor: 3.0,
            bonus_chance: Some(16),
            ..EventEffects::NEUTRAL
        },
    },
];

#[derive(Debug, Default, Clone, Copy)]
pub struct CitySection;

impl Section for CitySection {
    fn name(&self) -> &'static str {
        "Christmas City"
    }

    fn theme(&self) -> Theme {
        Theme::City
    }

    fn difficulty_multiplier(&self) -> f32 {
        1.2
    }

    fn description(&self) -> &'static str {
        "The bustling Christmas city full of lights and traffic"
    }

    fn obstacle_weights(&self, level: u32) -> Vec<(ObjectKind, u32)> {
        match level {
            0 | 1 => vec![(ObjectKind::LampPostObstacle, 60), (TRAFFIC_LIGHT, 40)],
            2 => vec![
                (ObjectKind::LampPostObstacle, 40),
                (TRAFFIC_LIGHT, 30),
                (BUILDING, 30),
            ],
            3 => vec![
                (ObjectKind::LampPostObstacle, 30),
                (TRAFFIC_LIGHT, 25),
                (BUILDING, 25),
                (CAR, 20),
            ],
            _ => vec![
                (ObjectKind::LampPostObstacle, 35),
                (TRAFFIC_LIGHT, 25),
                (BUILDING, 20),
                (CAR, 15),
                (ObjectKind::Obstacle, 5),
            ],
        }
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
    use crate::sim::SimRng;
    use rand::SeedableRng;

    #[test]
    fn test_spawn_rate_scales_by_difficulty() {
        assert!((CitySection.calculate_spawn_rate(1000.0, 1) - 1200.0).abs() < 1e-3);
        assert!((CitySection.calculate_spawn_rate(1000.0, 4) - 1200.0).abs() < 1e-3);
    }

    #[test]
    fn test_first_level_has_no_trees() {
        let mut rng = SimRng::seed_from_u64(21);
        for _ in 0..500 {
            let kind = CitySection.select_obstacle(1, &mut rng);
            assert!(matches!(kind, ObjectKind::LampPostObstacle | ObjectKind::ReinforcedObstacle));
        }
    }

    #[test]
    fn test_blackout_darkens() {
        let blackout = EVENTS
            .iter()
            .find(|rule| rule.kind == SpecialEventKind::Blackout)
            .unwrap();
        assert!(blackout.effects.changes_atmosphere());
        assert!(blackout.effects.spawn_interval_factor > 1.0);
    }
}
