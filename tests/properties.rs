//! Property tests for spawning policy and whole-run invariants

use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;

use sleigh_rush::config::{PerformanceConfig, SpawnConfig};
use sleigh_rush::sim::{
    CitySection, ForestSection, Section, SimRng, SpawnRateInputs, calculate_dynamic_spawn_rate,
    weighted_select,
};
use sleigh_rush::{Game, GameConfig, Settings, TickInput};

fn any_factor() -> impl Strategy<Value = f32> {
    prop_oneof![
        0.0f32..10.0,
        Just(f32::NAN),
        Just(f32::INFINITY),
        Just(0.0),
        Just(-1.0),
    ]
}

prop_compose! {
    fn rate_inputs()(
        fps in 0.0f32..240.0,
        level in 1u32..8,
        distance in 0.0f32..20_000.0,
        difficulty in any_factor(),
        event_factor in 0.1f32..3.0,
        low_performance in any::<bool>(),
    ) -> SpawnRateInputs {
        SpawnRateInputs { fps, level, distance, difficulty, event_factor, low_performance }
    }
}

prop_compose! {
    fn tick_input()(
        dx in -2.0f32..2.0,
        dy in -2.0f32..2.0,
        fire in any::<bool>(),
        fire_toggle in proptest::bool::weighted(0.02),
    ) -> TickInput {
        TickInput { movement: Vec2::new(dx, dy), fire, fire_toggle }
    }
}

fn frame_ms() -> impl Strategy<Value = f32> {
    prop_oneof![
        8 => 8.0f32..40.0,
        1 => Just(f32::NAN),
        1 => Just(-16.0),
        1 => Just(1000.0),
    ]
}

proptest! {
    #[test]
    fn spawn_interval_stays_in_band(inputs in rate_inputs(), city in any::<bool>()) {
        let spawn = SpawnConfig::default();
        let perf = PerformanceConfig::default();
        let section: Box<dyn Section> = if city { Box::new(CitySection) } else { Box::new(ForestSection) };

        let interval = calculate_dynamic_spawn_rate(section.as_ref(), &inputs, &spawn, &perf);
        prop_assert!(interval >= spawn.min_interval_ms);
        prop_assert!(interval <= spawn.max_interval_ms);
    }

    #[test]
    fn weighted_select_respects_weights(
        weights in proptest::collection::vec(0u32..20, 0..8),
        seed in any::<u64>(),
    ) {
        let items: Vec<(usize, u32)> = weights.iter().copied().enumerate().collect();
        let mut rng = SimRng::seed_from_u64(seed);
        let picked = weighted_select(&items, &mut rng);

        if items.is_empty() {
            prop_assert_eq!(picked, None);
        } else if weights.iter().all(|&w| w == 0) {
            prop_assert_eq!(picked, Some(0));
        } else {
            let index = picked.expect("non-empty table");
            prop_assert!(weights[index] > 0);
        }
    }

    #[test]
    fn runs_keep_their_invariants(
        seed in any::<u64>(),
        steps in proptest::collection::vec((tick_input(), frame_ms()), 1..400),
    ) {
        let config = GameConfig::default();
        let max_objects = config.performance.max_objects;
        let mut game = Game::new(config, Settings::default(), seed);
        let canvas = game.canvas_size();
        let mut distance = 0.0f32;

        for (input, dt) in &steps {
            game.update(input, *dt);
            let state = game.state();

            if state.lives <= 0 {
                prop_assert!(state.game_over);
            }
            prop_assert!(state.distance_traveled >= distance);
            distance = state.distance_traveled;

            prop_assert!(game.objects().len() <= max_objects);

            let sleigh = game.sleigh();
            prop_assert!(sleigh.pos.x >= 0.0 && sleigh.pos.x + sleigh.size.x <= canvas.x);
            prop_assert!(sleigh.pos.y >= 0.0 && sleigh.pos.y + sleigh.size.y <= canvas.y);
            prop_assert!(game.clock_ms().is_finite());
        }
    }
}
