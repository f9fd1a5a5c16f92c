//! Sleigh Rush headless runner
//!
//! Plays a seeded run with a simple autopilot and prints a JSON summary.
//! Web builds drive `Game` from the host page instead.
//!
//! Usage: sleigh-rush [--seed N] [--seconds N] [--config PATH] [--snapshot] [--battery]

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::error::Error;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    use clap::Parser;
    use glam::Vec2;
    use serde::Serialize;

    use sleigh_rush::consts::FRAME_MS;
    use sleigh_rush::platform::{self, RecordingFeedback};
    use sleigh_rush::sim::{Game, RunStats, TickInput};
    use sleigh_rush::view::{AssetCache, DisplayList, StaticAssets, draw_frame};
    use sleigh_rush::{GameConfig, Settings};

    /// How far above the sleigh the autopilot looks
    const LOOKAHEAD: f32 = 220.0;

    #[derive(Parser, Debug)]
    #[command(name = "sleigh-rush")]
    #[command(about = "Play a seeded Sleigh Rush run headless and print a JSON summary")]
    struct Args {
        /// Seed for the run's RNG
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Simulated seconds to play (the run stops earlier on a win or game over)
        #[arg(long, default_value_t = 120.0)]
        seconds: f32,
        /// Balance file (JSON); unreadable or invalid files fall back to defaults
        #[arg(long = "config")]
        config_path: Option<PathBuf>,
        /// Also print the final frame snapshot
        #[arg(long = "snapshot")]
        print_snapshot: bool,
        /// Run with the battery saver (lower frame-rate target, fewer spawns)
        #[arg(long)]
        battery: bool,
    }

    /// Load a balance file, falling back to defaults when it is unusable
    fn load_config(path: Option<&Path>) -> GameConfig {
        let Some(path) = path else {
            return GameConfig::default();
        };
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Cannot read config {}: {}, using defaults", path.display(), e);
                return GameConfig::default();
            }
        };
        match GameConfig::from_json(&json) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Invalid config {}: {}, using defaults", path.display(), e);
                GameConfig::default()
            }
        }
    }

    /// Dodge the nearest obstacle ahead, otherwise chase the nearest pickup
    fn autopilot(game: &Game) -> TickInput {
        let sleigh = game.sleigh();
        let center = sleigh.center();
        let ahead = |pos: Vec2, size: Vec2| {
            let bottom = pos.y + size.y;
            bottom <= sleigh.pos.y + sleigh.size.y && sleigh.pos.y - bottom < LOOKAHEAD
        };

        let threat = game
            .objects()
            .iter()
            .filter(|o| o.active && o.kind.is_obstacle() && ahead(o.pos, o.size()))
            .filter(|o| {
                let half = (o.size().x + sleigh.size.x) / 2.0;
                (o.bounds().center().x - center.x).abs() < half
            })
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

        let dx = if let Some(obstacle) = threat {
            let away = center.x - obstacle.bounds().center().x;
            let width = game.canvas_size().x;
            // Near a wall, dodge toward open space
            if center.x < sleigh.size.x {
                1.0
            } else if center.x > width - sleigh.size.x {
                -1.0
            } else if away >= 0.0 {
                1.0
            } else {
                -1.0
            }
        } else {
            game.objects()
                .iter()
                .filter(|o| o.active && o.kind.is_bonus() && ahead(o.pos, o.size()))
                .map(|o| o.bounds().center().x - center.x)
                .min_by(|a, b| a.abs().total_cmp(&b.abs()))
                .map_or(0.0, |offset| (offset / 40.0).clamp(-1.0, 1.0))
        };

        TickInput {
            movement: Vec2::new(dx, 0.0),
            fire: false,
            fire_toggle: false,
        }
    }

    #[derive(Serialize)]
    struct Summary {
        seed: u64,
        frames: u64,
        clock_ms: f64,
        score: u64,
        game_over: bool,
        game_won: bool,
        section: &'static str,
        low_performance: bool,
        /// Distance units per second survived
        average_speed: f32,
        stats: RunStats,
        cues: BTreeMap<String, usize>,
        final_frame_commands: usize,
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        platform::init_logging();
        let args = Args::parse();
        let config = load_config(args.config_path.as_deref());
        log::info!("Sleigh Rush headless run: seed {}, {}s", args.seed, args.seconds);

        let feedback = Rc::new(RefCell::new(RecordingFeedback::default()));
        let mut game = Game::new(config, Settings::default(), args.seed).with_feedback(Rc::clone(&feedback));
        if args.battery {
            game.optimize_for_battery();
        }
        game.set_continuous_fire(true);

        let max_frames = (args.seconds.max(0.0) * 1000.0 / FRAME_MS) as u64;
        let mut frames = 0;
        while frames < max_frames && !game.state().is_terminal() {
            let input = autopilot(&game);
            game.update(&input, FRAME_MS);
            frames += 1;
        }

        let snapshot = game.snapshot();
        let mut display = DisplayList::new();
        let mut assets = AssetCache::new(StaticAssets::complete());
        draw_frame(&snapshot, &mut display, &mut assets);

        let mut cues = BTreeMap::new();
        for cue in &feedback.borrow().cues {
            *cues.entry(format!("{cue:?}")).or_insert(0) += 1;
        }

        let state = game.state();
        let summary = Summary {
            seed: args.seed,
            frames,
            clock_ms: game.clock_ms(),
            score: state.score,
            game_over: state.game_over,
            game_won: state.game_won,
            section: game.current_section().name(),
            low_performance: game.is_low_performance(),
            average_speed: state.average_speed(),
            stats: state.stats(),
            cues,
            final_frame_commands: display.len(),
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        if args.print_snapshot {
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Web hosts construct `sleigh_rush::Game` directly
}
