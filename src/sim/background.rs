//! Scrolling backdrop state (snowfall, theme, atmosphere); drawing lives in the view

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::frame_factor;

/// Snowflake layers: (count, size, speed, opacity)
const LAYERS: [(usize, f32, f32, f32); 3] = [(60, 2.0, 1.0, 0.7), (40, 3.0, 1.5, 0.8), (30, 4.0, 2.0, 0.9)];
/// Flakes are wrapped once this far outside the canvas
const WRAP_MARGIN: f32 = 10.0;
const SCROLL_SPEED: f32 = 2.0;
/// Low-performance mode keeps at least this many flakes
const MIN_FLAKES: usize = 60;

/// Visual theme picked by the current section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Theme {
    #[default]
    Forest,
    City,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Forest => "forest",
            Theme::City => "city",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Snowflake {
    pub pos: Vec2,
    pub size: f32,
    pub speed: f32,
    pub opacity: f32,
    pub wind: f32,
    pub angle: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Background {
    pub theme: Theme,
    pub zone: u32,
    /// Vertical scroll offset (wraps at the canvas height)
    pub offset: f32,
    pub speed: f32,
    /// Snowfall speed multiplier (snowstorm raises it)
    pub snow_intensity: f32,
    /// Overlay darkness 0..1 (blackout raises it)
    pub darkness: f32,
    /// Visibility 0..1 (storms lower it)
    pub visibility: f32,
    pub snowflakes: Vec<Snowflake>,
    canvas: Vec2,
}

impl Background {
    pub fn new<R: Rng>(canvas: Vec2, zone: u32, rng: &mut R) -> Self {
        Self {
            theme: Theme::default(),
            zone,
            offset: 0.0,
            speed: SCROLL_SPEED,
            snow_intensity: 1.0,
            darkness: 0.0,
            visibility: 1.0,
            snowflakes: create_snowflakes(canvas, rng),
            canvas,
        }
    }

    pub fn update<R: Rng>(&mut self, dt_ms: f32, rng: &mut R) {
        let f = frame_factor(dt_ms);
        let canvas = self.canvas;

        if canvas.y > 0.0 {
            self.offset = (self.offset + self.speed * f).rem_euclid(canvas.y);
        }

        let fall = self.snow_intensity * f;
        for flake in &mut self.snowflakes {
            flake.pos.y += flake.speed * fall;
            flake.pos.x += flake.wind * f;
            flake.angle += 0.02 * f;

            if flake.pos.y > canvas.y + WRAP_MARGIN {
                flake.pos.y = -WRAP_MARGIN;
                flake.pos.x = rng.random_range(0.0..canvas.x.max(1.0));
            }
            if flake.pos.x > canvas.x + WRAP_MARGIN {
                flake.pos.x = -WRAP_MARGIN;
            } else if flake.pos.x < -WRAP_MARGIN {
                flake.pos.x = canvas.x + WRAP_MARGIN;
            }
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn set_zone(&mut self, zone: u32) {
        self.zone = zone;
    }

    pub fn set_snow_intensity(&mut self, intensity: f32) {
        self.snow_intensity = intensity.clamp(0.0, 5.0);
    }

    pub fn set_darkness(&mut self, darkness: f32) {
        self.darkness = darkness.clamp(0.0, 1.0);
    }

    pub fn set_visibility(&mut self, visibility: f32) {
        self.visibility = visibility.clamp(0.0, 1.0);
    }

    /// Undo event atmospherics (snowstorm, blackout)
    pub fn reset_atmosphere(&mut self) {
        self.snow_intensity = 1.0;
        self.darkness = 0.0;
        self.visibility = 1.0;
    }

    /// Drop a fifth of the flakes, keeping a floor
    pub fn optimize_for_performance(&mut self) {
        if self.snowflakes.len() > MIN_FLAKES {
            let keep = (self.snowflakes.len() * 4 / 5).max(MIN_FLAKES);
            self.snowflakes.truncate(keep);
            log::info!("Background snowfall reduced to {} flakes", keep);
        }
    }

    /// Night sky from zone 2 on
    pub fn is_night(&self) -> bool {
        self.zone > 1
    }
}

fn create_snowflakes<R: Rng>(canvas: Vec2, rng: &mut R) -> Vec<Snowflake> {
    let width = canvas.x.max(1.0);
    let height = canvas.y.max(1.0);
    LAYERS
        .iter()
        .flat_map(|&(count, size, speed, opacity)| (0..count).map(move |_| (size, speed, opacity)))
        .map(|(size, speed, opacity)| Snowflake {
            pos: Vec2::new(rng.random_range(0.0..width), rng.random_range(0.0..height)),
            size: size + rng.random::<f32>(),
            speed: speed + rng.random_range(-0.25..0.25),
            opacity: opacity + rng.random_range(-0.1..0.1),
            wind: rng.random_range(-0.15..0.15),
            angle: rng.random_range(0.0..std::f32::consts::TAU),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_MS;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn background() -> (Background, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(11);
        (Background::new(Vec2::new(480.0, 800.0), 1, &mut rng), rng)
    }

    #[test]
    fn test_snowflakes_stay_near_canvas() {
        let (mut bg, mut rng) = background();
        assert_eq!(bg.snowflakes.len(), 130);
        for _ in 0..1000 {
            bg.update(FRAME_MS, &mut rng);
        }
        for flake in &bg.snowflakes {
            assert!(flake.pos.y >= -WRAP_MARGIN && flake.pos.y <= 800.0 + WRAP_MARGIN);
            assert!(flake.pos.x >= -WRAP_MARGIN && flake.pos.x <= 480.0 + WRAP_MARGIN);
        }
        assert!(bg.offset >= 0.0 && bg.offset < 800.0);
    }

    #[test]
    fn test_reset_atmosphere() {
        let (mut bg, _) = background();
        bg.set_snow_intensity(2.0);
        bg.set_darkness(0.6);
        bg.set_visibility(0.4);
        bg.reset_atmosphere();
        assert_eq!(bg.snow_intensity, 1.0);
        assert_eq!(bg.darkness, 0.0);
        assert_eq!(bg.visibility, 1.0);
    }

    #[test]
    fn test_optimize_keeps_floor() {
        let (mut bg, _) = background();
        for _ in 0..10 {
            bg.optimize_for_performance();
        }
        assert_eq!(bg.snowflakes.len(), MIN_FLAKES);
    }
}
