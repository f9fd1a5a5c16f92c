//! Player settings and preferences
//!
//! Kept separate from the balance table in [`crate::config`]: these are
//! choices the player makes from the menu.

use serde::{Deserialize, Serialize};

/// Sleigh skins offered on the start screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SleighVariant {
    #[default]
    Classic,
    Red,
    Green,
}

impl SleighVariant {
    pub const ALL: [SleighVariant; 3] = [SleighVariant::Classic, SleighVariant::Red, SleighVariant::Green];

    pub fn as_str(&self) -> &'static str {
        match self {
            SleighVariant::Classic => "sleigh",
            SleighVariant::Red => "sleighRed",
            SleighVariant::Green => "sleighGreen",
        }
    }

    /// Parse a variant name; unknown names fall back to the classic sleigh
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "red" | "sleighred" => SleighVariant::Red,
            "green" | "sleighgreen" => SleighVariant::Green,
            _ => SleighVariant::Classic,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Snowballs destroy bonus pickups too
    pub friendly_fire: bool,
    /// Sleigh skin
    pub sleigh: SleighVariant,
    /// Forward feedback cues to the vibration sink
    pub haptics: bool,
    /// Switch to low-performance mode when the frame rate drops
    pub auto_low_performance: bool,
    /// Show FPS counter
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            friendly_fire: true,
            sleigh: SleighVariant::Classic,
            haptics: true,
            auto_low_performance: true,
            show_fps: false,
        }
    }
}

impl Settings {
    pub fn with_sleigh(sleigh: SleighVariant) -> Self {
        Self {
            sleigh,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_from_str() {
        assert_eq!(SleighVariant::from_str("Red"), SleighVariant::Red);
        assert_eq!(SleighVariant::from_str("sleighGreen"), SleighVariant::Green);
        assert_eq!(SleighVariant::from_str("rocket"), SleighVariant::Classic);
    }

    #[test]
    fn test_defaults_enable_friendly_fire() {
        let settings = Settings::default();
        assert!(settings.friendly_fire);
        assert!(settings.haptics);
    }
}
