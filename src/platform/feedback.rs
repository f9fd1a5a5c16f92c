//! Haptic feedback cues
//!
//! The simulation emits discrete cues; a host sink may turn them into device
//! vibration. Without a sink the cues are dropped.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Discrete feedback events emitted by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackCue {
    /// Sleigh lost a life
    Damage,
    LifeGained,
    LevelUp,
    /// Level advanced on distance alone
    LevelUpByDistance,
    BossSpawned,
    BossHit,
    /// Victory
    BossDefeated,
    ObstacleDestroyed,
    FireMultiplier,
    SpeedMultiplier,
    FireToggled { firing: bool },
}

impl FeedbackCue {
    /// Vibration pattern in milliseconds (on, off, on, ...)
    pub fn pattern(&self) -> &'static [u32] {
        match self {
            FeedbackCue::Damage => &[200, 100, 200],
            FeedbackCue::LifeGained => &[100, 50, 100],
            FeedbackCue::LevelUp => &[150, 50, 150, 50, 200],
            FeedbackCue::LevelUpByDistance => &[100, 100, 100, 100, 300],
            FeedbackCue::BossSpawned => &[300, 100, 300, 100, 500],
            FeedbackCue::BossHit => &[50],
            FeedbackCue::BossDefeated => &[200, 100, 200, 100, 200, 100, 400],
            FeedbackCue::ObstacleDestroyed => &[30],
            FeedbackCue::FireMultiplier => &[50, 50, 50],
            FeedbackCue::SpeedMultiplier => &[100, 50, 100],
            FeedbackCue::FireToggled { firing: true } => &[100, 50, 100],
            FeedbackCue::FireToggled { firing: false } => &[50],
        }
    }
}

/// Receiver for feedback cues
pub trait FeedbackSink {
    fn emit(&mut self, cue: FeedbackCue);
}

/// Default sink: drops every cue
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFeedback;

impl FeedbackSink for NoFeedback {
    fn emit(&mut self, _cue: FeedbackCue) {}
}

/// Sink that keeps every cue, for tests and headless runs
#[derive(Debug, Default, Clone)]
pub struct RecordingFeedback {
    pub cues: Vec<FeedbackCue>,
}

impl RecordingFeedback {
    pub fn count(&self, cue: FeedbackCue) -> usize {
        self.cues.iter().filter(|c| **c == cue).count()
    }
}

impl FeedbackSink for RecordingFeedback {
    fn emit(&mut self, cue: FeedbackCue) {
        self.cues.push(cue);
    }
}

/// Shared sinks let the host keep a handle while the game owns the other
impl<S: FeedbackSink> FeedbackSink for Rc<RefCell<S>> {
    fn emit(&mut self, cue: FeedbackCue) {
        self.borrow_mut().emit(cue);
    }
}
