//! Recoverable error types
//!
//! Nothing in the simulation is fatal: these are returned to the caller,
//! logged, and the previous state is kept.

use thiserror::Error;

/// Failures when loading or validating a [`crate::GameConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("level thresholds must not be empty")]
    NoLevelThresholds,
    #[error("level thresholds must be sorted by level (level {level} after {previous})")]
    UnsortedThresholds { previous: u32, level: u32 },
    #[error("spawn interval band invalid (min {min:.0} ms, max {max:.0} ms)")]
    SpawnBand { min: f32, max: f32 },
    #[error("wave size band invalid (min {min} > max {max})")]
    WaveBand { min: u32, max: u32 },
    #[error("spawn chances add up to {total}, more than 100")]
    ChanceOverflow { total: u32 },
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: f32 },
}

/// Failures when switching the active section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SectionError {
    #[error("no such section: zone {0}")]
    UnknownSection(u32),
    #[error("section registry is empty")]
    EmptyRegistry,
}
