//! Zone → section registry

use std::collections::BTreeMap;

use serde::Serialize;

use super::{CitySection, ForestSection, Section, SectionHost};
use crate::error::SectionError;
use crate::sim::background::Theme;
use crate::sim::state::GameState;

pub type SectionFactory = fn() -> Box<dyn Section>;

fn forest() -> Box<dyn Section> {
    Box::new(ForestSection)
}

fn city() -> Box<dyn Section> {
    Box::new(CitySection)
}

/// Registry row for menus and debugging
#[derive(Debug, Clone, Serialize)]
pub struct SectionInfo {
    pub id: u32,
    pub name: &'static str,
    pub theme: Theme,
    pub difficulty: f32,
    pub description: &'static str,
}

/// Where the run stands across sections
#[derive(Debug, Clone, Serialize)]
pub struct SectionProgress {
    pub section_id: u32,
    pub section_name: &'static str,
    pub stage_name: Option<&'static str>,
    /// Percent of the current stage's distance, 0..=100
    pub distance_progress: u32,
    /// Percent of the current stage's score, 0..=100
    pub score_progress: u32,
    pub sections_completed: u32,
    pub total_sections: u32,
    pub percent_complete: f32,
}

/// Owns the current section and the factories for every zone
pub struct SectionManager {
    registry: BTreeMap<u32, SectionFactory>,
    current_id: u32,
    current: Box<dyn Section>,
}

impl std::fmt::Debug for SectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionManager")
            .field("zones", &self.registry.keys().collect::<Vec<_>>())
            .field("current_id", &self.current_id)
            .field("current", &self.current.name())
            .finish()
    }
}

impl Default for SectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionManager {
    /// Forest (zone 1) and City (zone 2), Forest current
    pub fn new() -> Self {
        let mut registry: BTreeMap<u32, SectionFactory> = BTreeMap::new();
        registry.insert(1, forest);
        registry.insert(2, city);
        Self {
            registry,
            current_id: 1,
            current: forest(),
        }
    }

    /// Add or replace the factory for `zone`
    pub fn register(&mut self, zone: u32, factory: SectionFactory) {
        self.registry.insert(zone, factory);
    }

    pub fn current(&self) -> &dyn Section {
        self.current.as_ref()
    }

    pub fn current_id(&self) -> u32 {
        self.current_id
    }

    pub fn has_section(&self, zone: u32) -> bool {
        self.registry.contains_key(&zone)
    }

    /// Run the current section's initialize hook again
    pub fn initialize_current(&self, host: &mut SectionHost<'_>) {
        self.current.initialize(host);
    }

    /// Swap in the section for `zone`
    ///
    /// An unknown zone is logged and leaves the current section in place.
    pub fn load_section(&mut self, zone: u32, host: &mut SectionHost<'_>) -> Result<(), SectionError> {
        let Some(factory) = self.registry.get(&zone) else {
            log::error!(
                "No section registered for zone {}, keeping {}",
                zone,
                self.current.name()
            );
            return Err(SectionError::UnknownSection(zone));
        };
        let section = factory();
        section.initialize(host);
        self.current = section;
        self.current_id = zone;
        Ok(())
    }

    pub fn advance_to_next_section(&mut self, host: &mut SectionHost<'_>) -> Result<(), SectionError> {
        let next = self.current_id + 1;
        if !self.has_section(next) {
            log::info!("All {} sections completed", self.registry.len());
        }
        self.load_section(next, host)
    }

    pub fn is_current_section_completed(&self, state: &GameState) -> bool {
        self.current.is_completed(state)
    }

    /// Back to the first registered section
    pub fn reset(&mut self, host: &mut SectionHost<'_>) -> Result<(), SectionError> {
        let first = *self.registry.keys().next().ok_or(SectionError::EmptyRegistry)?;
        self.load_section(first, host)
    }

    pub fn sections_info(&self) -> Vec<SectionInfo> {
        self.registry
            .iter()
            .map(|(&id, factory)| {
                let section = factory();
                SectionInfo {
                    id,
                    name: section.name(),
                    theme: section.theme(),
                    difficulty: section.difficulty_multiplier(),
                    description: section.description(),
                }
            })
            .collect()
    }

    pub fn progression(&self, state: &GameState) -> SectionProgress {
        let stage = self.current.level_info(state.level);
        let percent = |value: f64, of: f64| -> u32 {
            if of <= 0.0 { 100 } else { (value / of * 100.0).clamp(0.0, 100.0) as u32 }
        };
        let total = self.registry.len() as u32;
        let completed = self.registry.keys().filter(|&&id| id < self.current_id).count() as u32;

        SectionProgress {
            section_id: self.current_id,
            section_name: self.current.name(),
            stage_name: stage.map(|s| s.name),
            distance_progress: stage.map_or(0, |s| {
                percent(f64::from(state.distance_traveled), f64::from(s.max_distance))
            }),
            score_progress: stage.map_or(0, |s| percent(state.score as f64, s.score_required as f64)),
            sections_completed: completed,
            total_sections: total,
            percent_complete: if total == 0 {
                0.0
            } else {
                completed as f32 / total as f32 * 100.0
            },
        }
    }
}
