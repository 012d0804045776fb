//! Engine settings.
//!
//! Settings can be built in code or loaded from TOML:
//!
//! ```toml
//! large_room_categories = ["amphitheater", "classroom"]
//! practical_equipment = ["workstations"]
//! default_instructor = "TBA"
//!
//! [grid]
//! days = ["Mon", "Tue", "Wed"]
//! bands = [
//!     { start = "08:00:00", end = "09:30:00" },
//!     { start = "09:45:00", end = "11:15:00" },
//! ]
//!
//! [optimizer]
//! iterations = 2000
//! seed = 42
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Result, WorkflowError};
use crate::models::{InfrastructureCategory, WeeklyGrid};

/// Slots one section needs: a lecture, a seminar and a practical band.
pub const MIN_GRID_SLOTS: usize = 3;

/// Workflow engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowSettings {
    /// Weekly teaching grid.
    pub grid: WeeklyGrid,
    /// Room categories eligible to host lectures.
    pub large_room_categories: Vec<InfrastructureCategory>,
    /// Equipment tags every practical session requires.
    pub practical_equipment: Vec<String>,
    /// Instructor label used when a formation has no staff list.
    pub default_instructor: String,
    /// Local-search optimizer settings.
    pub optimizer: OptimizerSettings,
}

/// Optimizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerSettings {
    /// Number of candidate moves to evaluate.
    pub iterations: usize,
    /// RNG seed; equal seeds give equal proposals.
    pub seed: u64,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            grid: WeeklyGrid::default(),
            large_room_categories: vec![
                InfrastructureCategory::Amphitheater,
                InfrastructureCategory::Classroom,
            ],
            practical_equipment: Vec::new(),
            default_instructor: "TBA".to_string(),
            optimizer: OptimizerSettings::default(),
        }
    }
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            iterations: 2000,
            seed: 42,
        }
    }
}

impl WorkflowSettings {
    /// Parses settings from a TOML document. Missing keys take defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: WorkflowSettings = toml::from_str(content).map_err(|e| {
            WorkflowError::InvalidSettings(format!("Failed to parse settings: {}", e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads and validates settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            WorkflowError::InvalidSettings(format!(
                "Failed to read settings file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Sets the weekly grid.
    pub fn with_grid(mut self, grid: WeeklyGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Sets the equipment practical sessions require.
    pub fn with_practical_equipment(mut self, tags: Vec<String>) -> Self {
        self.practical_equipment = tags;
        self
    }

    /// Sets optimizer iterations and seed.
    pub fn with_optimizer(mut self, iterations: usize, seed: u64) -> Self {
        self.optimizer = OptimizerSettings { iterations, seed };
        self
    }

    /// Checks the grid and room categories are usable.
    ///
    /// Requires at least [`MIN_GRID_SLOTS`] slots, bands with `end > start`,
    /// bands in chronological order without overlap, no repeated day, and
    /// at least one lecture room category.
    pub fn validate(&self) -> Result<()> {
        let grid = &self.grid;
        if grid.len() < MIN_GRID_SLOTS {
            return Err(WorkflowError::InvalidSettings(format!(
                "grid has {} slots, at least {} required",
                grid.len(),
                MIN_GRID_SLOTS
            )));
        }
        for band in &grid.bands {
            if band.end <= band.start {
                return Err(WorkflowError::InvalidSettings(format!(
                    "band {}-{} ends before it starts",
                    band.start, band.end
                )));
            }
        }
        for pair in grid.bands.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(WorkflowError::InvalidSettings(format!(
                    "bands {}-{} and {}-{} overlap or are out of order",
                    pair[0].start, pair[0].end, pair[1].start, pair[1].end
                )));
            }
        }
        for (i, day) in grid.days.iter().enumerate() {
            if grid.days[..i].contains(day) {
                return Err(WorkflowError::InvalidSettings(format!(
                    "day {} listed twice",
                    day
                )));
            }
        }
        if self.large_room_categories.is_empty() {
            return Err(WorkflowError::InvalidSettings(
                "no room category can host lectures".to_string(),
            ));
        }
        Ok(())
    }
}
