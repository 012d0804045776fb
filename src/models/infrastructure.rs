//! Infrastructure (teaching space) model.
//!
//! Infrastructures are the rooms sessions are placed in: amphitheaters,
//! classrooms and laboratories. Each has a seating capacity and a set of
//! equipment tags. The `selected` flag marks membership in the pool a
//! workflow run may allocate from.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A physical teaching space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Infrastructure {
    /// Unique infrastructure identifier.
    pub id: String,
    /// Display name (e.g., "Amphi A").
    pub name: String,
    /// Room category.
    pub category: InfrastructureCategory,
    /// Seating capacity.
    pub capacity: i32,
    /// Equipment tags (e.g., "projector", "workstations").
    pub equipment: BTreeSet<String>,
    /// Whether the room is in the allocatable pool.
    pub selected: bool,
}

/// Room category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfrastructureCategory {
    /// Large tiered lecture hall.
    Amphitheater,
    /// Ordinary classroom.
    Classroom,
    /// Equipped laboratory.
    Laboratory,
}

impl Infrastructure {
    /// Creates an unselected infrastructure with capacity 0.
    pub fn new(id: impl Into<String>, category: InfrastructureCategory) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            category,
            capacity: 0,
            equipment: BTreeSet::new(),
            selected: false,
        }
    }

    /// Creates an amphitheater.
    pub fn amphitheater(id: impl Into<String>) -> Self {
        Self::new(id, InfrastructureCategory::Amphitheater)
    }

    /// Creates a classroom.
    pub fn classroom(id: impl Into<String>) -> Self {
        Self::new(id, InfrastructureCategory::Classroom)
    }

    /// Creates a laboratory.
    pub fn laboratory(id: impl Into<String>) -> Self {
        Self::new(id, InfrastructureCategory::Laboratory)
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the capacity.
    pub fn with_capacity(mut self, capacity: i32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Adds an equipment tag.
    pub fn with_equipment(mut self, tag: impl Into<String>) -> Self {
        self.equipment.insert(tag.into());
        self
    }

    /// Marks the infrastructure as selected.
    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Name if set, otherwise the id.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Whether the room seats at least `size` people.
    #[inline]
    pub fn fits(&self, size: i32) -> bool {
        self.capacity >= size
    }

    /// Whether the room carries every tag in `required`.
    pub fn has_equipment(&self, required: &BTreeSet<String>) -> bool {
        required.is_subset(&self.equipment)
    }

    /// Required tags the room lacks.
    pub fn missing_equipment<'a>(&'a self, required: &'a BTreeSet<String>) -> Vec<&'a str> {
        required
            .difference(&self.equipment)
            .map(String::as_str)
            .collect()
    }
}

impl std::fmt::Display for InfrastructureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Amphitheater => "amphitheater",
            Self::Classroom => "classroom",
            Self::Laboratory => "laboratory",
        };
        f.write_str(label)
    }
}
