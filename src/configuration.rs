//! Formation configuration editing.
//!
//! Builds a formation's sections and groups incrementally. Sequence
//! numbers and ids are assigned automatically:
//!
//! | Entity | Id | Sequence |
//! |--------|----|----------|
//! | Section | `{formation}-S{n}` | highest existing + 1 |
//! | Group | `{section}-G{n}` | highest existing in the section + 1 |
//!
//! Every edit is applied to a copy and validated before it replaces the
//! current structure, so a rejected edit leaves the configuration
//! untouched. A section is created together with its first group and its
//! last group cannot be removed; sections are therefore never empty.
//!
//! # Example
//!
//! ```
//! use u_timetable::configuration::FormationConfiguration;
//! use u_timetable::models::FormationOffer;
//!
//! let mut config = FormationConfiguration::new(FormationOffer::new("F1", "Physics"));
//! let section = config.add_section("Section A", 30).unwrap();
//! config.add_group(&section, 28).unwrap();
//! assert_eq!(config.formation().group_count(), 2);
//! ```

use log::debug;

use crate::catalog::FormationCatalog;
use crate::error::{Result, WorkflowError};
use crate::models::{FormationOffer, Group, Section};
use crate::validation::{summarize, validate_formation, validate_section};

/// Editable formation structure.
#[derive(Debug, Clone)]
pub struct FormationConfiguration {
    formation: FormationOffer,
}

impl FormationConfiguration {
    /// Wraps a formation for editing.
    pub fn new(formation: FormationOffer) -> Self {
        Self { formation }
    }

    /// Loads a formation from the catalog.
    pub fn from_catalog<C: FormationCatalog + ?Sized>(
        catalog: &C,
        formation_id: &str,
    ) -> Result<Self> {
        catalog
            .formation(formation_id)
            .map(Self::new)
            .ok_or_else(|| WorkflowError::UnknownFormation(formation_id.to_string()))
    }

    /// Current structure.
    pub fn formation(&self) -> &FormationOffer {
        &self.formation
    }

    /// Consumes the configuration, returning the structure.
    pub fn into_formation(self) -> FormationOffer {
        self.formation
    }

    /// Whether the structure has at least one section, each with a group.
    pub fn is_complete(&self) -> bool {
        self.formation.is_complete()
    }

    /// Checks the whole structure, folding all issues into one error.
    pub fn validate(&self) -> Result<()> {
        validate_formation(&self.formation)
            .map_err(|errors| WorkflowError::InvalidStructure(summarize(&errors)))
    }

    /// Adds a section holding one group of `group_capacity` students.
    ///
    /// Returns the new section id.
    pub fn add_section(&mut self, name: impl Into<String>, group_capacity: i32) -> Result<String> {
        let sequence = self.formation.next_section_sequence();
        let id = format!("{}-S{}", self.formation.id, sequence);
        let mut section = Section::new(id.clone(), sequence, name);
        section.groups.push(next_group(&section, group_capacity, None)?);

        check_section(&section)?;
        if self.formation.section(&id).is_some() {
            return Err(WorkflowError::InvalidStructure(format!(
                "Section '{}' already exists",
                id
            )));
        }

        debug!("Added section {} to formation {}", id, self.formation.id);
        self.formation.sections.push(section);
        Ok(id)
    }

    /// Removes a section and its groups.
    pub fn remove_section(&mut self, section_id: &str) -> Result<Section> {
        let index = self.section_index(section_id)?;
        debug!("Removed section {} from formation {}", section_id, self.formation.id);
        Ok(self.formation.sections.remove(index))
    }

    /// Adds a group covering the next `capacity` roster numbers.
    ///
    /// Returns the new group id.
    pub fn add_group(&mut self, section_id: &str, capacity: i32) -> Result<String> {
        self.push_group(section_id, capacity, None)
    }

    /// Adds a group covering the roster range `[first_number, last_number]`.
    ///
    /// Fails if the range is inverted or intersects another group of the section.
    pub fn add_group_with_range(
        &mut self,
        section_id: &str,
        capacity: i32,
        first_number: u32,
        last_number: u32,
    ) -> Result<String> {
        self.push_group(section_id, capacity, Some((first_number, last_number)))
    }

    /// Removes a group. Fails if it is the last group of its section.
    pub fn remove_group(&mut self, section_id: &str, group_id: &str) -> Result<Group> {
        let index = self.section_index(section_id)?;
        let section = &mut self.formation.sections[index];
        let position = section
            .groups
            .iter()
            .position(|g| g.id == group_id)
            .ok_or_else(|| {
                WorkflowError::InvalidStructure(format!(
                    "Group '{}' not found in section '{}'",
                    group_id, section_id
                ))
            })?;

        if section.groups.len() == 1 {
            return Err(WorkflowError::InvalidStructure(format!(
                "Section '{}' must keep at least one group",
                section_id
            )));
        }

        debug!("Removed group {} from section {}", group_id, section_id);
        Ok(section.groups.remove(position))
    }

    fn push_group(
        &mut self,
        section_id: &str,
        capacity: i32,
        range: Option<(u32, u32)>,
    ) -> Result<String> {
        let index = self.section_index(section_id)?;
        let mut candidate = self.formation.sections[index].clone();
        let group = next_group(&candidate, capacity, range)?;
        let id = group.id.clone();

        if self.formation.group(&id).is_some() {
            return Err(WorkflowError::InvalidStructure(format!(
                "Group '{}' already exists",
                id
            )));
        }
        candidate.groups.push(group);
        check_section(&candidate)?;

        debug!("Added group {} to section {}", id, section_id);
        self.formation.sections[index] = candidate;
        Ok(id)
    }

    fn section_index(&self, section_id: &str) -> Result<usize> {
        self.formation
            .sections
            .iter()
            .position(|s| s.id == section_id)
            .ok_or_else(|| {
                WorkflowError::InvalidStructure(format!("Section '{}' not found", section_id))
            })
    }
}

/// Builds the next group of a section. Without an explicit range the
/// group covers the `capacity` roster numbers after the section's last.
fn next_group(section: &Section, capacity: i32, range: Option<(u32, u32)>) -> Result<Group> {
    let sequence = section.next_group_sequence();
    let (first, last) = match range {
        Some(range) => range,
        None => {
            let span = capacity.max(1).unsigned_abs();
            section
                .last_roster_number()
                .checked_add(1)
                .and_then(|first| first.checked_add(span - 1).map(|last| (first, last)))
                .ok_or_else(|| {
                    WorkflowError::InvalidStructure(format!(
                        "Roster numbers of section '{}' exhausted",
                        section.id
                    ))
                })?
        }
    };
    Ok(Group::new(
        format!("{}-G{}", section.id, sequence),
        sequence,
        capacity,
        first,
        last,
    ))
}

fn check_section(section: &Section) -> Result<()> {
    validate_section(section).map_err(|errors| WorkflowError::InvalidStructure(summarize(&errors)))
}
