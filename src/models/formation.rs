//! Formation structure model.
//!
//! A formation offer (degree track) is split into sections, the cohorts
//! that attend lectures together, and each section into groups, the
//! smaller units that attend seminars and practicals.
//!
//! Each group covers an inclusive range of roster numbers
//! `[first_number, last_number]`. Ranges of groups in the same section
//! never overlap.

use serde::{Deserialize, Serialize};

/// A seminar/practical group within a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Unique group identifier.
    pub id: String,
    /// Position within the section (1-based).
    pub sequence: u32,
    /// Number of students the group holds.
    pub capacity: i32,
    /// First roster number covered (inclusive).
    pub first_number: u32,
    /// Last roster number covered (inclusive).
    pub last_number: u32,
}

/// A lecture cohort within a formation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Unique section identifier.
    pub id: String,
    /// Position within the formation (1-based).
    pub sequence: u32,
    /// Display name (e.g., "Section A").
    pub name: String,
    /// Groups in sequence order.
    pub groups: Vec<Group>,
}

/// An academic program offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormationOffer {
    /// Unique formation identifier.
    pub id: String,
    /// Display name (e.g., "Computer Science").
    pub name: String,
    /// Study level (e.g., "L2", "M1").
    pub level: String,
    /// Academic domain.
    pub domain: String,
    /// Expected enrolment.
    pub expected_students: u32,
    /// Sections in sequence order.
    pub sections: Vec<Section>,
    /// Teaching staff labels, assigned to sessions in rotation.
    pub instructors: Vec<String>,
}

impl Group {
    /// Creates a group covering `[first_number, last_number]`.
    pub fn new(
        id: impl Into<String>,
        sequence: u32,
        capacity: i32,
        first_number: u32,
        last_number: u32,
    ) -> Self {
        Self {
            id: id.into(),
            sequence,
            capacity,
            first_number,
            last_number,
        }
    }

    /// Whether the roster ranges of two groups intersect.
    pub fn range_overlaps(&self, other: &Self) -> bool {
        self.first_number <= other.last_number && other.first_number <= self.last_number
    }

    /// Display label (e.g., "G2").
    pub fn label(&self) -> String {
        format!("G{}", self.sequence)
    }
}

impl Section {
    /// Creates an empty section.
    pub fn new(id: impl Into<String>, sequence: u32, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sequence,
            name: name.into(),
            groups: Vec::new(),
        }
    }

    /// Adds a group.
    pub fn with_group(mut self, group: Group) -> Self {
        self.groups.push(group);
        self
    }

    /// Full cohort size: the sum of group capacities, saturating at `i32::MAX`.
    pub fn roster_size(&self) -> i32 {
        self.groups
            .iter()
            .fold(0i32, |total, g| total.saturating_add(g.capacity.max(0)))
    }

    /// Finds a group by id.
    pub fn group(&self, group_id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    /// Highest roster number already covered by a group (0 if none).
    pub fn last_roster_number(&self) -> u32 {
        self.groups.iter().map(|g| g.last_number).max().unwrap_or(0)
    }

    /// Next free group sequence number.
    pub fn next_group_sequence(&self) -> u32 {
        self.groups
            .iter()
            .map(|g| g.sequence)
            .max()
            .unwrap_or(0)
            .saturating_add(1)
    }
}

impl FormationOffer {
    /// Creates a formation skeleton with no sections.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level: String::new(),
            domain: String::new(),
            expected_students: 0,
            sections: Vec::new(),
            instructors: Vec::new(),
        }
    }

    /// Sets the study level.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Sets the academic domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Sets the expected enrolment.
    pub fn with_expected_students(mut self, count: u32) -> Self {
        self.expected_students = count;
        self
    }

    /// Adds a section.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Adds an instructor label.
    pub fn with_instructor(mut self, instructor: impl Into<String>) -> Self {
        self.instructors.push(instructor.into());
        self
    }

    /// Finds a section by id.
    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == section_id)
    }

    /// Finds a group and its owning section by group id.
    pub fn group(&self, group_id: &str) -> Option<(&Section, &Group)> {
        self.sections
            .iter()
            .find_map(|s| s.group(group_id).map(|g| (s, g)))
    }

    /// Next free section sequence number.
    pub fn next_section_sequence(&self) -> u32 {
        self.sections
            .iter()
            .map(|s| s.sequence)
            .max()
            .unwrap_or(0)
            .saturating_add(1)
    }

    /// Total number of groups across all sections.
    pub fn group_count(&self) -> usize {
        self.sections.iter().map(|s| s.groups.len()).sum()
    }

    /// Whether the structure is ready for generation:
    /// at least one section, and every section has at least one group.
    pub fn is_complete(&self) -> bool {
        !self.sections.is_empty() && self.sections.iter().all(|s| !s.groups.is_empty())
    }
}
