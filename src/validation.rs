//! Structural integrity checks.
//!
//! Checks formation structure, the infrastructure pool, and generated
//! sessions before (and between) workflow stages. Detects:
//! - Duplicate IDs
//! - Sections without groups
//! - Groups or rooms with non-positive capacity
//! - Malformed or overlapping group roster ranges
//! - Sessions targeting sections/groups missing from the formation
//!
//! Every check collects all issues rather than stopping at the first.

use std::collections::HashSet;

use crate::error::WorkflowError;
use crate::models::{
    FormationOffer, GeneratedSession, Group, Infrastructure, Section, TargetKind, TargetRef,
};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A section has no groups.
    EmptySection,
    /// A formation has no sections.
    NoSections,
    /// A group or room holds zero or fewer people.
    NonPositiveCapacity,
    /// A group's first roster number exceeds its last.
    InvalidRange,
    /// Two groups of one section cover intersecting roster numbers.
    OverlappingRange,
    /// A session targets a section or group that does not exist.
    DanglingReference,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Joins error messages into one line.
pub fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validates a formation's section/group structure.
///
/// Checks:
/// 1. At least one section
/// 2. No duplicate section or group IDs (across the formation)
/// 3. Every section has at least one group
/// 4. Every group has capacity > 0
/// 5. Every group range has `first_number <= last_number`
/// 6. No two groups of a section have overlapping ranges
pub fn validate_formation(formation: &FormationOffer) -> ValidationResult {
    let mut errors = Vec::new();

    if formation.sections.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoSections,
            format!("Formation '{}' has no sections", formation.id),
        ));
    }

    let mut ids = HashSet::new();
    for section in &formation.sections {
        if !ids.insert(section.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate section ID: {}", section.id),
            ));
        }
        for group in &section.groups {
            if !ids.insert(group.id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("Duplicate group ID: {}", group.id),
                ));
            }
        }
        errors.extend(section_errors(section));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a single section: non-empty, positive capacities, disjoint ranges.
pub fn validate_section(section: &Section) -> ValidationResult {
    let errors = section_errors(section);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn section_errors(section: &Section) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if section.groups.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptySection,
            format!("Section '{}' has no groups", section.id),
        ));
    }

    for group in &section.groups {
        errors.extend(group_errors(group));
    }

    for (i, a) in section.groups.iter().enumerate() {
        for b in &section.groups[i + 1..] {
            if a.first_number <= a.last_number
                && b.first_number <= b.last_number
                && a.range_overlaps(b)
            {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OverlappingRange,
                    format!(
                        "Groups '{}' [{}-{}] and '{}' [{}-{}] overlap in section '{}'",
                        a.id,
                        a.first_number,
                        a.last_number,
                        b.id,
                        b.first_number,
                        b.last_number,
                        section.id
                    ),
                ));
            }
        }
    }

    errors
}

fn group_errors(group: &Group) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if group.capacity <= 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NonPositiveCapacity,
            format!("Group '{}' has capacity {}", group.id, group.capacity),
        ));
    }
    if group.first_number > group.last_number {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidRange,
            format!(
                "Group '{}' range starts at {} after it ends at {}",
                group.id, group.first_number, group.last_number
            ),
        ));
    }
    errors
}

/// Validates the infrastructure list: unique IDs and positive capacities.
pub fn validate_infrastructures(infrastructures: &[Infrastructure]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for infra in infrastructures {
        if !ids.insert(infra.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate infrastructure ID: {}", infra.id),
            ));
        }
        if infra.capacity <= 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveCapacity,
                format!("Infrastructure '{}' has capacity {}", infra.id, infra.capacity),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates generated sessions against the formation.
///
/// Checks:
/// 1. No duplicate session IDs
/// 2. Every target reference resolves to a section or group of its kind
pub fn validate_sessions(
    formation: &FormationOffer,
    sessions: &[GeneratedSession],
) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for session in sessions {
        if !ids.insert(session.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate session ID: {}", session.id),
            ));
        }
        if resolve_target(formation, &session.target).is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::DanglingReference,
                format!(
                    "Session '{}' references unknown {} '{}'",
                    session.id,
                    match session.target.kind {
                        TargetKind::Section => "section",
                        TargetKind::Group => "group",
                    },
                    session.target.id
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// A resolved session target.
#[derive(Debug, Clone, Copy)]
pub enum ResolvedTarget<'a> {
    /// A whole section.
    Section(&'a Section),
    /// A group and its owning section.
    Group(&'a Section, &'a Group),
}

impl ResolvedTarget<'_> {
    /// Number of students attending.
    pub fn size(&self) -> i32 {
        match self {
            Self::Section(section) => section.roster_size(),
            Self::Group(_, group) => group.capacity,
        }
    }

    /// Owning section.
    pub fn section(&self) -> &Section {
        match self {
            Self::Section(section) | Self::Group(section, _) => section,
        }
    }
}

/// Resolves a target reference against the formation.
pub fn resolve_target<'a>(
    formation: &'a FormationOffer,
    target: &TargetRef,
) -> Option<ResolvedTarget<'a>> {
    match target.kind {
        TargetKind::Section => formation.section(&target.id).map(ResolvedTarget::Section),
        TargetKind::Group => formation
            .group(&target.id)
            .map(|(section, group)| ResolvedTarget::Group(section, group)),
    }
}

/// Resolves a session's target, reporting a missing one as [`WorkflowError::DanglingReference`].
pub fn resolve_session<'a>(
    formation: &'a FormationOffer,
    session: &GeneratedSession,
) -> Result<ResolvedTarget<'a>, WorkflowError> {
    resolve_target(formation, &session.target)
        .ok_or_else(|| WorkflowError::dangling(&session.id, &session.target.id))
}
