//! Workflow stages and their completion predicates.
//!
//! | Stage | Leave when |
//! |-------|------------|
//! | FormationSelection | a formation with ≥1 section, each with ≥1 group, is selected |
//! | InfrastructureSelection | ≥1 infrastructure is selected |
//! | Generation | ≥1 session exists |
//! | Validation | every session is validated |
//! | Optimization | always (optional stage) |
//! | Reservation | never (terminal) |
//!
//! Predicates are pure functions of a [`WorkflowState`]; they never
//! mutate it.

use serde::{Deserialize, Serialize};

use super::state::WorkflowState;
use crate::review::all_validated;

/// The six ordered workflow stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    FormationSelection,
    InfrastructureSelection,
    Generation,
    Validation,
    Optimization,
    Reservation,
}

impl Stage {
    /// All stages in workflow order.
    pub const ALL: [Stage; 6] = [
        Stage::FormationSelection,
        Stage::InfrastructureSelection,
        Stage::Generation,
        Stage::Validation,
        Stage::Optimization,
        Stage::Reservation,
    ];

    /// Zero-based position in the workflow.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The following stage, if any.
    pub fn next(&self) -> Option<Stage> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// The preceding stage, if any.
    pub fn previous(&self) -> Option<Stage> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }

    /// Whether this is the last stage.
    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }

    /// Whether `state` satisfies this stage's completion predicate.
    pub fn is_complete(&self, state: &WorkflowState) -> bool {
        match self {
            Self::FormationSelection => formation_selected(state),
            Self::InfrastructureSelection => infrastructure_selected(state),
            Self::Generation => sessions_generated(state),
            Self::Validation => sessions_validated(state),
            Self::Optimization => true,
            Self::Reservation => false,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::FormationSelection => "formation selection",
            Self::InfrastructureSelection => "infrastructure selection",
            Self::Generation => "generation",
            Self::Validation => "validation",
            Self::Optimization => "optimization",
            Self::Reservation => "reservation",
        };
        f.write_str(label)
    }
}

/// A complete formation is selected.
pub fn formation_selected(state: &WorkflowState) -> bool {
    state.formation.as_ref().is_some_and(|f| f.is_complete())
}

/// At least one room is selected.
pub fn infrastructure_selected(state: &WorkflowState) -> bool {
    state.pool.selected_count() > 0
}

/// At least one session exists.
pub fn sessions_generated(state: &WorkflowState) -> bool {
    !state.sessions.is_empty()
}

/// Sessions exist and every one is validated.
pub fn sessions_validated(state: &WorkflowState) -> bool {
    all_validated(&state.sessions)
}
