//! Error taxonomy for the timetable workflow.
//!
//! Every error is local and recoverable: the failing operation leaves the
//! workflow state exactly as it was. Scheduling conflicts are not errors;
//! they are reported as [`Conflict`](crate::models::Conflict) records.

use thiserror::Error;

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Errors returned by workflow operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// A formation edit, the room catalog or the session set is malformed.
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    /// No infrastructure is selected.
    #[error("No infrastructure selected")]
    EmptySelection,

    /// A swap request named the same session twice or an unknown session.
    #[error("Invalid swap target: {0}")]
    InvalidSwapTarget(String),

    /// A reservation commit was requested with no generated sessions.
    #[error("Nothing to reserve: no generated sessions")]
    NothingToReserve,

    /// A stage that works on sessions was run before generation.
    #[error("No generated sessions")]
    NoSessions,

    /// A session targets a section or group missing from the active formation.
    #[error("Session '{session_id}' references unknown target '{target_id}'")]
    DanglingReference {
        session_id: String,
        target_id: String,
    },

    /// The formation catalog has no entry with this id.
    #[error("Unknown formation: {0}")]
    UnknownFormation(String),

    /// The infrastructure catalog has no entry with this id.
    #[error("Unknown infrastructure: {0}")]
    UnknownInfrastructure(String),

    /// No generated session has this id.
    #[error("Unknown session: {0}")]
    UnknownSession(String),

    /// No open conflict has this id.
    #[error("Unknown conflict: {0}")]
    UnknownConflict(String),

    /// A reservation commit is still running.
    #[error("Reservation commit in progress")]
    CommitInProgress,

    /// No optimization proposal is pending.
    #[error("No optimization proposal to apply")]
    NoProposal,

    /// Engine settings are unusable.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl WorkflowError {
    pub(crate) fn dangling(session_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self::DanglingReference {
            session_id: session_id.into(),
            target_id: target_id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            WorkflowError::EmptySelection.to_string(),
            "No infrastructure selected"
        );
        assert_eq!(
            WorkflowError::dangling("SES-0001", "F1-S1-G9").to_string(),
            "Session 'SES-0001' references unknown target 'F1-S1-G9'"
        );
        assert_eq!(
            WorkflowError::InvalidStructure("empty section".into()).to_string(),
            "Invalid structure: empty section"
        );
    }
}
