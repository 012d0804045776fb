//! Workflow state.
//!
//! One [`WorkflowState`] holds everything a run has produced so far. It
//! is owned by a [`WorkflowEngine`](super::WorkflowEngine) and handed out
//! by reference for rendering; only the engine mutates it.

use serde::{Deserialize, Serialize};

use super::stage::Stage;
use crate::allocation::InfrastructurePool;
use crate::models::{
    Conflict, FormationOffer, GeneratedSession, Infrastructure, OptimizationMetrics, Reservation,
};
use crate::optimization::OptimizationProposal;
use crate::reservation::{CommitterState, ReservationCommitter};
use crate::review::all_validated;

/// Data produced by a workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Current stage.
    pub stage: Stage,
    /// Selected formation with its section/group structure.
    pub formation: Option<FormationOffer>,
    /// Catalog rooms with selection flags.
    pub pool: InfrastructurePool,
    /// Generated sessions.
    pub sessions: Vec<GeneratedSession>,
    /// Scores of the current sessions, as of the last optimization run or apply.
    pub metrics: Option<OptimizationMetrics>,
    /// Optimization result awaiting apply or discard.
    pub proposal: Option<OptimizationProposal>,
    /// Whether a proposal was applied to the current sessions.
    pub optimization_applied: bool,
    /// Reservations and conflicts.
    pub committer: ReservationCommitter,
}

impl WorkflowState {
    /// Creates a state at the first stage over a room pool.
    pub fn new(pool: InfrastructurePool) -> Self {
        Self {
            stage: Stage::FormationSelection,
            formation: None,
            pool,
            sessions: Vec::new(),
            metrics: None,
            proposal: None,
            optimization_applied: false,
            committer: ReservationCommitter::new(),
        }
    }

    /// Selected rooms in catalog order.
    pub fn selected_infrastructures(&self) -> Vec<Infrastructure> {
        self.pool.selected().into_iter().cloned().collect()
    }

    /// Whether sessions exist and every one is validated.
    pub fn all_validated(&self) -> bool {
        all_validated(&self.sessions)
    }

    /// Finds a session by id.
    pub fn session(&self, session_id: &str) -> Option<&GeneratedSession> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    /// Reservations of the last commit.
    pub fn reservations(&self) -> &[Reservation] {
        self.committer.reservations()
    }

    /// Conflicts not yet resolved.
    pub fn open_conflicts(&self) -> &[Conflict] {
        self.committer.open_conflicts()
    }

    /// Committer lifecycle state.
    pub fn committer_state(&self) -> CommitterState {
        self.committer.state()
    }

    /// Whether the current stage's completion predicate holds.
    pub fn can_advance(&self) -> bool {
        self.stage.is_complete(self)
    }

    /// Drops the pending proposal and the stored metrics, which no longer
    /// describe the sessions once they, the rooms or the formation change.
    /// Returns whether a proposal was pending.
    pub(crate) fn discard_proposal(&mut self) -> bool {
        self.metrics = None;
        self.proposal.take().is_some()
    }

    /// Drops everything derived from the current sessions.
    pub(crate) fn clear_session_products(&mut self) {
        self.metrics = None;
        self.proposal = None;
        self.optimization_applied = false;
        self.committer = ReservationCommitter::new();
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new(InfrastructurePool::default())
    }
}
