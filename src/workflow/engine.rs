//! Workflow orchestrator.
//!
//! [`WorkflowEngine`] drives one timetabling run through its six stages
//! and exposes every operation the surrounding application needs. Each
//! operation either succeeds completely or returns an error with the
//! state unchanged.
//!
//! # Data lifetime
//!
//! - `retreat()` never discards data.
//! - Re-running generation discards sessions and everything derived
//!   from them: metrics, pending proposal and reservations.
//! - Selecting a different formation discards the same, plus the
//!   sessions it no longer matches.
//! - Changing the room selection, editing the formation or moving
//!   sessions discards the pending proposal and stored metrics, so a
//!   proposal is only ever applied to the arrangement it was scored on.
//!
//! # Example
//!
//! ```
//! use u_timetable::catalog::InMemoryCatalog;
//! use u_timetable::models::{FormationOffer, Group, Infrastructure, Section};
//! use u_timetable::reservation::CommitterState;
//! use u_timetable::settings::WorkflowSettings;
//! use u_timetable::workflow::{Stage, WorkflowEngine};
//!
//! let catalog = InMemoryCatalog::new()
//!     .with_formation(FormationOffer::new("F1", "Physics").with_section(
//!         Section::new("F1-S1", 1, "Section A")
//!             .with_group(Group::new("F1-S1-G1", 1, 30, 1, 30)),
//!     ))
//!     .with_infrastructure(Infrastructure::amphitheater("A1").with_capacity(100));
//!
//! let mut engine = WorkflowEngine::new(catalog, WorkflowSettings::default()).unwrap();
//! engine.select_formation("F1", Vec::new()).unwrap();
//! assert!(engine.advance());
//! engine.select_infrastructures(&["A1"]).unwrap();
//! assert!(engine.advance());
//! engine.generate_sessions().unwrap();
//! assert!(engine.advance());
//! engine.validate_all_sessions();
//! assert!(engine.advance());
//! assert!(engine.advance()); // Optimization is optional
//! assert_eq!(engine.stage(), Stage::Reservation);
//!
//! let state = engine.commit_reservations().unwrap();
//! assert_eq!(state, CommitterState::AllConfirmed);
//! ```

use log::{debug, info};

use super::stage::Stage;
use super::state::WorkflowState;
use crate::allocation::InfrastructurePool;
use crate::catalog::Catalog;
use crate::configuration::FormationConfiguration;
use crate::error::{Result, WorkflowError};
use crate::generator::SessionGenerator;
use crate::models::{
    Conflict, FormationOffer, GeneratedSession, Infrastructure, OptimizationMetrics, Section,
};
use crate::optimization::{MetricsCalculator, OptimizationProposal, ScheduleOptimizer};
use crate::progress::{NoProgress, ProgressSink};
use crate::reservation::CommitterState;
use crate::review::ValidationManager;
use crate::settings::WorkflowSettings;
use crate::validation::{
    resolve_session, summarize, validate_formation, validate_infrastructures, validate_sessions,
};

/// Drives a timetabling run over a read-only catalog.
#[derive(Debug)]
pub struct WorkflowEngine<C: Catalog> {
    catalog: C,
    settings: WorkflowSettings,
    state: WorkflowState,
}

impl<C: Catalog> WorkflowEngine<C> {
    /// Creates an engine at the first stage with every catalog room unselected.
    ///
    /// # Errors
    /// - [`WorkflowError::InvalidSettings`] if `settings` fail validation
    /// - [`WorkflowError::InvalidStructure`] if the catalog rooms have
    ///   duplicate ids or non-positive capacities
    pub fn new(catalog: C, settings: WorkflowSettings) -> Result<Self> {
        settings.validate()?;
        let pool = InfrastructurePool::from_catalog(&catalog);
        validate_infrastructures(pool.list())
            .map_err(|errors| WorkflowError::InvalidStructure(summarize(&errors)))?;
        info!("Workflow engine ready with {} infrastructures", pool.list().len());
        Ok(Self {
            catalog,
            settings,
            state: WorkflowState::new(pool),
        })
    }

    /// Current state.
    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Owned copy of the current state.
    pub fn snapshot(&self) -> WorkflowState {
        self.state.clone()
    }

    /// Current stage.
    pub fn stage(&self) -> Stage {
        self.state.stage
    }

    /// Engine settings.
    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    /// Backing catalog.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    // ======================== Formation ========================

    /// Formations offered by the catalog.
    pub fn available_formations(&self) -> Vec<FormationOffer> {
        self.catalog.formations()
    }

    /// Selects a formation.
    ///
    /// A non-empty `sections` replaces the catalog structure; an empty one
    /// keeps it. Selecting a formation that differs from the current one
    /// discards sessions and their products.
    ///
    /// # Errors
    /// - [`WorkflowError::UnknownFormation`] if the catalog has no such formation
    /// - [`WorkflowError::InvalidStructure`] if the resulting structure is malformed
    pub fn select_formation(&mut self, formation_id: &str, sections: Vec<Section>) -> Result<()> {
        let mut formation = self
            .catalog
            .formation(formation_id)
            .ok_or_else(|| WorkflowError::UnknownFormation(formation_id.to_string()))?;
        if !sections.is_empty() {
            formation.sections = sections;
        }
        validate_formation(&formation)
            .map_err(|errors| WorkflowError::InvalidStructure(summarize(&errors)))?;

        if self.state.formation.as_ref() != Some(&formation) {
            if !self.state.sessions.is_empty() {
                info!(
                    "Formation changed, discarding {} sessions",
                    self.state.sessions.len()
                );
            }
            self.state.sessions.clear();
            self.state.clear_session_products();
        }
        info!(
            "Selected formation {} ({} sections, {} groups)",
            formation.id,
            formation.sections.len(),
            formation.group_count()
        );
        self.state.formation = Some(formation);
        Ok(())
    }

    /// Edits the selected formation's sections and groups.
    ///
    /// `edit` works on a copy; the copy replaces the formation only if
    /// `edit` succeeds and the result is still well formed. Existing
    /// sessions are kept, so removing a targeted section or group leaves
    /// them dangling until generation is re-run (see
    /// [`check_integrity`](Self::check_integrity)).
    pub fn configure_formation<R, F>(&mut self, edit: F) -> Result<R>
    where
        F: FnOnce(&mut FormationConfiguration) -> Result<R>,
    {
        let formation = self.state.formation.clone().ok_or_else(|| {
            WorkflowError::InvalidStructure("no formation selected".to_string())
        })?;
        let mut config = FormationConfiguration::new(formation);
        let result = edit(&mut config)?;
        config.validate()?;
        self.state.formation = Some(config.into_formation());
        self.drop_stale_proposal("formation edit");
        Ok(result)
    }

    // ====================== Infrastructure =====================

    /// Catalog rooms with their selection flags.
    pub fn available_infrastructures(&self) -> &[Infrastructure] {
        self.state.pool.list()
    }

    /// Flips one room's selection, returning the new flag.
    ///
    /// A pending optimization proposal is discarded.
    pub fn toggle_infrastructure(&mut self, infrastructure_id: &str) -> Result<bool> {
        let selected = self.state.pool.toggle(infrastructure_id)?;
        self.drop_stale_proposal("room selection change");
        Ok(selected)
    }

    /// Replaces the selection with exactly `ids`.
    ///
    /// A pending optimization proposal is discarded.
    ///
    /// # Errors
    /// - [`WorkflowError::EmptySelection`] if `ids` is empty
    /// - [`WorkflowError::UnknownInfrastructure`] for an id not in the catalog
    pub fn select_infrastructures<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<()> {
        if ids.is_empty() {
            return Err(WorkflowError::EmptySelection);
        }
        self.state.pool.select(ids)?;
        self.drop_stale_proposal("room selection change");
        Ok(())
    }

    // ======================== Generation =======================

    /// Generates sessions, replacing any previous ones.
    pub fn generate_sessions(&mut self) -> Result<usize> {
        self.generate_sessions_with_progress(&mut NoProgress)
    }

    /// Generates sessions, reporting progress.
    ///
    /// Returns the number of sessions. Discards metrics, any pending
    /// proposal and all reservations.
    ///
    /// # Errors
    /// - [`WorkflowError::InvalidStructure`] if no complete formation is selected
    /// - [`WorkflowError::EmptySelection`] if no room is selected
    /// - [`WorkflowError::CommitInProgress`] while reservations are being committed
    pub fn generate_sessions_with_progress(
        &mut self,
        progress: &mut dyn ProgressSink,
    ) -> Result<usize> {
        if self.state.committer_state() == CommitterState::Committing {
            return Err(WorkflowError::CommitInProgress);
        }
        let formation = self.selected_formation()?;
        let rooms = self.state.pool.validate()?;
        let sessions = SessionGenerator::from_settings(&self.settings)
            .generate_with_progress(formation, &rooms, progress)?;

        let count = sessions.len();
        self.state.sessions = sessions;
        self.state.clear_session_products();
        Ok(count)
    }

    // ======================== Validation =======================

    /// Approves a session.
    pub fn validate_session(&mut self, session_id: &str) -> Result<()> {
        ValidationManager::new(&mut self.state.sessions).validate(session_id)
    }

    /// Withdraws a session's approval.
    pub fn invalidate_session(&mut self, session_id: &str) -> Result<()> {
        ValidationManager::new(&mut self.state.sessions).invalidate(session_id)
    }

    /// Approves every session, returning how many changed.
    pub fn validate_all_sessions(&mut self) -> usize {
        ValidationManager::new(&mut self.state.sessions).validate_all()
    }

    /// Exchanges day, time and room between two sessions.
    ///
    /// A pending optimization proposal no longer matches the sessions
    /// and is discarded.
    pub fn swap_sessions(&mut self, first_id: &str, second_id: &str) -> Result<()> {
        ValidationManager::new(&mut self.state.sessions).swap(first_id, second_id)?;
        self.drop_stale_proposal("swap");
        Ok(())
    }

    /// Review operations over the current sessions.
    ///
    /// The handle can move sessions, so a pending optimization proposal
    /// is discarded up front.
    pub fn review(&mut self) -> ValidationManager<'_> {
        self.drop_stale_proposal("manual review");
        ValidationManager::new(&mut self.state.sessions)
    }

    // ======================= Optimization ======================

    /// Scores the current sessions with the selected rooms.
    pub fn current_metrics(&self) -> OptimizationMetrics {
        let rooms = self.state.selected_infrastructures();
        MetricsCalculator::calculate(&self.state.sessions, &rooms, &self.settings.grid)
    }

    /// Runs the optimizer, storing its proposal.
    pub fn run_optimization(&mut self) -> Result<&OptimizationProposal> {
        self.run_optimization_with_progress(&mut NoProgress)
    }

    /// Runs the optimizer, reporting progress.
    ///
    /// # Errors
    /// - [`WorkflowError::NoSessions`] if nothing was generated
    /// - [`WorkflowError::DanglingReference`] if a session's target is gone
    pub fn run_optimization_with_progress(
        &mut self,
        progress: &mut dyn ProgressSink,
    ) -> Result<&OptimizationProposal> {
        if self.state.sessions.is_empty() {
            return Err(WorkflowError::NoSessions);
        }
        let formation = self.selected_formation()?;
        let rooms = self.state.selected_infrastructures();
        let proposal = ScheduleOptimizer::from_settings(&self.settings).optimize_with_progress(
            formation,
            &self.state.sessions,
            &rooms,
            progress,
        )?;

        self.state.metrics = Some(proposal.baseline);
        Ok(self.state.proposal.insert(proposal))
    }

    /// Applies the pending proposal, returning the new metrics.
    ///
    /// Only moved sessions are replaced; the others keep their current
    /// validation state.
    ///
    /// # Errors
    /// [`WorkflowError::NoProposal`] if no proposal is pending.
    pub fn apply_optimization(&mut self) -> Result<OptimizationMetrics> {
        let proposal = self.state.proposal.take().ok_or(WorkflowError::NoProposal)?;
        for proposed in proposal.sessions {
            if !proposal.changed_session_ids.contains(&proposed.id) {
                continue;
            }
            if let Some(current) = self.state.sessions.iter_mut().find(|s| s.id == proposed.id) {
                *current = proposed;
            }
        }
        self.state.metrics = Some(proposal.proposed);
        self.state.optimization_applied = true;
        info!(
            "Applied optimization: {} sessions moved",
            proposal.changed_session_ids.len()
        );
        Ok(proposal.proposed)
    }

    /// Drops the pending proposal. Returns whether there was one.
    pub fn discard_optimization(&mut self) -> bool {
        let discarded = self.state.proposal.take().is_some();
        if discarded {
            debug!("Discarded optimization proposal");
        }
        discarded
    }

    // ======================== Reservation ======================

    /// Commits reservations for every session.
    pub fn commit_reservations(&mut self) -> Result<CommitterState> {
        self.commit_reservations_with_progress(&mut NoProgress)
    }

    /// Commits reservations, reporting progress.
    ///
    /// # Errors
    /// - [`WorkflowError::NothingToReserve`] if nothing was generated
    /// - [`WorkflowError::CommitInProgress`] while a pass is running
    /// - [`WorkflowError::DanglingReference`] if a session's target is gone
    pub fn commit_reservations_with_progress(
        &mut self,
        progress: &mut dyn ProgressSink,
    ) -> Result<CommitterState> {
        if self.state.sessions.is_empty() {
            return Err(WorkflowError::NothingToReserve);
        }
        let formation = self
            .state
            .formation
            .as_ref()
            .ok_or_else(|| WorkflowError::InvalidStructure("no formation selected".to_string()))?;
        let rooms = self.state.selected_infrastructures();
        self.state
            .committer
            .commit_with_progress(formation, &self.state.sessions, &rooms, progress)
    }

    /// Acknowledges a conflict.
    pub fn resolve_conflict(&mut self, conflict_id: &str) -> Result<Conflict> {
        self.state.committer.resolve_conflict(conflict_id)
    }

    /// Discards every reservation and conflict. Sessions are untouched.
    pub fn cancel_all_reservations(&mut self) -> Result<()> {
        self.state.committer.cancel_all()
    }

    // ========================= Stages ==========================

    /// Whether the current stage's completion predicate holds.
    pub fn can_advance(&self) -> bool {
        self.state.can_advance()
    }

    /// Moves to the next stage if the current one is complete.
    ///
    /// Returns `false` and changes nothing otherwise.
    pub fn advance(&mut self) -> bool {
        let current = self.state.stage;
        match current.next() {
            Some(next) if current.is_complete(&self.state) => {
                info!("Workflow stage: {} -> {}", current, next);
                self.state.stage = next;
                true
            }
            _ => {
                debug!("Cannot leave stage {}", current);
                false
            }
        }
    }

    /// Moves to the previous stage, keeping all data.
    ///
    /// Returns `false` at the first stage.
    pub fn retreat(&mut self) -> bool {
        let current = self.state.stage;
        match current.previous() {
            Some(previous) => {
                info!("Workflow stage: {} -> {}", current, previous);
                self.state.stage = previous;
                true
            }
            None => false,
        }
    }

    /// Checks the whole state: every session (current and proposed)
    /// targets a section or group of the selected formation, session ids
    /// are unique, and the room pool is well formed.
    ///
    /// # Errors
    /// - [`WorkflowError::DanglingReference`] for the first session whose target is gone
    /// - [`WorkflowError::InvalidStructure`] for duplicate session ids or a malformed pool
    pub fn check_integrity(&self) -> Result<()> {
        let proposed = self
            .state
            .proposal
            .iter()
            .flat_map(|p| p.sessions.iter());
        let sessions: Vec<&GeneratedSession> = self.state.sessions.iter().chain(proposed).collect();

        let Some(formation) = &self.state.formation else {
            return match sessions.first() {
                Some(session) => Err(WorkflowError::dangling(&session.id, &session.target.id)),
                None => Ok(()),
            };
        };
        for session in sessions {
            resolve_session(formation, session)?;
        }
        validate_sessions(formation, &self.state.sessions)
            .map_err(|errors| WorkflowError::InvalidStructure(summarize(&errors)))?;
        validate_infrastructures(self.state.pool.list())
            .map_err(|errors| WorkflowError::InvalidStructure(summarize(&errors)))
    }

    fn drop_stale_proposal(&mut self, cause: &str) {
        if self.state.discard_proposal() {
            debug!("Discarded optimization proposal after {}", cause);
        }
    }

    fn selected_formation(&self) -> Result<&FormationOffer> {
        let formation = self.state.formation.as_ref().ok_or_else(|| {
            WorkflowError::InvalidStructure("no formation selected".to_string())
        })?;
        validate_formation(formation)
            .map_err(|errors| WorkflowError::InvalidStructure(summarize(&errors)))?;
        Ok(formation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::models::{Group, ReservationStatus, SessionKind};

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with_formation(
                FormationOffer::new("F1", "Computer Science").with_section(
                    Section::new("F1-S1", 1, "Section A")
                        .with_group(Group::new("F1-S1-G1", 1, 30, 1, 30))
                        .with_group(Group::new("F1-S1-G2", 2, 30, 31, 60)),
                ),
            )
            .with_formation(FormationOffer::new("F2", "Skeleton"))
            .with_infrastructure(Infrastructure::amphitheater("AMPHI").with_capacity(200))
            .with_infrastructure(Infrastructure::classroom("C-A").with_capacity(40))
            .with_infrastructure(Infrastructure::classroom("C-B").with_capacity(40))
    }

    fn engine() -> WorkflowEngine<InMemoryCatalog> {
        WorkflowEngine::new(catalog(), WorkflowSettings::default()).unwrap()
    }

    fn generated() -> WorkflowEngine<InMemoryCatalog> {
        let mut e = engine();
        e.select_formation("F1", Vec::new()).unwrap();
        e.select_infrastructures(&["AMPHI", "C-A", "C-B"]).unwrap();
        e.generate_sessions().unwrap();
        e
    }

    #[test]
    fn test_new_rejects_bad_settings() {
        let mut settings = WorkflowSettings::default();
        settings.grid.days.clear();
        assert!(matches!(
            WorkflowEngine::new(catalog(), settings),
            Err(WorkflowError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_new_rejects_malformed_rooms() {
        let duplicate = catalog().with_infrastructure(Infrastructure::classroom("C-A"));
        assert!(matches!(
            WorkflowEngine::new(duplicate, WorkflowSettings::default()),
            Err(WorkflowError::InvalidStructure(_))
        ));
        let empty_room = InMemoryCatalog::new()
            .with_infrastructure(Infrastructure::classroom("C-Z").with_capacity(0));
        assert!(matches!(
            WorkflowEngine::new(empty_room, WorkflowSettings::default()),
            Err(WorkflowError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_select_formation() {
        let mut e = engine();
        assert_eq!(
            e.select_formation("F9", Vec::new()).unwrap_err(),
            WorkflowError::UnknownFormation("F9".into())
        );
        // Skeleton without sections
        assert!(matches!(
            e.select_formation("F2", Vec::new()),
            Err(WorkflowError::InvalidStructure(_))
        ));
        assert!(e.state().formation.is_none());

        let sections = vec![Section::new("F2-S1", 1, "Only")
            .with_group(Group::new("F2-S1-G1", 1, 25, 1, 25))];
        e.select_formation("F2", sections).unwrap();
        assert_eq!(e.state().formation.as_ref().unwrap().group_count(), 1);
        assert!(e.can_advance());
    }

    #[test]
    fn test_empty_section_rejected() {
        let mut e = engine();
        let sections = vec![Section::new("F2-S1", 1, "Empty")];
        assert!(matches!(
            e.select_formation("F2", sections),
            Err(WorkflowError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_configure_formation() {
        let mut e = engine();
        assert!(e.configure_formation(|c| c.add_section("B", 20)).is_err());

        e.select_formation("F1", Vec::new()).unwrap();
        let id = e.configure_formation(|c| c.add_section("Section B", 20)).unwrap();
        assert_eq!(id, "F1-S2");
        assert_eq!(e.state().formation.as_ref().unwrap().sections.len(), 2);

        // A failing edit leaves the formation untouched
        let err = e.configure_formation(|c| c.add_group("F1-S2", 0));
        assert!(err.is_err());
        assert_eq!(e.state().formation.as_ref().unwrap().group_count(), 3);
    }

    #[test]
    fn test_infrastructure_selection() {
        let mut e = engine();
        let none: [&str; 0] = [];
        assert_eq!(
            e.select_infrastructures(&none).unwrap_err(),
            WorkflowError::EmptySelection
        );
        assert!(e.toggle_infrastructure("C-A").unwrap());
        assert_eq!(e.state().selected_infrastructures().len(), 1);
        e.select_infrastructures(&["AMPHI"]).unwrap();
        let selected = e.state().selected_infrastructures();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, "AMPHI");
        assert_eq!(e.available_infrastructures().len(), 3);
    }

    #[test]
    fn test_generation_guards() {
        let mut e = engine();
        assert!(matches!(
            e.generate_sessions(),
            Err(WorkflowError::InvalidStructure(_))
        ));
        e.select_formation("F1", Vec::new()).unwrap();
        assert_eq!(e.generate_sessions().unwrap_err(), WorkflowError::EmptySelection);
        assert!(e.state().sessions.is_empty());
    }

    #[test]
    fn test_generation_and_regeneration() {
        let mut e = generated();
        assert_eq!(e.state().sessions.len(), 5);

        e.commit_reservations().unwrap();
        e.run_optimization().unwrap();
        assert!(e.state().proposal.is_some());

        // Re-running generation discards downstream products
        e.generate_sessions().unwrap();
        assert!(e.state().proposal.is_none());
        assert!(e.state().metrics.is_none());
        assert!(e.state().reservations().is_empty());
        assert_eq!(e.state().committer_state(), CommitterState::NotStarted);
    }

    #[test]
    fn test_validation_gates_advance() {
        let mut e = generated();
        e.state.stage = Stage::Validation;
        assert!(!e.advance());
        assert_eq!(e.stage(), Stage::Validation);

        for id in ["SES-0001", "SES-0002", "SES-0003", "SES-0004"] {
            e.validate_session(id).unwrap();
        }
        assert!(!e.can_advance());
        e.validate_session("SES-0005").unwrap();
        assert!(e.can_advance());

        e.invalidate_session("SES-0005").unwrap();
        assert!(!e.advance());
        e.validate_session("SES-0005").unwrap();
        assert!(e.advance());
        assert_eq!(e.stage(), Stage::Optimization);
    }

    #[test]
    fn test_swap_resets_validation() {
        let mut e = generated();
        e.validate_all_sessions();
        e.run_optimization().unwrap();
        e.swap_sessions("SES-0002", "SES-0004").unwrap();
        assert!(!e.state().all_validated());
        assert!(e.state().proposal.is_none());
        assert!(e.state().metrics.is_none());
        assert!(matches!(
            e.swap_sessions("SES-0002", "SES-0002"),
            Err(WorkflowError::InvalidSwapTarget(_))
        ));
    }

    fn optimized() -> WorkflowEngine<InMemoryCatalog> {
        let mut e = engine();
        e.select_formation("F1", Vec::new()).unwrap();
        e.select_infrastructures(&["C-A"]).unwrap();
        e.generate_sessions().unwrap();
        e.run_optimization().unwrap();
        assert!(e.state().proposal.is_some());
        assert!(e.state().metrics.is_some());
        e
    }

    fn assert_proposal_dropped(e: &mut WorkflowEngine<InMemoryCatalog>) {
        assert!(e.state().proposal.is_none());
        assert!(e.state().metrics.is_none());
        assert_eq!(e.apply_optimization().unwrap_err(), WorkflowError::NoProposal);
    }

    #[test]
    fn test_room_selection_drops_proposal() {
        let mut e = optimized();
        let before = e.current_metrics();
        e.select_infrastructures(&["AMPHI", "C-A", "C-B"]).unwrap();
        assert_proposal_dropped(&mut e);
        // Sessions untouched, rescored against the new pool
        assert!(e.current_metrics().room_utilization < before.room_utilization);

        let mut e = optimized();
        e.toggle_infrastructure("C-B").unwrap();
        assert_proposal_dropped(&mut e);
    }

    #[test]
    fn test_failed_room_selection_keeps_proposal() {
        let mut e = optimized();
        assert!(e.select_infrastructures(&["NOPE"]).is_err());
        assert!(e.toggle_infrastructure("NOPE").is_err());
        assert!(e.state().proposal.is_some());
    }

    #[test]
    fn test_formation_edit_drops_proposal() {
        let mut e = optimized();
        e.configure_formation(|c| c.add_section("Section B", 20))
            .unwrap();
        assert_proposal_dropped(&mut e);
    }

    #[test]
    fn test_review_handle_drops_proposal() {
        let mut e = optimized();
        e.review().swap("SES-0002", "SES-0004").unwrap();
        assert_proposal_dropped(&mut e);
    }

    #[test]
    fn test_optimization_apply_and_discard() {
        let mut e = engine();
        e.select_formation("F1", Vec::new()).unwrap();
        // One room: both seminars and both practicals double-book it
        e.select_infrastructures(&["AMPHI"]).unwrap();
        e.generate_sessions().unwrap();
        e.validate_all_sessions();

        let baseline = e.run_optimization_with_progress(&mut NoProgress).unwrap().baseline;
        assert_eq!(baseline, e.current_metrics());
        let proposal = e.state().proposal.clone().unwrap();
        let before = e.current_metrics();

        let applied = e.apply_optimization().unwrap();
        assert!(applied.weakly_dominates(&before));
        assert_eq!(applied, e.current_metrics());
        assert!(e.state().optimization_applied);
        for session in &e.state().sessions {
            let moved = proposal.changed_session_ids.contains(&session.id);
            assert_eq!(session.validated, !moved);
        }
        assert_eq!(e.apply_optimization().unwrap_err(), WorkflowError::NoProposal);

        e.run_optimization().unwrap();
        let sessions = e.state().sessions.clone();
        assert!(e.discard_optimization());
        assert!(!e.discard_optimization());
        assert_eq!(e.state().sessions, sessions);
    }

    #[test]
    fn test_optimization_needs_sessions() {
        let mut e = engine();
        assert_eq!(e.run_optimization().unwrap_err(), WorkflowError::NoSessions);
    }

    #[test]
    fn test_reservation_flow() {
        let mut e = generated();
        assert_eq!(e.commit_reservations().unwrap(), CommitterState::AllConfirmed);
        assert_eq!(e.state().reservations().len(), 5);
        assert!(e
            .state()
            .reservations()
            .iter()
            .all(|r| r.status == ReservationStatus::Confirmed));

        e.cancel_all_reservations().unwrap();
        assert!(e.state().reservations().is_empty());
        assert_eq!(e.state().sessions.len(), 5);
        assert_eq!(
            e.resolve_conflict("CON-0001").unwrap_err(),
            WorkflowError::UnknownConflict("CON-0001".into())
        );
    }

    #[test]
    fn test_commit_without_sessions() {
        let mut e = engine();
        assert_eq!(
            e.commit_reservations().unwrap_err(),
            WorkflowError::NothingToReserve
        );
    }

    #[test]
    fn test_retreat_preserves_data() {
        let mut e = generated();
        e.state.stage = Stage::Optimization;
        e.run_optimization().unwrap();
        assert!(e.retreat());
        assert_eq!(e.stage(), Stage::Validation);
        assert!(e.state().proposal.is_some());
        assert_eq!(e.state().sessions.len(), 5);

        while e.retreat() {}
        assert_eq!(e.stage(), Stage::FormationSelection);
        assert_eq!(e.state().sessions.len(), 5);
    }

    #[test]
    fn test_reservation_is_terminal() {
        let mut e = generated();
        e.state.stage = Stage::Reservation;
        e.commit_reservations().unwrap();
        assert!(!e.can_advance());
        assert!(!e.advance());
    }

    #[test]
    fn test_integrity_detects_dangling_group() {
        let mut e = generated();
        assert!(e.check_integrity().is_ok());

        e.configure_formation(|c| c.remove_group("F1-S1", "F1-S1-G2"))
            .unwrap();
        let err = e.check_integrity().unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::DanglingReference { ref target_id, .. } if target_id == "F1-S1-G2"
        ));
        // Read paths surface the same error instead of panicking
        assert!(matches!(
            e.commit_reservations(),
            Err(WorkflowError::DanglingReference { .. })
        ));
        assert!(matches!(
            e.run_optimization(),
            Err(WorkflowError::DanglingReference { .. })
        ));
    }

    #[test]
    fn test_integrity_detects_duplicate_sessions() {
        let mut e = generated();
        e.state.sessions[1].id = "SES-0001".to_string();
        assert!(matches!(
            e.check_integrity(),
            Err(WorkflowError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_kinds_after_generation() {
        let e = generated();
        let kinds: Vec<SessionKind> = e.state().sessions.iter().map(|s| s.kind).collect();
        assert_eq!(kinds.iter().filter(|k| **k == SessionKind::Lecture).count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == SessionKind::Seminar).count(), 2);
        assert_eq!(kinds.iter().filter(|k| **k == SessionKind::Practical).count(), 2);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut e = generated();
        let snapshot = e.snapshot();
        e.validate_all_sessions();
        assert!(!snapshot.all_validated());
        assert!(e.state().all_validated());
    }
}
