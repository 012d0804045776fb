//! Seeded local-search optimizer.
//!
//! # Algorithm
//!
//! Starting from the current sessions, each iteration draws one move:
//!
//! - **Relocate**: one session to a random grid slot and a random
//!   eligible room.
//! - **Swap**: exchange day, time and room between two sessions.
//!
//! A move is kept only if it stays feasible (room eligibility, no
//! cohort double-booking) and the resulting metrics improve on the
//! current ones: no score lower, total strictly higher. No score may
//! ever drop below the baseline, so the final proposal weakly
//! dominates it by construction.
//!
//! Equal seeds on equal input produce equal proposals.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::metrics::MetricsCalculator;
use crate::error::{Result, WorkflowError};
use crate::generator::is_eligible;
use crate::models::{
    FormationOffer, GeneratedSession, Infrastructure, InfrastructureCategory,
    OptimizationMetrics, RoomAssignment, TargetKind, WeeklyGrid,
};
use crate::progress::{NoProgress, ProgressSink, ProgressTracker};
use crate::settings::WorkflowSettings;
use crate::validation::resolve_session;

/// Result of an optimization run, pending apply or discard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationProposal {
    /// Rearranged sessions. Moved sessions are unvalidated.
    pub sessions: Vec<GeneratedSession>,
    /// Scores of the sessions the run started from.
    pub baseline: OptimizationMetrics,
    /// Scores of the proposed sessions.
    pub proposed: OptimizationMetrics,
    /// Ids of sessions whose day, time or room changed.
    pub changed_session_ids: Vec<String>,
    /// Number of accepted moves.
    pub accepted_moves: usize,
}

impl OptimizationProposal {
    /// Whether the proposal changes anything.
    pub fn has_changes(&self) -> bool {
        !self.changed_session_ids.is_empty()
    }

    /// Whether the proposal scores strictly better than the baseline.
    pub fn is_improvement(&self) -> bool {
        self.proposed.improves_on(&self.baseline)
    }
}

/// Local-search optimizer over session placements.
///
/// # Example
///
/// ```
/// use u_timetable::generator::SessionGenerator;
/// use u_timetable::models::{FormationOffer, Group, Infrastructure, Section};
/// use u_timetable::optimization::ScheduleOptimizer;
///
/// let formation = FormationOffer::new("F1", "Physics").with_section(
///     Section::new("F1-S1", 1, "Section A")
///         .with_group(Group::new("F1-S1-G1", 1, 30, 1, 30)),
/// );
/// let rooms = vec![Infrastructure::amphitheater("A1").with_capacity(100)];
/// let sessions = SessionGenerator::new().generate(&formation, &rooms).unwrap();
///
/// let proposal = ScheduleOptimizer::new()
///     .with_iterations(200)
///     .optimize(&formation, &sessions, &rooms)
///     .unwrap();
/// assert!(proposal.proposed.weakly_dominates(&proposal.baseline));
/// ```
#[derive(Debug, Clone)]
pub struct ScheduleOptimizer {
    grid: WeeklyGrid,
    lecture_categories: Vec<InfrastructureCategory>,
    iterations: usize,
    seed: u64,
}

impl ScheduleOptimizer {
    /// Creates an optimizer with default settings.
    pub fn new() -> Self {
        Self::from_settings(&WorkflowSettings::default())
    }

    /// Creates an optimizer from engine settings.
    pub fn from_settings(settings: &WorkflowSettings) -> Self {
        Self {
            grid: settings.grid.clone(),
            lecture_categories: settings.large_room_categories.clone(),
            iterations: settings.optimizer.iterations,
            seed: settings.optimizer.seed,
        }
    }

    /// Sets the number of candidate moves.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Scores `sessions` and searches for a better arrangement.
    pub fn optimize(
        &self,
        formation: &FormationOffer,
        sessions: &[GeneratedSession],
        rooms: &[Infrastructure],
    ) -> Result<OptimizationProposal> {
        self.optimize_with_progress(formation, sessions, rooms, &mut NoProgress)
    }

    /// Like [`optimize`](Self::optimize), reporting per-iteration progress.
    ///
    /// # Errors
    /// - [`WorkflowError::NoSessions`] if `sessions` is empty
    /// - [`WorkflowError::DanglingReference`] if a session's target is not in `formation`
    pub fn optimize_with_progress(
        &self,
        formation: &FormationOffer,
        sessions: &[GeneratedSession],
        rooms: &[Infrastructure],
        progress: &mut dyn ProgressSink,
    ) -> Result<OptimizationProposal> {
        if sessions.is_empty() {
            return Err(WorkflowError::NoSessions);
        }
        let mut profiles = Vec::with_capacity(sessions.len());
        for session in sessions {
            let target = resolve_session(formation, session)?;
            let equipped = session
                .room_id()
                .and_then(|id| rooms.iter().find(|r| r.id == id))
                .is_some_and(|room| room.has_equipment(&session.required_equipment));
            profiles.push(Profile {
                size: target.size(),
                section_id: target.section().id.clone(),
                had_room: !session.is_unassigned(),
                equipped,
            });
        }

        let baseline = MetricsCalculator::calculate(sessions, rooms, &self.grid);
        let mut search = Search {
            optimizer: self,
            rooms,
            profiles,
            sessions: sessions.to_vec(),
            baseline,
            current: baseline,
            accepted: 0,
        };

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut tracker = ProgressTracker::new(progress, self.iterations);
        tracker.update(0);
        for iteration in 0..self.iterations {
            if search.sessions.len() >= 2 && rng.random_bool(0.5) {
                search.try_swap(&mut rng);
            } else {
                search.try_relocate(&mut rng);
            }
            tracker.update(iteration + 1);
        }
        tracker.finish();

        let proposal = search.into_proposal(sessions);
        info!(
            "Optimization: {} accepted moves, {} sessions changed, total {:.1} -> {:.1}",
            proposal.accepted_moves,
            proposal.changed_session_ids.len(),
            proposal.baseline.total(),
            proposal.proposed.total()
        );
        Ok(proposal)
    }
}

impl Default for ScheduleOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-session facts fixed for the whole run.
struct Profile {
    size: i32,
    section_id: String,
    had_room: bool,
    /// Whether the starting room provided the required equipment.
    equipped: bool,
}

struct Search<'a> {
    optimizer: &'a ScheduleOptimizer,
    rooms: &'a [Infrastructure],
    profiles: Vec<Profile>,
    sessions: Vec<GeneratedSession>,
    baseline: OptimizationMetrics,
    current: OptimizationMetrics,
    accepted: usize,
}

impl Search<'_> {
    fn try_relocate(&mut self, rng: &mut StdRng) {
        let grid = &self.optimizer.grid;
        if grid.is_empty() {
            return;
        }
        let i = rng.random_range(0..self.sessions.len());
        let Some(slot) = grid.slot(rng.random_range(0..grid.len())) else {
            return;
        };
        let rooms = self.rooms;
        let candidates: Vec<&Infrastructure> = rooms
            .iter()
            .filter(|room| self.room_allowed(i, room))
            .collect();
        if candidates.is_empty() {
            return;
        }
        let room = candidates[rng.random_range(0..candidates.len())];

        let backup = self.sessions[i].clone();
        self.sessions[i].reschedule(
            slot.day,
            slot.band.start,
            slot.band.end,
            Some(RoomAssignment::new(&room.id, room.display_name())),
        );
        if self.feasible(i) && self.accept() {
            debug!(
                "Relocated {} to {:?} {} in {}",
                backup.id, slot.day, slot.band.start, room.id
            );
        } else {
            self.sessions[i] = backup;
        }
    }

    fn try_swap(&mut self, rng: &mut StdRng) {
        let i = rng.random_range(0..self.sessions.len());
        let j = rng.random_range(0..self.sessions.len());
        if i == j {
            return;
        }
        let backups = (self.sessions[i].clone(), self.sessions[j].clone());
        let (low, high) = if i < j { (i, j) } else { (j, i) };
        let (head, tail) = self.sessions.split_at_mut(high);
        head[low].exchange_slot(&mut tail[0]);

        let allowed = self.assigned_room_ok(i)
            && self.assigned_room_ok(j)
            && self.feasible(i)
            && self.feasible(j);
        if allowed && self.accept() {
            debug!("Swapped {} and {}", backups.0.id, backups.1.id);
        } else {
            self.sessions[i] = backups.0;
            self.sessions[j] = backups.1;
        }
    }

    /// Scores the current arrangement and keeps it if it improves.
    fn accept(&mut self) -> bool {
        let candidate =
            MetricsCalculator::calculate(&self.sessions, self.rooms, &self.optimizer.grid);
        let keeps_baseline = candidate
            .as_array()
            .iter()
            .zip(self.baseline.as_array().iter())
            .all(|(c, b)| c >= b);
        if keeps_baseline && candidate.improves_on(&self.current) {
            self.current = candidate;
            self.accepted += 1;
            true
        } else {
            false
        }
    }

    fn room_allowed(&self, index: usize, room: &Infrastructure) -> bool {
        let session = &self.sessions[index];
        let profile = &self.profiles[index];
        is_eligible(
            room,
            session.kind,
            profile.size,
            &self.optimizer.lecture_categories,
        ) && (!profile.equipped || room.has_equipment(&session.required_equipment))
    }

    /// Whether the room a swap handed to session `index` suits it. A
    /// session that started with a room must keep one.
    fn assigned_room_ok(&self, index: usize) -> bool {
        match self.sessions[index].room_id() {
            None => !self.profiles[index].had_room,
            Some(id) => self
                .rooms
                .iter()
                .find(|room| room.id == id)
                .is_some_and(|room| self.room_allowed(index, room)),
        }
    }

    /// Whether session `index` overlaps no other session of its cohort.
    fn feasible(&self, index: usize) -> bool {
        let moved = &self.sessions[index];
        self.sessions.iter().enumerate().all(|(other, session)| {
            other == index || !self.same_cohort(index, other) || !moved.time_overlaps(session)
        })
    }

    /// Sessions share students: same target, or a section lecture and
    /// anything else in that section.
    fn same_cohort(&self, a: usize, b: usize) -> bool {
        let (sa, sb) = (&self.sessions[a], &self.sessions[b]);
        if sa.target.id == sb.target.id {
            return true;
        }
        self.profiles[a].section_id == self.profiles[b].section_id
            && (sa.target.kind == TargetKind::Section || sb.target.kind == TargetKind::Section)
    }

    fn into_proposal(self, original: &[GeneratedSession]) -> OptimizationProposal {
        let mut changed_session_ids = Vec::new();
        let sessions = self
            .sessions
            .into_iter()
            .zip(original.iter())
            .map(|(proposed, before)| {
                let moved = proposed.day != before.day
                    || proposed.start != before.start
                    || proposed.end != before.end
                    || proposed.room != before.room;
                if moved {
                    changed_session_ids.push(proposed.id.clone());
                    GeneratedSession {
                        validated: false,
                        ..proposed
                    }
                } else {
                    before.clone()
                }
            })
            .collect();

        OptimizationProposal {
            sessions,
            baseline: self.baseline,
            proposed: self.current,
            changed_session_ids,
            accepted_moves: self.accepted,
        }
    }
}
