//! Reservation commit state machine.
//!
//! # States
//!
//! ```text
//! NotStarted ──commit──▶ Committing ──▶ AllConfirmed
//!     ▲                             └─▶ PartiallyConflicted
//!     └──────────── cancel_all ◀────────────┘
//! ```
//!
//! # Commit pass
//!
//! Sessions are processed in session-id order. Each one yields a pending
//! reservation which is then checked, in order:
//!
//! 1. **Capacity**: no room, a room outside the pool, or a room smaller
//!    than the attending cohort. Reservation → `Conflict`, conflict
//!    severity high.
//! 2. **Overlap**: same room, day and intersecting time as an already
//!    confirmed reservation. Reservation → `Conflict`, conflict severity
//!    medium, listing this session first and then the confirmed ones.
//! 3. Otherwise the reservation is `Confirmed`. Missing equipment is
//!    then recorded as a low-severity conflict without unconfirming it.
//!
//! Confirmed reservations never change during a pass, so the overlap
//! check only ever reads settled data. Equal input gives equal output.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorkflowError};
use crate::models::{
    Conflict, FormationOffer, GeneratedSession, Infrastructure, Reservation, ReservationStatus,
};
use crate::progress::{NoProgress, ProgressSink, ProgressTracker};
use crate::validation::resolve_session;

/// Committer lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitterState {
    /// No reservations held.
    NotStarted,
    /// A commit pass is running.
    Committing,
    /// Every reservation is confirmed.
    AllConfirmed,
    /// At least one reservation is in conflict.
    PartiallyConflicted,
}

impl CommitterState {
    /// Whether a commit pass has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::AllConfirmed | Self::PartiallyConflicted)
    }
}

/// Turns generated sessions into room reservations and conflicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationCommitter {
    state: CommitterState,
    reservations: Vec<Reservation>,
    conflicts: Vec<Conflict>,
}

impl ReservationCommitter {
    /// Creates an idle committer.
    pub fn new() -> Self {
        Self {
            state: CommitterState::NotStarted,
            reservations: Vec::new(),
            conflicts: Vec::new(),
        }
    }

    /// Current state.
    pub fn state(&self) -> CommitterState {
        self.state
    }

    /// All reservations of the last pass, in commit order.
    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    /// Conflicts not yet resolved.
    pub fn open_conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Reservations with the given status.
    pub fn reservations_with_status(&self, status: ReservationStatus) -> Vec<&Reservation> {
        self.reservations
            .iter()
            .filter(|r| r.status == status)
            .collect()
    }

    /// Reservation of a session, if committed.
    pub fn reservation_for_session(&self, session_id: &str) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.session_id == session_id)
    }

    /// Commits every session.
    pub fn commit(
        &mut self,
        formation: &FormationOffer,
        sessions: &[GeneratedSession],
        rooms: &[Infrastructure],
    ) -> Result<CommitterState> {
        self.commit_with_progress(formation, sessions, rooms, &mut NoProgress)
    }

    /// Commits every session, reporting per-session progress.
    ///
    /// Results of a previous pass are discarded first.
    ///
    /// # Errors
    /// - [`WorkflowError::NothingToReserve`] if `sessions` is empty
    /// - [`WorkflowError::CommitInProgress`] if a pass is running
    /// - [`WorkflowError::DanglingReference`] if a session's target is not in `formation`
    pub fn commit_with_progress(
        &mut self,
        formation: &FormationOffer,
        sessions: &[GeneratedSession],
        rooms: &[Infrastructure],
        progress: &mut dyn ProgressSink,
    ) -> Result<CommitterState> {
        if self.state == CommitterState::Committing {
            return Err(WorkflowError::CommitInProgress);
        }
        if sessions.is_empty() {
            return Err(WorkflowError::NothingToReserve);
        }

        // Resolve every target before touching state
        let mut ordered = Vec::with_capacity(sessions.len());
        for session in sessions {
            let size = resolve_session(formation, session)?.size();
            ordered.push((session, size));
        }
        ordered.sort_by(|a, b| a.0.id.cmp(&b.0.id));

        self.reservations.clear();
        self.conflicts.clear();
        self.state = CommitterState::Committing;
        info!("Committing {} reservations", ordered.len());

        let mut tracker = ProgressTracker::new(progress, ordered.len());
        tracker.update(0);
        for (done, (session, size)) in ordered.into_iter().enumerate() {
            self.commit_one(session, size, rooms);
            tracker.update(done + 1);
        }
        tracker.finish();

        let conflicted = self
            .reservations
            .iter()
            .filter(|r| r.status == ReservationStatus::Conflict)
            .count();
        self.state = if conflicted == 0 {
            CommitterState::AllConfirmed
        } else {
            CommitterState::PartiallyConflicted
        };
        info!(
            "Commit finished: {} confirmed, {} in conflict, {} open conflicts",
            self.reservations.len() - conflicted,
            conflicted,
            self.conflicts.len()
        );
        Ok(self.state)
    }

    /// Acknowledges a conflict, removing it from the open list.
    ///
    /// Reservations and sessions are left as they are.
    pub fn resolve_conflict(&mut self, conflict_id: &str) -> Result<Conflict> {
        let position = self
            .conflicts
            .iter()
            .position(|c| c.id == conflict_id)
            .ok_or_else(|| WorkflowError::UnknownConflict(conflict_id.to_string()))?;
        debug!("Resolved conflict {}", conflict_id);
        Ok(self.conflicts.remove(position))
    }

    /// Discards every reservation and conflict, returning to `NotStarted`.
    ///
    /// # Errors
    /// [`WorkflowError::CommitInProgress`] while a pass is running.
    pub fn cancel_all(&mut self) -> Result<()> {
        if self.state == CommitterState::Committing {
            return Err(WorkflowError::CommitInProgress);
        }
        info!(
            "Cancelled {} reservations and {} conflicts",
            self.reservations.len(),
            self.conflicts.len()
        );
        self.reservations.clear();
        self.conflicts.clear();
        self.state = CommitterState::NotStarted;
        Ok(())
    }

    fn commit_one(&mut self, session: &GeneratedSession, size: i32, rooms: &[Infrastructure]) {
        let id = format!("RES-{:04}", self.reservations.len() + 1);
        let mut reservation = Reservation::pending(id, session);
        let room = session
            .room_id()
            .and_then(|room_id| rooms.iter().find(|r| r.id == room_id));

        if let Some(message) = capacity_problem(session, room, size) {
            warn!("{}", message);
            let conflict_id = self.next_conflict_id();
            self.conflicts
                .push(Conflict::capacity(conflict_id, &session.id, message));
            reservation.status = ReservationStatus::Conflict;
            self.reservations.push(reservation);
            return;
        }

        let overlapping: Vec<&Reservation> = self
            .reservations
            .iter()
            .filter(|r| r.is_confirmed() && r.overlaps(&reservation))
            .collect();
        if !overlapping.is_empty() {
            let mut session_ids = vec![session.id.clone()];
            session_ids.extend(overlapping.iter().map(|r| r.session_id.clone()));
            let message = format!(
                "Room {} double-booked on {:?} {}-{} by {}",
                reservation.room_id().unwrap_or_default(),
                reservation.day,
                reservation.start.format("%H:%M"),
                reservation.end.format("%H:%M"),
                session_ids.join(", ")
            );
            warn!("{}", message);
            let conflict_id = self.next_conflict_id();
            self.conflicts
                .push(Conflict::overlap(conflict_id, session_ids, message));
            reservation.status = ReservationStatus::Conflict;
            self.reservations.push(reservation);
            return;
        }

        reservation.status = ReservationStatus::Confirmed;
        debug!("{} confirmed for session {}", reservation.id, session.id);

        if let Some(room) = room {
            let missing = room.missing_equipment(&session.required_equipment);
            if !missing.is_empty() {
                let message = format!(
                    "Room {} lacks {} required by session {}",
                    room.id,
                    missing.join(", "),
                    session.id
                );
                warn!("{}", message);
                let conflict_id = self.next_conflict_id();
                self.conflicts
                    .push(Conflict::equipment(conflict_id, &session.id, message));
            }
        }
        self.reservations.push(reservation);
    }

    fn next_conflict_id(&self) -> String {
        let highest = self
            .conflicts
            .iter()
            .filter_map(|c| c.id.strip_prefix("CON-")?.parse::<usize>().ok())
            .max()
            .unwrap_or(0);
        format!("CON-{:04}", highest + 1)
    }
}

impl Default for ReservationCommitter {
    fn default() -> Self {
        Self::new()
    }
}

fn capacity_problem(
    session: &GeneratedSession,
    room: Option<&Infrastructure>,
    size: i32,
) -> Option<String> {
    match (session.room_id(), room) {
        (None, _) => Some(format!(
            "Session {} has no room for {} students",
            session.id, size
        )),
        (Some(room_id), None) => Some(format!(
            "Session {} is in room {} which is not in the selected pool",
            session.id, room_id
        )),
        (Some(_), Some(room)) if !room.fits(size) => Some(format!(
            "Room {} holds {} but session {} needs {}",
            room.id, room.capacity, session.id, size
        )),
        _ => None,
    }
}
