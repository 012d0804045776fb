//! Session review.
//!
//! Administrators approve generated sessions one by one, or move them by
//! exchanging slots between two sessions. Any move clears the approval of
//! the sessions it touches.
//!
//! # Example
//!
//! ```
//! use chrono::{NaiveTime, Weekday};
//! use u_timetable::models::{GeneratedSession, SessionKind, TargetRef};
//! use u_timetable::review::ValidationManager;
//!
//! let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
//! let mut sessions = vec![
//!     GeneratedSession::new("S1", SessionKind::Seminar, TargetRef::group("G1", "G1"), Weekday::Mon, t(8), t(9)),
//!     GeneratedSession::new("S2", SessionKind::Seminar, TargetRef::group("G2", "G2"), Weekday::Tue, t(10), t(11)),
//! ];
//!
//! let mut manager = ValidationManager::new(&mut sessions);
//! manager.validate("S1").unwrap();
//! manager.swap("S1", "S2").unwrap();
//! assert!(!manager.all_validated());
//! assert_eq!(sessions[0].day, Weekday::Tue);
//! ```

use log::debug;

use crate::error::{Result, WorkflowError};
use crate::models::GeneratedSession;

/// Whether the set is non-empty and every session is approved.
pub fn all_validated(sessions: &[GeneratedSession]) -> bool {
    !sessions.is_empty() && sessions.iter().all(|s| s.validated)
}

/// Approval and slot-exchange operations over a session set.
#[derive(Debug)]
pub struct ValidationManager<'a> {
    sessions: &'a mut [GeneratedSession],
}

impl<'a> ValidationManager<'a> {
    /// Wraps a session set.
    pub fn new(sessions: &'a mut [GeneratedSession]) -> Self {
        Self { sessions }
    }

    /// Finds a session by id.
    pub fn get(&self, session_id: &str) -> Option<&GeneratedSession> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    /// Approves a session. No-op if already approved.
    pub fn validate(&mut self, session_id: &str) -> Result<()> {
        let session = self.find_mut(session_id)?;
        if !session.validated {
            session.validated = true;
            debug!("Validated session {}", session_id);
        }
        Ok(())
    }

    /// Withdraws a session's approval.
    pub fn invalidate(&mut self, session_id: &str) -> Result<()> {
        let session = self.find_mut(session_id)?;
        session.validated = false;
        debug!("Invalidated session {}", session_id);
        Ok(())
    }

    /// Exchanges day, times and room between two sessions.
    ///
    /// Both sessions lose their approval. Applying the same swap twice
    /// restores the original slots.
    ///
    /// # Errors
    /// [`WorkflowError::InvalidSwapTarget`] if the ids are equal or either is unknown.
    pub fn swap(&mut self, first_id: &str, second_id: &str) -> Result<()> {
        if first_id == second_id {
            return Err(WorkflowError::InvalidSwapTarget(format!(
                "cannot swap session '{}' with itself",
                first_id
            )));
        }
        let i = self.position(first_id).ok_or_else(|| unknown_target(first_id))?;
        let j = self.position(second_id).ok_or_else(|| unknown_target(second_id))?;

        let (low, high) = if i < j { (i, j) } else { (j, i) };
        let (head, tail) = self.sessions.split_at_mut(high);
        head[low].exchange_slot(&mut tail[0]);

        debug!("Swapped slots of sessions {} and {}", first_id, second_id);
        Ok(())
    }

    /// Approves every session, returning how many changed.
    pub fn validate_all(&mut self) -> usize {
        let mut changed = 0;
        for session in self.sessions.iter_mut().filter(|s| !s.validated) {
            session.validated = true;
            changed += 1;
        }
        changed
    }

    /// Whether the set is non-empty and every session is approved.
    pub fn all_validated(&self) -> bool {
        all_validated(&*self.sessions)
    }

    /// Sessions still awaiting approval.
    pub fn pending_sessions(&self) -> Vec<&GeneratedSession> {
        self.sessions.iter().filter(|s| !s.validated).collect()
    }

    /// Sessions attended by a section or group, in chronological order.
    pub fn sessions_for_target(&self, target_id: &str) -> Vec<&GeneratedSession> {
        let mut found: Vec<&GeneratedSession> = self
            .sessions
            .iter()
            .filter(|s| s.target.id == target_id)
            .collect();
        found.sort_by(|a, b| a.chronological_key().cmp(&b.chronological_key()));
        found
    }

    /// Sessions held in a room, in chronological order.
    pub fn sessions_for_room(&self, room_id: &str) -> Vec<&GeneratedSession> {
        let mut found: Vec<&GeneratedSession> = self
            .sessions
            .iter()
            .filter(|s| s.room_id() == Some(room_id))
            .collect();
        found.sort_by(|a, b| a.chronological_key().cmp(&b.chronological_key()));
        found
    }

    fn position(&self, session_id: &str) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == session_id)
    }

    fn find_mut(&mut self, session_id: &str) -> Result<&mut GeneratedSession> {
        self.sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| WorkflowError::UnknownSession(session_id.to_string()))
    }
}

fn unknown_target(session_id: &str) -> WorkflowError {
    WorkflowError::InvalidSwapTarget(format!("unknown session '{}'", session_id))
}
