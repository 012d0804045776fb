//! Reservation and conflict models.
//!
//! A reservation binds a generated session to its room and time slot.
//! A conflict records a detected violation (double booking, capacity,
//! missing equipment) that an administrator must act on. Conflicts are
//! result data, not errors.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::calendar::intervals_overlap;
use super::session::{GeneratedSession, RoomAssignment};

/// Suggested remedy for double bookings.
pub const OVERLAP_REMEDY: &str = "assign alternate room or shift time";

/// A room booking derived from a generated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique reservation identifier.
    pub id: String,
    /// Reserved session.
    pub session_id: String,
    /// Reserved room (`None` if the session had no room).
    pub room: Option<RoomAssignment>,
    /// Day of week.
    pub day: Weekday,
    /// Start time (inclusive).
    pub start: NaiveTime,
    /// End time (exclusive).
    pub end: NaiveTime,
    /// Booking status.
    pub status: ReservationStatus,
}

/// Reservation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// Created, not yet checked.
    Pending,
    /// Checked and held.
    Confirmed,
    /// Checked and rejected by a conflict.
    Conflict,
}

/// A detected scheduling violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    /// Unique conflict identifier.
    pub id: String,
    /// Violation category.
    pub kind: ConflictKind,
    /// Human-readable description.
    pub message: String,
    /// Sessions involved.
    pub session_ids: Vec<String>,
    /// How urgently it needs attention.
    pub severity: Severity,
    /// Suggested fix, if any.
    pub remedy: Option<String>,
}

/// Classification of conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    /// Two bookings hold the same room at intersecting times.
    Overlap,
    /// No room, or a room too small for the attending cohort.
    Capacity,
    /// The room lacks required equipment.
    Equipment,
}

/// Conflict severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Reservation {
    /// Creates a pending reservation mirroring a session's slot.
    pub fn pending(id: impl Into<String>, session: &GeneratedSession) -> Self {
        Self {
            id: id.into(),
            session_id: session.id.clone(),
            room: session.room.clone(),
            day: session.day,
            start: session.start,
            end: session.end,
            status: ReservationStatus::Pending,
        }
    }

    /// Reserved room id, if any.
    pub fn room_id(&self) -> Option<&str> {
        self.room.as_ref().map(|r| r.id.as_str())
    }

    /// Whether two reservations hold the same room at intersecting times.
    pub fn overlaps(&self, other: &Self) -> bool {
        match (self.room_id(), other.room_id()) {
            (Some(a), Some(b)) => {
                a == b
                    && self.day == other.day
                    && intervals_overlap(self.start, self.end, other.start, other.end)
            }
            _ => false,
        }
    }

    /// Whether the reservation is confirmed.
    #[inline]
    pub fn is_confirmed(&self) -> bool {
        self.status == ReservationStatus::Confirmed
    }
}

impl Conflict {
    /// Creates a double-booking conflict.
    pub fn overlap(
        id: impl Into<String>,
        session_ids: Vec<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: ConflictKind::Overlap,
            message: message.into(),
            session_ids,
            severity: Severity::Medium,
            remedy: Some(OVERLAP_REMEDY.to_string()),
        }
    }

    /// Creates a capacity conflict.
    pub fn capacity(
        id: impl Into<String>,
        session_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: ConflictKind::Capacity,
            message: message.into(),
            session_ids: vec![session_id.into()],
            severity: Severity::High,
            remedy: Some("assign a larger room".to_string()),
        }
    }

    /// Creates a missing-equipment conflict.
    pub fn equipment(
        id: impl Into<String>,
        session_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: ConflictKind::Equipment,
            message: message.into(),
            session_ids: vec![session_id.into()],
            severity: Severity::Low,
            remedy: Some("assign an equipped room".to_string()),
        }
    }

    /// Whether the conflict involves a session.
    pub fn involves(&self, session_id: &str) -> bool {
        self.session_ids.iter().any(|s| s == session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SessionKind, TargetRef};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn session(id: &str, room: Option<&str>) -> GeneratedSession {
        let mut s = GeneratedSession::new(
            id,
            SessionKind::Lecture,
            TargetRef::section("S1", "Section A"),
            Weekday::Mon,
            t(8, 0),
            t(9, 30),
        );
        s.room = room.map(|r| RoomAssignment::new(r, r));
        s
    }

    #[test]
    fn test_pending_mirrors_session() {
        let r = Reservation::pending("R1", &session("S1", Some("A1")));
        assert_eq!(r.session_id, "S1");
        assert_eq!(r.room_id(), Some("A1"));
        assert_eq!(r.day, Weekday::Mon);
        assert_eq!(r.status, ReservationStatus::Pending);
        assert!(!r.is_confirmed());
    }

    #[test]
    fn test_reservation_overlap() {
        let a = Reservation::pending("R1", &session("S1", Some("A1")));
        let b = Reservation::pending("R2", &session("S2", Some("A1")));
        let c = Reservation::pending("R3", &session("S3", Some("C1")));
        let d = Reservation::pending("R4", &session("S4", None));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(!d.overlaps(&d.clone()));
    }

    #[test]
    fn test_conflict_factories() {
        let o = Conflict::overlap("C1", vec!["S1".into(), "S2".into()], "double booked");
        assert_eq!(o.kind, ConflictKind::Overlap);
        assert_eq!(o.severity, Severity::Medium);
        assert_eq!(o.remedy.as_deref(), Some(OVERLAP_REMEDY));
        assert!(o.involves("S2"));
        assert!(!o.involves("S3"));

        let c = Conflict::capacity("C2", "S1", "too small");
        assert_eq!(c.kind, ConflictKind::Capacity);
        assert_eq!(c.severity, Severity::High);

        let e = Conflict::equipment("C3", "S1", "no workstations");
        assert_eq!(e.kind, ConflictKind::Equipment);
        assert_eq!(e.severity, Severity::Low);
    }

    #[test]
    fn test_serde_labels() {
        let json = serde_json::to_string(&ReservationStatus::Conflict).unwrap();
        assert_eq!(json, "\"conflict\"");
        let json = serde_json::to_string(&ConflictKind::Overlap).unwrap();
        assert_eq!(json, "\"overlap\"");
    }
}
