//! Generated session model.
//!
//! A generated session is one scheduled teaching event: a lecture for a
//! whole section, or a seminar/practical for a single group. It is the
//! central mutable unit of the workflow: the generator creates it, the
//! validation manager approves or reschedules it, and the reservation
//! committer turns it into a room booking.
//!
//! Any change to day, time or room clears the validation flag; use
//! [`GeneratedSession::reschedule`] or [`GeneratedSession::exchange_slot`]
//! rather than writing those fields directly.

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::calendar::intervals_overlap;

/// Teaching format of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// Whole-section lecture.
    Lecture,
    /// Group seminar (tutorial).
    Seminar,
    /// Group practical (lab work).
    Practical,
}

/// What a session is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Section,
    Group,
}

/// Reference to the section or group attending a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetRef {
    /// Section or group.
    pub kind: TargetKind,
    /// Section or group id.
    pub id: String,
    /// Display name (e.g., "Section A" or "Section A / G2").
    pub name: String,
}

/// Room bound to a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomAssignment {
    /// Infrastructure id.
    pub id: String,
    /// Infrastructure display name.
    pub name: String,
}

/// A scheduled teaching event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSession {
    /// Unique session identifier.
    pub id: String,
    /// Teaching format.
    pub kind: SessionKind,
    /// Subject label.
    pub subject: String,
    /// Instructor label.
    pub instructor: String,
    /// Attending section or group.
    pub target: TargetRef,
    /// Day of week.
    pub day: Weekday,
    /// Start time (inclusive).
    pub start: NaiveTime,
    /// End time (exclusive).
    pub end: NaiveTime,
    /// Assigned room. `None` = room unassigned.
    pub room: Option<RoomAssignment>,
    /// Equipment the room must provide.
    pub required_equipment: BTreeSet<String>,
    /// Whether an administrator approved the session.
    pub validated: bool,
}

impl TargetRef {
    /// References a whole section.
    pub fn section(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Section,
            id: id.into(),
            name: name.into(),
        }
    }

    /// References a single group.
    pub fn group(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Group,
            id: id.into(),
            name: name.into(),
        }
    }
}

impl RoomAssignment {
    /// Creates a room assignment.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl GeneratedSession {
    /// Creates an unvalidated session with no room.
    pub fn new(
        id: impl Into<String>,
        kind: SessionKind,
        target: TargetRef,
        day: Weekday,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            subject: String::new(),
            instructor: String::new(),
            target,
            day,
            start,
            end,
            room: None,
            required_equipment: BTreeSet::new(),
            validated: false,
        }
    }

    /// Sets the subject label.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the instructor label.
    pub fn with_instructor(mut self, instructor: impl Into<String>) -> Self {
        self.instructor = instructor.into();
        self
    }

    /// Sets the room.
    pub fn with_room(mut self, room: RoomAssignment) -> Self {
        self.room = Some(room);
        self
    }

    /// Adds a required equipment tag.
    pub fn with_required_equipment(mut self, tag: impl Into<String>) -> Self {
        self.required_equipment.insert(tag.into());
        self
    }

    /// Whether no room is assigned.
    pub fn is_unassigned(&self) -> bool {
        self.room.is_none()
    }

    /// Assigned room id, if any.
    pub fn room_id(&self) -> Option<&str> {
        self.room.as_ref().map(|r| r.id.as_str())
    }

    /// Session length in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether two sessions occupy intersecting time on the same day.
    pub fn time_overlaps(&self, other: &Self) -> bool {
        self.day == other.day && intervals_overlap(self.start, self.end, other.start, other.end)
    }

    /// Whether two sessions hold the same room at intersecting times.
    pub fn room_overlaps(&self, other: &Self) -> bool {
        match (self.room_id(), other.room_id()) {
            (Some(a), Some(b)) => a == b && self.time_overlaps(other),
            _ => false,
        }
    }

    /// Moves the session; clears the validation flag.
    pub fn reschedule(
        &mut self,
        day: Weekday,
        start: NaiveTime,
        end: NaiveTime,
        room: Option<RoomAssignment>,
    ) {
        self.day = day;
        self.start = start;
        self.end = end;
        self.room = room;
        self.validated = false;
    }

    /// Exchanges day, times and room with `other`; clears both validation flags.
    pub fn exchange_slot(&mut self, other: &mut Self) {
        std::mem::swap(&mut self.day, &mut other.day);
        std::mem::swap(&mut self.start, &mut other.start);
        std::mem::swap(&mut self.end, &mut other.end);
        std::mem::swap(&mut self.room, &mut other.room);
        self.validated = false;
        other.validated = false;
    }

    /// Sort key: weekday, then start time, then id.
    pub fn chronological_key(&self) -> (u32, NaiveTime, &str) {
        (self.day.num_days_from_monday(), self.start, self.id.as_str())
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Lecture => "Lecture",
            Self::Seminar => "Seminar",
            Self::Practical => "Practical",
        };
        f.write_str(label)
    }
}
