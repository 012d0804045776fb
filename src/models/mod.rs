//! Timetabling domain models.
//!
//! Provides the core data types for describing a formation's structure,
//! the rooms available to it, and the sessions, reservations and
//! conflicts a workflow run produces.
//!
//! # Domain Mappings
//!
//! | u-timetable | Scheduling term | Example |
//! |-------------|-----------------|---------|
//! | FormationOffer | Problem instance | "Computer Science, L2" |
//! | Section / Group | Task owner | Lecture cohort / lab group |
//! | GeneratedSession | Activity assignment | Monday 08:00 seminar in C101 |
//! | Infrastructure | Resource | Amphi A, Lab 3 |
//! | Reservation | Resource booking | C101 held Monday 08:00-09:30 |
//! | Conflict | Violation | Double booking of C101 |

mod calendar;
mod formation;
mod infrastructure;
mod metrics;
mod reservation;
mod session;

pub use calendar::{intervals_overlap, Slot, TimeBand, WeeklyGrid};
pub use formation::{FormationOffer, Group, Section};
pub use infrastructure::{Infrastructure, InfrastructureCategory};
pub use metrics::{OptimizationMetrics, METRIC_EPSILON};
pub use reservation::{
    Conflict, ConflictKind, Reservation, ReservationStatus, Severity, OVERLAP_REMEDY,
};
pub use session::{GeneratedSession, RoomAssignment, SessionKind, TargetKind, TargetRef};
