//! Reservation commit.
//!
//! Binds every generated session to its room and time slot, detecting
//! double bookings, undersized rooms and missing equipment. Conflicts
//! are result data for an administrator to act on, never errors.

mod committer;

pub use committer::{CommitterState, ReservationCommitter};
