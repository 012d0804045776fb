//! Session generation.
//!
//! Expands a formation's sections and groups, together with the selected
//! rooms, into [`GeneratedSession`](crate::models::GeneratedSession)s:
//!
//! | Target | Sessions |
//! |--------|----------|
//! | Section | 1 lecture |
//! | Group | 1 seminar + 1 practical |
//!
//! Generation never guarantees cross-target conflict freedom; double
//! bookings surface when reservations are committed.

mod rooms;
mod session_generator;

pub use rooms::{is_eligible, rank_rooms};
pub use session_generator::SessionGenerator;
