//! Academic timetable workflow engine.
//!
//! Takes a formation offer (a program with lecture sections split into
//! seminar/practical groups) and a pool of teaching rooms through a
//! staged workflow that ends in committed room reservations.
//!
//! # Modules
//!
//! | Module | Role |
//! |--------|------|
//! | [`models`] | Domain types: formations, rooms, sessions, reservations, metrics |
//! | [`catalog`] | Read-only formation and room lookup |
//! | [`configuration`] | Section and group editing |
//! | [`allocation`] | Room selection for a run |
//! | [`generator`] | Sessions from structure and rooms |
//! | [`review`] | Session approval and manual swaps |
//! | [`optimization`] | Four-metric scoring and local search |
//! | [`reservation`] | Conflict-aware reservation commit |
//! | [`workflow`] | Stage machine and orchestrator |
//! | [`settings`] | Grid, room and optimizer settings (TOML) |
//! | [`validation`] | Structural integrity checks |
//! | [`progress`] | Progress reporting for long operations |
//! | [`error`] | Error taxonomy |
//!
//! # Quick Start
//!
//! ```
//! use u_timetable::catalog::InMemoryCatalog;
//! use u_timetable::models::{FormationOffer, Group, Infrastructure, Section};
//! use u_timetable::settings::WorkflowSettings;
//! use u_timetable::workflow::WorkflowEngine;
//!
//! let catalog = InMemoryCatalog::new()
//!     .with_formation(FormationOffer::new("F1", "Biology").with_section(
//!         Section::new("F1-S1", 1, "Section A")
//!             .with_group(Group::new("F1-S1-G1", 1, 24, 1, 24)),
//!     ))
//!     .with_infrastructure(Infrastructure::classroom("C1").with_capacity(30));
//!
//! let mut engine = WorkflowEngine::new(catalog, WorkflowSettings::default()).unwrap();
//! engine.select_formation("F1", Vec::new()).unwrap();
//! engine.select_infrastructures(&["C1"]).unwrap();
//! assert_eq!(engine.generate_sessions().unwrap(), 3);
//! ```
//!
//! # Concurrency
//!
//! The engine is single-threaded: every operation takes `&mut self` and
//! runs to completion, so the reservation overlap check cannot race.

pub mod allocation;
pub mod catalog;
pub mod configuration;
pub mod error;
pub mod generator;
pub mod models;
pub mod optimization;
pub mod progress;
pub mod reservation;
pub mod review;
pub mod settings;
pub mod validation;
pub mod workflow;

pub use error::{Result, WorkflowError};
pub use settings::WorkflowSettings;
pub use workflow::{Stage, WorkflowEngine, WorkflowState};
