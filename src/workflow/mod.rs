//! Workflow orchestration.
//!
//! A run moves through six ordered stages. Each stage has a completion
//! predicate that gates `advance()`; `retreat()` is always allowed and
//! keeps every result produced so far.
//!
//! | # | Stage | Produces |
//! |---|-------|----------|
//! | 1 | FormationSelection | formation with sections and groups |
//! | 2 | InfrastructureSelection | selected rooms |
//! | 3 | Generation | sessions |
//! | 4 | Validation | validated sessions |
//! | 5 | Optimization | metrics and an optional proposal |
//! | 6 | Reservation | reservations and conflicts |
//!
//! # Components
//!
//! - [`Stage`]: stage enum and completion predicates
//! - [`WorkflowState`]: data produced by a run
//! - [`WorkflowEngine`]: operations over the state

mod engine;
mod stage;
mod state;

pub use engine::WorkflowEngine;
pub use stage::{
    formation_selected, infrastructure_selected, sessions_generated, sessions_validated, Stage,
};
pub use state::WorkflowState;
