//! Optimization scoring.
//!
//! An optional stage: score the current sessions, search for a better
//! arrangement, then let the caller apply or discard the proposal.
//!
//! # Components
//!
//! - [`MetricsCalculator`]: deterministic four-metric scoring
//! - [`ScheduleOptimizer`]: seeded local search producing an [`OptimizationProposal`]
//!
//! A proposal never scores lower than its baseline on any metric.

mod metrics;
mod optimizer;

pub use metrics::{
    conflict_reduction, room_utilization, time_efficiency, workload_balance, MetricsCalculator,
};
pub use optimizer::{OptimizationProposal, ScheduleOptimizer};
