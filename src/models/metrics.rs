//! Optimization metrics snapshot.

use serde::{Deserialize, Serialize};

/// Four schedule quality scores, each a percentage in `[0, 100]`.
///
/// | Metric | Meaning |
/// |--------|---------|
/// | Time efficiency | Little idle time between a target's sessions on a day |
/// | Room utilization | Share of grid slots each selected room is occupied |
/// | Conflict reduction | Share of targets with no overlapping session |
/// | Workload balance | Even session counts across instructors |
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OptimizationMetrics {
    pub time_efficiency: f64,
    pub room_utilization: f64,
    pub conflict_reduction: f64,
    pub workload_balance: f64,
}

/// Tolerance for metric comparisons.
pub const METRIC_EPSILON: f64 = 1e-9;

impl OptimizationMetrics {
    /// Creates a snapshot; every score is clamped to `[0, 100]`.
    pub fn new(
        time_efficiency: f64,
        room_utilization: f64,
        conflict_reduction: f64,
        workload_balance: f64,
    ) -> Self {
        Self {
            time_efficiency,
            room_utilization,
            conflict_reduction,
            workload_balance,
        }
        .clamped()
    }

    /// Returns a copy with every score clamped to `[0, 100]` (NaN → 0).
    pub fn clamped(self) -> Self {
        let clamp = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 100.0) };
        Self {
            time_efficiency: clamp(self.time_efficiency),
            room_utilization: clamp(self.room_utilization),
            conflict_reduction: clamp(self.conflict_reduction),
            workload_balance: clamp(self.workload_balance),
        }
    }

    /// Scores in declaration order.
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.time_efficiency,
            self.room_utilization,
            self.conflict_reduction,
            self.workload_balance,
        ]
    }

    /// Sum of all four scores.
    pub fn total(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// Whether no score is lower than in `other`.
    pub fn weakly_dominates(&self, other: &Self) -> bool {
        self.as_array()
            .iter()
            .zip(other.as_array().iter())
            .all(|(a, b)| *a + METRIC_EPSILON >= *b)
    }

    /// Whether this snapshot weakly dominates `other` and is strictly better in total.
    pub fn improves_on(&self, other: &Self) -> bool {
        self.weakly_dominates(other) && self.total() > other.total() + METRIC_EPSILON
    }
}
