//! Schedule quality metrics.
//!
//! Computes the four optimization scores from a session set, the
//! selected rooms and the weekly grid.
//!
//! # Metrics
//!
//! | Metric | Definition | Empty input |
//! |--------|------------|-------------|
//! | Time efficiency | mean over (target, day) of busy minutes / span minutes | 100 |
//! | Room utilization | mean over rooms of occupied grid slots / grid slots | 0 |
//! | Conflict reduction | targets without overlapping sessions / targets | 100 |
//! | Workload balance | 1 - stddev / mean of sessions per instructor | 100 |
//!
//! All scores are percentages clamped to `[0, 100]`. Every aggregate is
//! built over ordered maps, so equal inputs always give equal scores.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{GeneratedSession, Infrastructure, OptimizationMetrics, WeeklyGrid};

/// Computes [`OptimizationMetrics`] snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Scores a session set.
    ///
    /// # Arguments
    /// * `sessions` - Sessions to score.
    /// * `rooms` - Selected rooms; utilization averages over these.
    /// * `grid` - Weekly grid; utilization counts slots of this grid.
    pub fn calculate(
        sessions: &[GeneratedSession],
        rooms: &[Infrastructure],
        grid: &WeeklyGrid,
    ) -> OptimizationMetrics {
        OptimizationMetrics::new(
            time_efficiency(sessions),
            room_utilization(sessions, rooms, grid),
            conflict_reduction(sessions),
            workload_balance(sessions),
        )
    }
}

/// Busy time over span per target and day, averaged.
pub fn time_efficiency(sessions: &[GeneratedSession]) -> f64 {
    let mut days: BTreeMap<(&str, u32), Vec<&GeneratedSession>> = BTreeMap::new();
    for session in sessions {
        days.entry((session.target.id.as_str(), session.day.num_days_from_monday()))
            .or_default()
            .push(session);
    }
    if days.is_empty() {
        return 100.0;
    }

    let mut total = 0.0;
    for day_sessions in days.values() {
        let busy: i64 = day_sessions.iter().map(|s| s.duration_minutes().max(0)).sum();
        let first = day_sessions.iter().map(|s| s.start).min();
        let last = day_sessions.iter().map(|s| s.end).max();
        let span = match (first, last) {
            (Some(first), Some(last)) => (last - first).num_minutes(),
            _ => 0,
        };
        total += if span <= 0 {
            1.0
        } else {
            (busy as f64 / span as f64).min(1.0)
        };
    }
    total / days.len() as f64 * 100.0
}

/// Occupied grid slots per room, averaged over the rooms.
pub fn room_utilization(
    sessions: &[GeneratedSession],
    rooms: &[Infrastructure],
    grid: &WeeklyGrid,
) -> f64 {
    if rooms.is_empty() || grid.is_empty() {
        return 0.0;
    }

    let mut occupied: BTreeMap<&str, BTreeSet<usize>> = BTreeMap::new();
    for session in sessions {
        let slot = grid.index_of(session.day, session.start);
        if let (Some(room_id), Some(slot)) = (session.room_id(), slot) {
            occupied.entry(room_id).or_default().insert(slot);
        }
    }

    let slots = grid.len() as f64;
    let total: f64 = rooms
        .iter()
        .map(|room| {
            let used = occupied.get(room.id.as_str()).map_or(0, BTreeSet::len);
            (used as f64 / slots).min(1.0)
        })
        .sum();
    total / rooms.len() as f64 * 100.0
}

/// Share of targets whose sessions neither double-book a room nor
/// overlap each other.
pub fn conflict_reduction(sessions: &[GeneratedSession]) -> f64 {
    let mut targets: BTreeMap<&str, bool> = BTreeMap::new();
    for session in sessions {
        targets.entry(session.target.id.as_str()).or_insert(true);
    }
    if targets.is_empty() {
        return 100.0;
    }

    for (i, a) in sessions.iter().enumerate() {
        for b in &sessions[i + 1..] {
            let clash = a.room_overlaps(b) || (a.target.id == b.target.id && a.time_overlaps(b));
            if clash {
                targets.insert(a.target.id.as_str(), false);
                targets.insert(b.target.id.as_str(), false);
            }
        }
    }

    let clean = targets.values().filter(|ok| **ok).count();
    clean as f64 / targets.len() as f64 * 100.0
}

/// Evenness of session counts across instructors.
pub fn workload_balance(sessions: &[GeneratedSession]) -> f64 {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for session in sessions.iter().filter(|s| !s.instructor.is_empty()) {
        *counts.entry(session.instructor.as_str()).or_insert(0) += 1;
    }
    if counts.len() <= 1 {
        return 100.0;
    }

    let n = counts.len() as f64;
    let mean = counts.values().sum::<usize>() as f64 / n;
    let variance = counts
        .values()
        .map(|&c| (c as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    (1.0 - variance.sqrt() / mean) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RoomAssignment, SessionKind, TargetRef};
    use chrono::{NaiveTime, Weekday};

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn session(
        id: &str,
        target: &str,
        day: Weekday,
        start: NaiveTime,
        end: NaiveTime,
        room: &str,
    ) -> GeneratedSession {
        GeneratedSession::new(
            id,
            SessionKind::Seminar,
            TargetRef::group(target, target),
            day,
            start,
            end,
        )
        .with_room(RoomAssignment::new(room, room))
    }

    #[test]
    fn test_empty_defaults() {
        let grid = WeeklyGrid::default();
        let m = MetricsCalculator::calculate(&[], &[], &grid);
        assert_eq!(m.time_efficiency, 100.0);
        assert_eq!(m.room_utilization, 0.0);
        assert_eq!(m.conflict_reduction, 100.0);
        assert_eq!(m.workload_balance, 100.0);
    }

    #[test]
    fn test_time_efficiency_gap() {
        // Busy 180 of a 195-minute span
        let sessions = vec![
            session("S1", "G1", Weekday::Mon, t(9, 45), t(11, 15), "R1"),
            session("S2", "G1", Weekday::Mon, t(11, 30), t(13, 0), "R1"),
        ];
        let expected = 180.0 / 195.0 * 100.0;
        assert!((time_efficiency(&sessions) - expected).abs() < 1e-9);

        // Back-to-back sessions waste nothing
        let tight = vec![
            session("S1", "G1", Weekday::Mon, t(8, 0), t(9, 30), "R1"),
            session("S2", "G1", Weekday::Mon, t(9, 30), t(11, 0), "R1"),
        ];
        assert!((time_efficiency(&tight) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_room_utilization() {
        let grid = WeeklyGrid::default(); // 25 slots
        let rooms = vec![
            Infrastructure::classroom("R1").with_capacity(30),
            Infrastructure::classroom("R2").with_capacity(30),
        ];
        let sessions = vec![
            session("S1", "G1", Weekday::Mon, t(8, 0), t(9, 30), "R1"),
            session("S2", "G2", Weekday::Tue, t(8, 0), t(9, 30), "R1"),
            // Same slot twice counts once
            session("S3", "G3", Weekday::Tue, t(8, 0), t(9, 30), "R1"),
            // Off-grid start is not counted
            session("S4", "G4", Weekday::Mon, t(7, 0), t(7, 50), "R2"),
        ];
        let expected = (2.0 / 25.0 + 0.0) / 2.0 * 100.0;
        assert!((room_utilization(&sessions, &rooms, &grid) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_conflict_reduction() {
        let sessions = vec![
            session("S1", "G1", Weekday::Mon, t(8, 0), t(9, 30), "R1"),
            session("S2", "G2", Weekday::Mon, t(8, 0), t(9, 30), "R1"),
            session("S3", "G3", Weekday::Mon, t(8, 0), t(9, 30), "R2"),
            session("S4", "G4", Weekday::Tue, t(8, 0), t(9, 30), "R3"),
        ];
        // G1 and G2 share R1
        assert!((conflict_reduction(&sessions) - 50.0).abs() < 1e-9);

        let same_target = vec![
            session("S1", "G1", Weekday::Mon, t(8, 0), t(9, 30), "R1"),
            session("S2", "G1", Weekday::Mon, t(9, 0), t(10, 0), "R2"),
        ];
        assert_eq!(conflict_reduction(&same_target), 0.0);
    }

    #[test]
    fn test_workload_balance() {
        let mk = |id: &str, who: &str| {
            session(id, "G1", Weekday::Mon, t(8, 0), t(9, 30), "R1").with_instructor(who)
        };
        let even = vec![mk("S1", "A"), mk("S2", "B")];
        assert!((workload_balance(&even) - 100.0).abs() < 1e-9);

        // Counts 3 and 1: mean 2, stddev 1
        let skewed = vec![mk("S1", "A"), mk("S2", "A"), mk("S3", "A"), mk("S4", "B")];
        assert!((workload_balance(&skewed) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_metrics_clamped() {
        let grid = WeeklyGrid::default();
        let rooms = vec![Infrastructure::classroom("R1").with_capacity(30)];
        let sessions = vec![session("S1", "G1", Weekday::Mon, t(8, 0), t(9, 30), "R1")];
        let m = MetricsCalculator::calculate(&sessions, &rooms, &grid);
        for v in m.as_array() {
            assert!((0.0..=100.0).contains(&v));
        }
    }
}
