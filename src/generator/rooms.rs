//! Room eligibility and preference.
//!
//! | Session | Eligible rooms | Preference (first wins) |
//! |---------|----------------|-------------------------|
//! | Lecture | lecture categories with capacity ≥ section size | smallest capacity |
//! | Seminar | capacity ≥ group size | classroom, then laboratory, smallest capacity |
//! | Practical | capacity ≥ group size | fully equipped, laboratory, then classroom, smallest capacity |
//!
//! Lectures take the smallest fitting large room, not the first one in
//! pool order.
//! Ties keep pool order, so ranking is deterministic.

use std::collections::BTreeSet;

use crate::models::{Infrastructure, InfrastructureCategory, SessionKind};

/// Returns the rooms that can host a session, best first.
pub fn rank_rooms<'a>(
    rooms: &'a [Infrastructure],
    kind: SessionKind,
    size: i32,
    required_equipment: &BTreeSet<String>,
    lecture_categories: &[InfrastructureCategory],
) -> Vec<&'a Infrastructure> {
    let mut ranked: Vec<(usize, &Infrastructure)> = rooms
        .iter()
        .enumerate()
        .filter(|(_, room)| is_eligible(room, kind, size, lecture_categories))
        .collect();

    ranked.sort_by_key(|(index, room)| {
        let (first, second) = match kind {
            SessionKind::Lecture => (0, 0),
            SessionKind::Seminar => (seminar_rank(room.category), 0),
            SessionKind::Practical => (
                u8::from(!room.has_equipment(required_equipment)),
                practical_rank(room.category),
            ),
        };
        (first, second, room.capacity, *index)
    });

    ranked.into_iter().map(|(_, room)| room).collect()
}

fn seminar_rank(category: InfrastructureCategory) -> u8 {
    match category {
        InfrastructureCategory::Classroom => 0,
        InfrastructureCategory::Laboratory => 1,
        InfrastructureCategory::Amphitheater => 2,
    }
}

fn practical_rank(category: InfrastructureCategory) -> u8 {
    match category {
        InfrastructureCategory::Laboratory => 0,
        InfrastructureCategory::Classroom => 1,
        InfrastructureCategory::Amphitheater => 2,
    }
}

/// Whether a room can host a session of `kind` for `size` students.
pub fn is_eligible(
    room: &Infrastructure,
    kind: SessionKind,
    size: i32,
    lecture_categories: &[InfrastructureCategory],
) -> bool {
    if !room.fits(size) {
        return false;
    }
    match kind {
        SessionKind::Lecture => lecture_categories.contains(&room.category),
        SessionKind::Seminar | SessionKind::Practical => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LECTURE: &[InfrastructureCategory] = &[
        InfrastructureCategory::Amphitheater,
        InfrastructureCategory::Classroom,
    ];

    fn pool() -> Vec<Infrastructure> {
        vec![
            Infrastructure::amphitheater("A1").with_capacity(200),
            Infrastructure::classroom("C1").with_capacity(40),
            Infrastructure::classroom("C2").with_capacity(35),
            Infrastructure::laboratory("L1").with_capacity(30),
            Infrastructure::laboratory("L2")
                .with_capacity(32)
                .with_equipment("workstations"),
        ]
    }

    fn ids(rooms: Vec<&Infrastructure>) -> Vec<&str> {
        rooms.into_iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_lecture_ranking() {
        let rooms = pool();
        let none = BTreeSet::new();
        // Labs never host lectures; smallest fitting room first
        let ranked = ids(rank_rooms(&rooms, SessionKind::Lecture, 30, &none, LECTURE));
        assert_eq!(ranked, vec!["C2", "C1", "A1"]);
        let ranked = ids(rank_rooms(&rooms, SessionKind::Lecture, 60, &none, LECTURE));
        assert_eq!(ranked, vec!["A1"]);
        assert!(rank_rooms(&rooms, SessionKind::Lecture, 500, &none, LECTURE).is_empty());
    }

    #[test]
    fn test_seminar_prefers_classroom() {
        let rooms = pool();
        let none = BTreeSet::new();
        let ranked = ids(rank_rooms(&rooms, SessionKind::Seminar, 30, &none, LECTURE));
        assert_eq!(ranked, vec!["C2", "C1", "L1", "L2", "A1"]);
    }

    #[test]
    fn test_practical_prefers_equipped_lab() {
        let rooms = pool();
        let mut required = BTreeSet::new();
        required.insert("workstations".to_string());
        let ranked = ids(rank_rooms(&rooms, SessionKind::Practical, 30, &required, LECTURE));
        assert_eq!(ranked[0], "L2");
        assert_eq!(ranked[1], "L1");

        let none = BTreeSet::new();
        let ranked = ids(rank_rooms(&rooms, SessionKind::Practical, 30, &none, LECTURE));
        assert_eq!(ranked, vec!["L1", "L2", "C2", "C1", "A1"]);
    }

    #[test]
    fn test_is_eligible() {
        let lab = Infrastructure::laboratory("L1").with_capacity(30);
        assert!(!is_eligible(&lab, SessionKind::Lecture, 10, LECTURE));
        assert!(is_eligible(&lab, SessionKind::Practical, 30, LECTURE));
        assert!(!is_eligible(&lab, SessionKind::Seminar, 31, LECTURE));
    }
}
