//! Greedy session generator.
//!
//! # Algorithm
//!
//! 1. Section `s` (0-based) owns grid slots `3s`, `3s + 1` and `3s + 2`,
//!    wrapping around the week.
//! 2. The section lecture goes in the first slot; every group's seminar
//!    in the second and its practical in the third. A target's sessions
//!    therefore never share a slot.
//! 3. Each session takes the best-ranked eligible room not yet booked in
//!    its slot (see [`rank_rooms`](super::rank_rooms)). When every
//!    eligible room is booked the best one is reused and the double
//!    booking surfaces at commit. With no eligible room the session is
//!    emitted unassigned.
//!
//! # Complexity
//! O(n · r log r) where n = sessions, r = rooms.

use std::collections::{BTreeSet, HashSet};

use log::{debug, info, warn};

use super::rooms::rank_rooms;
use crate::error::{Result, WorkflowError};
use crate::models::{
    FormationOffer, GeneratedSession, Infrastructure, InfrastructureCategory, RoomAssignment,
    Section, SessionKind, Slot, TargetRef, WeeklyGrid,
};
use crate::progress::{NoProgress, ProgressSink, ProgressTracker};
use crate::settings::{WorkflowSettings, MIN_GRID_SLOTS};
use crate::validation::{summarize, validate_formation};

/// Expands a formation and a room pool into generated sessions.
///
/// # Example
///
/// ```
/// use u_timetable::generator::SessionGenerator;
/// use u_timetable::models::{FormationOffer, Group, Infrastructure, Section};
///
/// let formation = FormationOffer::new("F1", "Physics").with_section(
///     Section::new("F1-S1", 1, "Section A")
///         .with_group(Group::new("F1-S1-G1", 1, 30, 1, 30)),
/// );
/// let rooms = vec![Infrastructure::amphitheater("A1").with_capacity(100)];
///
/// let sessions = SessionGenerator::new().generate(&formation, &rooms).unwrap();
/// assert_eq!(sessions.len(), 3); // Lecture, seminar, practical
/// ```
#[derive(Debug, Clone)]
pub struct SessionGenerator {
    grid: WeeklyGrid,
    lecture_categories: Vec<InfrastructureCategory>,
    practical_equipment: BTreeSet<String>,
    default_instructor: String,
}

impl SessionGenerator {
    /// Creates a generator with default settings.
    pub fn new() -> Self {
        Self::from_settings(&WorkflowSettings::default())
    }

    /// Creates a generator from engine settings.
    pub fn from_settings(settings: &WorkflowSettings) -> Self {
        Self {
            grid: settings.grid.clone(),
            lecture_categories: settings.large_room_categories.clone(),
            practical_equipment: settings.practical_equipment.iter().cloned().collect(),
            default_instructor: settings.default_instructor.clone(),
        }
    }

    /// Sets the weekly grid.
    pub fn with_grid(mut self, grid: WeeklyGrid) -> Self {
        self.grid = grid;
        self
    }

    /// Sets the equipment every practical requires.
    pub fn with_practical_equipment(mut self, tag: impl Into<String>) -> Self {
        self.practical_equipment.insert(tag.into());
        self
    }

    /// Generates sessions.
    pub fn generate(
        &self,
        formation: &FormationOffer,
        rooms: &[Infrastructure],
    ) -> Result<Vec<GeneratedSession>> {
        self.generate_with_progress(formation, rooms, &mut NoProgress)
    }

    /// Generates sessions, reporting per-section progress.
    ///
    /// # Errors
    /// - [`WorkflowError::InvalidSettings`] if the grid has fewer than three slots
    /// - [`WorkflowError::InvalidStructure`] if the formation is malformed
    /// - [`WorkflowError::EmptySelection`] if `rooms` is empty
    pub fn generate_with_progress(
        &self,
        formation: &FormationOffer,
        rooms: &[Infrastructure],
        progress: &mut dyn ProgressSink,
    ) -> Result<Vec<GeneratedSession>> {
        if self.grid.len() < MIN_GRID_SLOTS {
            return Err(WorkflowError::InvalidSettings(format!(
                "grid has {} slots, at least {} required",
                self.grid.len(),
                MIN_GRID_SLOTS
            )));
        }
        validate_formation(formation)
            .map_err(|errors| WorkflowError::InvalidStructure(summarize(&errors)))?;
        if rooms.is_empty() {
            return Err(WorkflowError::EmptySelection);
        }

        let mut run = GenerationRun {
            generator: self,
            formation,
            rooms,
            booked: HashSet::new(),
            sessions: Vec::new(),
            next_instructor: 0,
        };
        let mut tracker = ProgressTracker::new(progress, formation.sections.len());
        tracker.update(0);

        for (index, section) in formation.sections.iter().enumerate() {
            run.emit_section(index, section)?;
            tracker.update(index + 1);
        }
        tracker.finish();

        let unassigned = run.sessions.iter().filter(|s| s.is_unassigned()).count();
        if unassigned > 0 {
            warn!("{} generated sessions have no room", unassigned);
        }
        info!(
            "Generated {} sessions for formation {} ({} sections, {} rooms)",
            run.sessions.len(),
            formation.id,
            formation.sections.len(),
            rooms.len()
        );
        Ok(run.sessions)
    }

    fn instructor(&self, formation: &FormationOffer, turn: usize) -> String {
        if formation.instructors.is_empty() {
            self.default_instructor.clone()
        } else {
            formation.instructors[turn % formation.instructors.len()].clone()
        }
    }
}

impl Default for SessionGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable state of one generation pass.
struct GenerationRun<'a> {
    generator: &'a SessionGenerator,
    formation: &'a FormationOffer,
    rooms: &'a [Infrastructure],
    /// (room id, grid slot) pairs already taken.
    booked: HashSet<(String, usize)>,
    sessions: Vec<GeneratedSession>,
    next_instructor: usize,
}

impl GenerationRun<'_> {
    fn emit_section(&mut self, index: usize, section: &Section) -> Result<()> {
        let base = index * 3;
        let lecture_slot = self.slot(base)?;
        let seminar_slot = self.slot(base + 1)?;
        let practical_slot = self.slot(base + 2)?;

        let target = TargetRef::section(&section.id, &section.name);
        self.emit(SessionKind::Lecture, target, section.roster_size(), lecture_slot);

        for group in &section.groups {
            let name = format!("{} / {}", section.name, group.label());
            let target = TargetRef::group(&group.id, &name);
            self.emit(SessionKind::Seminar, target.clone(), group.capacity, seminar_slot);
            self.emit(SessionKind::Practical, target, group.capacity, practical_slot);
        }
        Ok(())
    }

    fn slot(&self, index: usize) -> Result<Slot> {
        self.generator
            .grid
            .slot(index)
            .ok_or_else(|| WorkflowError::InvalidSettings("grid has no slots".to_string()))
    }

    fn emit(&mut self, kind: SessionKind, target: TargetRef, size: i32, slot: Slot) {
        let id = format!("SES-{:04}", self.sessions.len() + 1);
        let required = match kind {
            SessionKind::Practical => self.generator.practical_equipment.clone(),
            SessionKind::Lecture | SessionKind::Seminar => BTreeSet::new(),
        };

        let ranked = rank_rooms(
            self.rooms,
            kind,
            size,
            &required,
            &self.generator.lecture_categories,
        );
        let room = match ranked
            .iter()
            .find(|room| !self.booked.contains(&(room.id.clone(), slot.index)))
        {
            Some(room) => Some(*room),
            None => {
                if let Some(room) = ranked.first() {
                    debug!(
                        "{}: every eligible room is booked in slot {}, reusing {}",
                        id, slot.index, room.id
                    );
                }
                ranked.first().copied()
            }
        };
        if room.is_none() {
            warn!("{}: no room fits {} students for {} {}", id, size, kind, target.name);
        }

        let instructor = self.generator.instructor(self.formation, self.next_instructor);
        self.next_instructor += 1;

        let mut session = GeneratedSession::new(
            id,
            kind,
            target,
            slot.day,
            slot.band.start,
            slot.band.end,
        )
        .with_subject(format!("{} ({})", self.formation.name, kind))
        .with_instructor(instructor);
        session.required_equipment = required;

        if let Some(room) = room {
            self.booked.insert((room.id.clone(), slot.index));
            session = session.with_room(RoomAssignment::new(&room.id, room.display_name()));
        }
        debug!(
            "{} {} for {} on {:?} {} in {}",
            session.id,
            kind,
            session.target.name,
            session.day,
            session.start,
            session.room_id().unwrap_or("(unassigned)")
        );
        self.sessions.push(session);
    }
}
