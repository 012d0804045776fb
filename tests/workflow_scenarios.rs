//! End-to-end workflow scenarios.

use chrono::{NaiveTime, Weekday};
use u_timetable::catalog::InMemoryCatalog;
use u_timetable::models::{
    ConflictKind, FormationOffer, GeneratedSession, Group, Infrastructure, ReservationStatus,
    RoomAssignment, Section, SessionKind, TargetRef,
};
use u_timetable::reservation::{CommitterState, ReservationCommitter};
use u_timetable::settings::WorkflowSettings;
use u_timetable::workflow::{Stage, WorkflowEngine};
use u_timetable::WorkflowError;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn formation() -> FormationOffer {
    FormationOffer::new("F1", "Computer Science")
        .with_level("L2")
        .with_section(
            Section::new("F1-S1", 1, "Section A")
                .with_group(Group::new("F1-S1-G1", 1, 30, 1, 30))
                .with_group(Group::new("F1-S1-G2", 2, 30, 31, 60)),
        )
}

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_formation(formation())
        .with_infrastructure(Infrastructure::amphitheater("AMPHI").with_capacity(200))
        .with_infrastructure(Infrastructure::classroom("C-A").with_capacity(40))
        .with_infrastructure(Infrastructure::classroom("C-B").with_capacity(40))
}

fn engine_at_reservation() -> WorkflowEngine<InMemoryCatalog> {
    let mut engine = WorkflowEngine::new(catalog(), WorkflowSettings::default()).unwrap();
    engine.select_formation("F1", Vec::new()).unwrap();
    assert!(engine.advance());
    engine.select_infrastructures(&["AMPHI", "C-A", "C-B"]).unwrap();
    assert!(engine.advance());
    engine.generate_sessions().unwrap();
    assert!(engine.advance());
    engine.validate_all_sessions();
    assert!(engine.advance());
    assert!(engine.advance());
    assert_eq!(engine.stage(), Stage::Reservation);
    engine
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn three_room_pool_confirms_every_session() {
    init_logger();
    let mut engine = engine_at_reservation();

    let sessions = &engine.state().sessions;
    assert_eq!(sessions.len(), 5);
    let count = |kind: SessionKind| sessions.iter().filter(|s| s.kind == kind).count();
    assert_eq!(count(SessionKind::Lecture), 1);
    assert_eq!(count(SessionKind::Seminar), 2);
    assert_eq!(count(SessionKind::Practical), 2);
    assert!(sessions.iter().all(|s| !s.is_unassigned()));

    let state = engine.commit_reservations().unwrap();
    assert_eq!(state, CommitterState::AllConfirmed);
    assert_eq!(engine.state().reservations().len(), 5);
    assert!(engine
        .state()
        .reservations()
        .iter()
        .all(|r| r.status == ReservationStatus::Confirmed));
    assert!(engine.state().open_conflicts().is_empty());
}

#[test]
fn identical_slots_yield_one_overlap_conflict() {
    init_logger();
    let formation = formation();
    let rooms = vec![Infrastructure::classroom("C-A").with_capacity(40).selected()];
    let session = |id: &str, group: &str| {
        GeneratedSession::new(
            id,
            SessionKind::Seminar,
            TargetRef::group(group, group),
            Weekday::Tue,
            time(9, 45),
            time(11, 15),
        )
        .with_room(RoomAssignment::new("C-A", "C-A"))
    };
    let sessions = vec![session("SES-0001", "F1-S1-G1"), session("SES-0002", "F1-S1-G2")];

    let mut committer = ReservationCommitter::new();
    let state = committer.commit(&formation, &sessions, &rooms).unwrap();
    assert_eq!(state, CommitterState::PartiallyConflicted);

    let conflicts = committer.open_conflicts();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].kind, ConflictKind::Overlap);
    assert!(conflicts[0].involves("SES-0001"));
    assert!(conflicts[0].involves("SES-0002"));

    let confirmed = committer.reservations_with_status(ReservationStatus::Confirmed);
    let conflicted = committer.reservations_with_status(ReservationStatus::Conflict);
    assert_eq!(confirmed.len(), 1);
    assert_eq!(conflicted.len(), 1);
}

#[test]
fn recommit_after_cancel_is_deterministic() {
    let mut engine = WorkflowEngine::new(catalog(), WorkflowSettings::default()).unwrap();
    engine.select_formation("F1", Vec::new()).unwrap();
    // Single classroom: the group sessions double-book it
    engine.select_infrastructures(&["C-A"]).unwrap();
    engine.generate_sessions().unwrap();

    engine.commit_reservations().unwrap();
    let first = engine.state().committer.clone();
    assert_eq!(first.state(), CommitterState::PartiallyConflicted);

    engine.cancel_all_reservations().unwrap();
    assert_eq!(engine.state().committer_state(), CommitterState::NotStarted);
    assert!(engine.state().reservations().is_empty());

    engine.commit_reservations().unwrap();
    assert_eq!(engine.state().committer, first);
    assert_eq!(
        engine.state().open_conflicts().len(),
        first.open_conflicts().len()
    );
}

#[test]
fn validation_stage_gates_on_every_session() {
    let mut engine = WorkflowEngine::new(catalog(), WorkflowSettings::default()).unwrap();
    engine.select_formation("F1", Vec::new()).unwrap();
    assert!(engine.advance());
    engine.select_infrastructures(&["AMPHI", "C-A", "C-B"]).unwrap();
    assert!(engine.advance());
    assert!(!engine.advance());
    engine.generate_sessions().unwrap();
    assert!(engine.advance());
    assert_eq!(engine.stage(), Stage::Validation);

    let ids: Vec<String> = engine.state().sessions.iter().map(|s| s.id.clone()).collect();
    for id in &ids {
        assert_eq!(engine.state().all_validated(), engine.can_advance());
        assert!(!engine.advance());
        engine.validate_session(id).unwrap();
    }
    assert!(engine.state().all_validated());

    // A swap forces re-validation of both sessions
    engine.swap_sessions(&ids[1], &ids[2]).unwrap();
    assert!(!engine.advance());
    engine.swap_sessions(&ids[1], &ids[2]).unwrap();
    engine.validate_all_sessions();
    assert!(engine.advance());
    assert_eq!(engine.stage(), Stage::Optimization);
}

#[test]
fn optimization_never_lowers_a_metric() {
    let mut engine = WorkflowEngine::new(catalog(), WorkflowSettings::default()).unwrap();
    engine.select_formation("F1", Vec::new()).unwrap();
    engine.select_infrastructures(&["AMPHI", "C-A"]).unwrap();
    engine.generate_sessions().unwrap();

    let before = engine.current_metrics();
    let proposal = engine.run_optimization().unwrap().clone();
    assert_eq!(proposal.baseline, before);
    assert!(proposal.proposed.weakly_dominates(&before));

    let after = engine.apply_optimization().unwrap();
    assert!(after.weakly_dominates(&before));
    assert!(engine.current_metrics().weakly_dominates(&before));
    for score in after.as_array() {
        assert!((0.0..=100.0).contains(&score));
    }
    assert!(engine.check_integrity().is_ok());
}

#[test]
fn retreat_keeps_downstream_data() {
    let mut engine = engine_at_reservation();
    engine.commit_reservations().unwrap();
    let sessions = engine.state().sessions.clone();

    assert!(engine.retreat());
    assert!(engine.retreat());
    assert_eq!(engine.stage(), Stage::Validation);
    assert_eq!(engine.state().sessions, sessions);
    assert_eq!(engine.state().reservations().len(), 5);

    // Regeneration is what discards downstream products
    engine.generate_sessions().unwrap();
    assert!(engine.state().reservations().is_empty());
    assert!(!engine.state().all_validated());
}

#[test]
fn dangling_targets_surface_as_errors() {
    let mut engine = engine_at_reservation();
    engine
        .configure_formation(|config| config.remove_group("F1-S1", "F1-S1-G1"))
        .unwrap();

    let err = engine.commit_reservations().unwrap_err();
    assert!(matches!(err, WorkflowError::DanglingReference { .. }));
    assert_eq!(engine.state().committer_state(), CommitterState::NotStarted);
    assert!(engine.check_integrity().is_err());

    engine.generate_sessions().unwrap();
    assert!(engine.check_integrity().is_ok());
    assert_eq!(engine.state().sessions.len(), 3);
}
