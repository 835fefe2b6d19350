//! Integration tests for the tournament engine over both record stores

use std::path::PathBuf;

use fencing_core::{BoutSubmission, EngineError, PlaceLabel, Stage};
use tournament::{
    EventReport, EventScript, JsonDirStore, MemoryStore, RecordStore, TournamentConfig,
    TournamentEngine, TournamentError, read_event, run_script,
};

// =============================================================================
// Helpers
// =============================================================================

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
}

fn demo_script() -> EventScript {
    EventScript::load(&demo("six_team_foil.toml")).unwrap()
}

fn demo_config() -> TournamentConfig {
    TournamentConfig::load(&demo("tournament.toml")).unwrap()
}

fn names(report: &EventReport) -> Vec<&str> {
    report.standings.iter().map(|s| s.name.as_str()).collect()
}

// =============================================================================
// Scripted events
// =============================================================================

#[test]
fn test_demo_event_in_memory() {
    let engine = TournamentEngine::new(MemoryStore::new());
    let id = run_script(&engine, &demo_script(), &demo_config()).unwrap();
    let report = EventReport::from_event(&engine.event(id).unwrap());

    assert_eq!(report.stage, Stage::Finished);
    let seeds: Vec<&str> = report.ranking.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(seeds, vec!["Paris", "Lyon", "Metz", "Lille", "Nice", "Caen"]);
    assert_eq!(
        names(&report),
        vec!["Paris", "Metz", "Lille", "Lyon", "Caen", "Nice"]
    );
    assert!(
        report
            .standings
            .iter()
            .all(|s| matches!(s.label, PlaceLabel::Outright(_)))
    );

    let event = engine.event(id).unwrap();
    let nice = event.team_by_name("Nice").unwrap();
    assert_eq!(nice.round_eliminated_in, Some(3));
    assert_eq!(nice.de_indicator, Some(6));
}

#[test]
fn test_demo_event_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonDirStore::open(dir.path()).unwrap();
    let engine = TournamentEngine::new(store);
    let id = run_script(&engine, &demo_script(), &demo_config()).unwrap();

    assert_eq!(engine.store().event_ids().unwrap(), vec![id]);
    let path = engine.store().path_for(id);
    let stored = read_event(&path).unwrap();
    assert_eq!(stored, engine.event(id).unwrap());

    let report = EventReport::from_event(&stored);
    assert_eq!(names(&report)[0], "Paris");
    let text = report.generate_report();
    assert!(text.contains("Senior Team Foil"));
    assert!(text.contains("bye"));
}

#[test]
fn test_rejected_bout_keeps_record_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let engine = TournamentEngine::new(JsonDirStore::open(dir.path()).unwrap());
    let mut script = demo_script();
    script.eliminations.clear();
    let id = run_script(&engine, &script, &demo_config()).unwrap();

    let path = engine.store().path_for(id);
    let before = std::fs::read_to_string(&path).unwrap();

    let event = engine.event(id).unwrap();
    let final_bout = event.bracket().unwrap().final_bout().unwrap().id;
    let err = engine
        .submit_bout(id, &BoutSubmission::new(final_bout, 15, 2))
        .unwrap_err();
    assert!(matches!(err, TournamentError::Engine(EngineError::NotReady(_))));

    let ready = engine.ready_bouts(id).unwrap()[0];
    let err = engine
        .submit_bout(id, &BoutSubmission::new(ready, 20, 2))
        .unwrap_err();
    assert!(matches!(err, TournamentError::Engine(EngineError::InvalidScore(_))));

    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    assert_eq!(engine.audit_log().len(), 2);
}

#[test]
fn test_bouts_fenced_from_two_threads() {
    let engine = TournamentEngine::new(MemoryStore::new());
    let mut script = demo_script();
    script.eliminations.clear();
    let id = run_script(&engine, &script, &demo_config()).unwrap();

    let first_round = engine.ready_bouts(id).unwrap();
    assert_eq!(first_round.len(), 2);
    std::thread::scope(|scope| {
        for de in first_round {
            let engine = &engine;
            scope.spawn(move || {
                engine.start_bout(id, de).unwrap();
                engine
                    .submit_bout(id, &BoutSubmission::new(de, 15, 11))
                    .unwrap();
            });
        }
    });

    // Both quarterfinal losers share a margin, so they share fifth place
    let standings = engine.standings(id).unwrap();
    assert_eq!(standings.len(), 2);
    assert!(standings.iter().all(|s| s.label == PlaceLabel::Tied(5)));
    assert_eq!(engine.ready_bouts(id).unwrap().len(), 2);
}
