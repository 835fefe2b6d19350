use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn entry(name: &str, club: Option<&str>) -> TeamEntry {
    TeamEntry {
        name: name.to_string(),
        club: club.map(str::to_string),
        fencers: [
            Some(format!("{name} A")),
            Some(format!("{name} B")),
            Some(format!("{name} C")),
            None,
        ],
        checked_in: true,
    }
}

fn event_with_teams(n: usize) -> Event {
    let mut event = Event::new("Senior Sabre", Rules::default());
    for i in 0..n {
        event.add_team(entry(&format!("T{}", i + 1), None)).unwrap();
    }
    event
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

/// Fence every bout of a pool; the team listed earlier wins 5-3
fn fence_pool(event: &mut Event, number: u32) -> PoolId {
    let pool = event.pool_by_number(number).unwrap().clone();
    for sub in &pool.sub_pools {
        for i in 0..sub.fencers.len() {
            for j in i + 1..sub.fencers.len() {
                event
                    .record_pool_bout(pool.id, sub.fencers[i], sub.fencers[j], "V", "D3")
                    .unwrap();
            }
        }
    }
    pool.id
}

/// Skip pool play and hand every team a strictly decreasing record
fn ranked_event(n: usize) -> Event {
    let mut event = event_with_teams(n);
    event.build_pools(1, &mut rng()).unwrap();
    for (i, team) in event.teams.iter_mut().enumerate() {
        team.stats = Stats {
            victories: (n - 1 - i) as u32,
            touches_scored: 0,
            touches_received: 0,
        };
    }
    for pool in &mut event.pools {
        pool.complete = true;
    }
    event.close_pools().unwrap();
    event
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn test_add_team_creates_four_slots() {
    let mut event = Event::new("Epee", Rules::default());
    let id = event.add_team(entry("Paris", Some("PUC"))).unwrap();

    let team = event.team(id).unwrap();
    assert_eq!(team.club.as_deref(), Some("PUC"));
    assert_eq!(event.fencers.len(), 4);
    let reserve = event.fencer(team.fencer(Slot::D)).unwrap();
    assert!(reserve.is_placeholder());
    assert_eq!(reserve.slot, Slot::D);
    let first = event.fencer(team.fencer(Slot::A)).unwrap();
    assert_eq!(first.name, "Paris A");
    assert_eq!(first.team, id);
}

#[test]
fn test_add_team_rejects_bad_rosters() {
    let mut event = Event::new("Epee", Rules::default());
    event.add_team(entry("Paris", None)).unwrap();

    assert!(matches!(
        event.add_team(entry("Paris", None)),
        Err(EngineError::InvalidRoster(_))
    ));
    assert!(matches!(
        event.add_team(entry("  ", None)),
        Err(EngineError::InvalidRoster(_))
    ));

    let mut short = entry("Lille", None);
    short.fencers[1] = Some(" ".into());
    assert!(matches!(event.add_team(short), Err(EngineError::InvalidRoster(_))));
    assert_eq!(event.teams.len(), 1);
}

#[test]
fn test_add_team_after_pools_is_refused() {
    let mut event = event_with_teams(3);
    event.build_pools(1, &mut rng()).unwrap();
    assert_eq!(
        event.add_team(entry("Late", None)),
        Err(EngineError::WrongStage {
            expected: Stage::Seeding,
            actual: Stage::Pools
        })
    );
}

// =============================================================================
// Pools
// =============================================================================

#[test]
fn test_build_pools_assigns_everyone() {
    let mut event = event_with_teams(6);
    event.teams[5].checked_in = false;
    event.build_pools(2, &mut rng()).unwrap();

    assert_eq!(event.stage, Stage::Pools);
    assert_eq!(event.pools.len(), 2);
    assert_eq!(event.pools[0].size(), 3);
    assert_eq!(event.pools[1].size(), 2);
    assert_eq!(event.teams[5].pool, None);

    for pool in &event.pools {
        assert_eq!(pool.sub_pools.len(), 3);
        for team in &pool.teams {
            assert_eq!(event.team(*team).unwrap().pool, Some(pool.id));
        }
        for sub in &pool.sub_pools {
            for fencer in &sub.fencers {
                let fencer = event.fencer(*fencer).unwrap();
                assert_eq!(fencer.slot, sub.slot);
                assert_eq!(fencer.pool, Some(pool.id));
            }
        }
    }
}

#[test]
fn test_build_pools_rejects_bad_count() {
    let mut event = event_with_teams(3);
    assert!(matches!(
        event.build_pools(4, &mut rng()),
        Err(EngineError::InvalidPoolPlan(_))
    ));
    assert_eq!(event.stage, Stage::Seeding);
}

#[test]
fn test_assign_pools_follows_plan() {
    let mut event = event_with_teams(4);
    let ids: Vec<TeamId> = event.teams.iter().map(|t| t.id).collect();
    event
        .assign_pools(vec![vec![ids[3], ids[0]], vec![ids[1], ids[2]]])
        .unwrap();

    assert_eq!(event.pools[0].teams, vec![ids[3], ids[0]]);
    let a = &event.pools[0].sub_pool(Slot::A).unwrap().fencers;
    assert_eq!(a[0], event.teams[3].fencer(Slot::A));
    assert_eq!(event.team(ids[2]).unwrap().pool, Some(event.pools[1].id));
}

#[test]
fn test_assign_pools_rejects_bad_plans() {
    let mut event = event_with_teams(3);
    let ids: Vec<TeamId> = event.teams.iter().map(|t| t.id).collect();

    let plans = vec![
        vec![vec![ids[0], ids[1]]],
        vec![vec![ids[0], ids[1]], vec![ids[1], ids[2]]],
        vec![vec![ids[0], ids[1], ids[2]], vec![]],
    ];
    for plan in plans {
        assert!(matches!(
            event.assign_pools(plan),
            Err(EngineError::InvalidPoolPlan(_))
        ));
    }
    let stranger = TeamId::new();
    assert_eq!(
        event.assign_pools(vec![vec![ids[0], ids[1], ids[2], stranger]]),
        Err(EngineError::UnknownTeam(stranger))
    );
    assert_eq!(event.stage, Stage::Seeding);
    assert!(event.pools.is_empty());
}

#[test]
fn test_record_pool_bout_updates_stats() {
    let mut event = event_with_teams(2);
    event.build_pools(1, &mut rng()).unwrap();
    let pool = event.pools[0].clone();
    let a = pool.sub_pool(Slot::A).unwrap().fencers.clone();

    event.record_pool_bout(pool.id, a[0], a[1], "D4", "V").unwrap();
    let winner = event.fencer(a[1]).unwrap();
    assert_eq!(winner.stats.victories, 1);
    assert_eq!(winner.stats.touches_scored, 5);
    assert_eq!(winner.stats.touches_received, 4);

    let home_team = event.team(pool.teams[0]).unwrap();
    assert_eq!(home_team.stats.touches_scored, 4);
    assert_eq!(home_team.stats.victories, 0);
}

#[test]
fn test_record_pool_bout_rejections() {
    let mut event = event_with_teams(2);
    event.build_pools(1, &mut rng()).unwrap();
    let pool = event.pools[0].clone();
    let a = pool.sub_pool(Slot::A).unwrap().fencers.clone();
    let b = pool.sub_pool(Slot::B).unwrap().fencers.clone();

    assert!(matches!(
        event.record_pool_bout(pool.id, a[0], b[1], "5", "2"),
        Err(EngineError::InvalidRoster(_))
    ));
    assert!(matches!(
        event.record_pool_bout(pool.id, a[0], b[0], "5", "2"),
        Err(EngineError::InvalidRoster(_))
    ));
    assert!(matches!(
        event.record_pool_bout(pool.id, a[0], a[1], "5", "5"),
        Err(EngineError::InvalidScore(_))
    ));
    assert!(matches!(
        event.record_pool_bout(pool.id, a[0], a[1], "V", "V2"),
        Err(EngineError::InvalidScore(_))
    ));

    event.record_pool_bout(pool.id, a[0], a[1], "5", "2").unwrap();
    assert_eq!(
        event.record_pool_bout(pool.id, a[1], a[0], "5", "2"),
        Err(EngineError::DuplicateBout(a[1], a[0]))
    );
    assert_eq!(event.pools[0].results.len(), 1);
}

#[test]
fn test_complete_and_reset_pool() {
    let mut event = event_with_teams(3);
    event.build_pools(1, &mut rng()).unwrap();
    let id = event.pools[0].id;

    assert_eq!(
        event.complete_pool(id),
        Err(EngineError::PoolIncomplete { pool: 1, missing: 9 })
    );
    fence_pool(&mut event, 1);
    event.complete_pool(id).unwrap();

    let a = event.pools[0].sub_pool(Slot::A).unwrap().fencers.clone();
    assert_eq!(
        event.record_pool_bout(id, a[0], a[1], "5", "1"),
        Err(EngineError::PoolClosed(1))
    );

    event.reset_pool(id).unwrap();
    assert!(event.pools[0].results.is_empty());
    assert!(!event.pools[0].complete);
    assert!(event.teams.iter().all(|t| t.stats == Stats::default()));
}

#[test]
fn test_close_pools_requires_every_pool() {
    let mut event = event_with_teams(4);
    event.build_pools(2, &mut rng()).unwrap();
    let first = fence_pool(&mut event, 1);
    event.complete_pool(first).unwrap();

    assert_eq!(
        event.close_pools(),
        Err(EngineError::PoolIncomplete { pool: 2, missing: 3 })
    );
    let second = fence_pool(&mut event, 2);
    event.complete_pool(second).unwrap();
    event.close_pools().unwrap();
    assert_eq!(event.stage, Stage::PoolResults);
}

// =============================================================================
// Ranking
// =============================================================================

#[test]
fn test_pool_ranking_follows_results() {
    let mut event = event_with_teams(3);
    event.build_pools(1, &mut rng()).unwrap();
    let id = fence_pool(&mut event, 1);
    event.complete_pool(id).unwrap();
    event.close_pools().unwrap();

    let order = event.pools[0].teams.clone();
    let rows = event.pool_ranking();
    let ids: Vec<TeamId> = rows.iter().map(|r| r.id).collect();
    assert_eq!(ids, order);

    assert_eq!(rows[0].win_rate, 1.0);
    assert_eq!(rows[0].indicator, 12);
    assert_eq!(rows[0].touches_scored, 30);
    assert_eq!(rows[0].place, PlaceLabel::Outright(1));
    assert_eq!(rows[2].win_rate, 0.0);
    assert_eq!(rows[2].pool, 1);
}

#[test]
fn test_sub_pool_ranking() {
    let mut event = event_with_teams(3);
    event.build_pools(1, &mut rng()).unwrap();
    let id = fence_pool(&mut event, 1);

    let ranked = event.sub_pool_ranking(id, Slot::B).unwrap();
    let expected = event.pools[0].sub_pool(Slot::B).unwrap().fencers.clone();
    let got: Vec<FencerId> = ranked.iter().map(|r| r.entry).collect();
    assert_eq!(got, expected);
    assert!(event.sub_pool_ranking(id, Slot::D).is_err());
}

#[test]
fn test_equal_records_share_a_place() {
    let mut event = ranked_event(3);
    for team in &mut event.teams {
        team.stats = Stats {
            victories: 1,
            touches_scored: 20,
            touches_received: 20,
        };
    }
    let labels: Vec<String> = event
        .ranked_teams()
        .iter()
        .map(|r| r.place.to_string())
        .collect();
    assert_eq!(labels, vec!["1T", "1T", "1T"]);
}

// =============================================================================
// Bracket generation
// =============================================================================

#[test]
fn test_generate_bracket_seeds_from_ranking() {
    let mut event = ranked_event(6);
    event.generate_bracket().unwrap();

    assert_eq!(event.stage, Stage::Eliminations);
    let bracket = event.bracket().unwrap();
    assert_eq!(bracket.size, 8);
    let names: Vec<&str> = bracket
        .seeds
        .iter()
        .map(|&id| event.team(id).unwrap().name.as_str())
        .collect();
    assert_eq!(names, vec!["T1", "T2", "T3", "T4", "T5", "T6"]);
    assert!(event.teams.iter().all(|t| t.final_place.is_none()));

    let tableau = event.tableau.as_ref().unwrap();
    assert_eq!(tableau.teams[0][0].as_deref(), Some("T1 (1)"));
    assert_eq!(tableau.teams[0][1], None);
}

#[test]
fn test_generate_bracket_places_leftovers() {
    let mut event = ranked_event(15);
    // T14 and T15 share a record
    event.teams[14].stats = event.teams[13].stats;
    event.generate_bracket().unwrap();

    assert_eq!(event.bracket().unwrap().seeds.len(), 12);
    let place = |name: &str| event.team_by_name(name).unwrap().final_place;
    assert_eq!(place("T12"), None);
    assert_eq!(place("T13"), Some(13));
    assert_eq!(place("T14"), Some(14));
    assert_eq!(place("T15"), Some(14));

    let standings = event.standings();
    let labels: Vec<String> = standings.iter().map(|s| s.label.to_string()).collect();
    assert_eq!(labels, vec!["13", "14T", "14T"]);
}

#[test]
fn test_generate_bracket_needs_two_entrants() {
    let mut event = event_with_teams(1);
    event.build_pools(1, &mut rng()).unwrap();
    let id = event.pools[0].id;
    event.complete_pool(id).unwrap();
    event.close_pools().unwrap();

    assert_eq!(event.generate_bracket(), Err(EngineError::TooFewEntrants(1)));
    assert_eq!(event.stage, Stage::PoolResults);
    assert!(event.bracket.is_none());
}

#[test]
fn test_generate_bracket_before_pools_close() {
    let mut event = event_with_teams(4);
    assert_eq!(
        event.generate_bracket(),
        Err(EngineError::WrongStage {
            expected: Stage::PoolResults,
            actual: Stage::Seeding
        })
    );
}

#[test]
fn test_ready_bouts_after_generation() {
    let mut event = ranked_event(5);
    assert!(event.ready_bouts().is_empty());
    event.generate_bracket().unwrap();
    // 4v5 in the first round, 2v3 already meet in the semifinal
    assert_eq!(event.ready_bouts().len(), 2);
}
