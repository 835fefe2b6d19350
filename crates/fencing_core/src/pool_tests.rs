use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn two_team_pool() -> (Pool, [TeamId; 2], [[FencerId; 3]; 2]) {
    let teams = [TeamId::new(), TeamId::new()];
    let fencers = [
        [FencerId::new(), FencerId::new(), FencerId::new()],
        [FencerId::new(), FencerId::new(), FencerId::new()],
    ];
    let sub_pools = Slot::ACTIVE
        .iter()
        .map(|&slot| SubPool {
            slot,
            fencers: vec![fencers[0][slot.idx()], fencers[1][slot.idx()]],
        })
        .collect();
    let pool = Pool {
        id: PoolId::new(),
        number: 1,
        teams: teams.to_vec(),
        sub_pools,
        results: Vec::new(),
        complete: false,
    };
    (pool, teams, fencers)
}

fn record(pool: &mut Pool, slot: Slot, scores: (u32, u32), winner: Side) {
    let (teams, fencers) = (pool.teams.clone(), pool.sub_pool(slot).unwrap().fencers.clone());
    pool.results.push(bout_result(
        slot,
        (fencers[0], teams[0]),
        (fencers[1], teams[1]),
        scores.0,
        scores.1,
        winner,
    ));
}

#[test]
fn test_team_wins_with_two_of_three_bouts() {
    let (mut pool, teams, _) = two_team_pool();
    record(&mut pool, Slot::A, (5, 2), Side::First);
    record(&mut pool, Slot::B, (1, 5), Side::Second);
    assert_eq!(pool.team_results()[0].winner(), None);

    record(&mut pool, Slot::C, (5, 4), Side::First);
    let encounters = pool.team_results();
    assert_eq!(encounters.len(), 1);
    assert_eq!(encounters[0].winner(), Some(teams[0]));
    assert_eq!(encounters[0].touches, 11);
    assert_eq!(encounters[0].opponent_touches, 11);
    assert_eq!(pool.missing_bouts(), 0);
}

#[test]
fn test_team_stats_fold_all_bouts() {
    let (mut pool, teams, _) = two_team_pool();
    record(&mut pool, Slot::A, (5, 2), Side::First);
    record(&mut pool, Slot::B, (1, 5), Side::Second);
    record(&mut pool, Slot::C, (5, 4), Side::First);

    let winner = pool.team_stats(teams[0]);
    assert_eq!(winner.victories, 1);
    assert_eq!(winner.touches_scored, 11);
    assert_eq!(winner.touches_received, 11);
    assert_eq!(winner.indicator(), 0);

    let loser = pool.team_stats(teams[1]);
    assert_eq!(loser.victories, 0);
    assert_eq!(loser.touches_scored, 11);
}

#[test]
fn test_fencer_stats_from_either_side() {
    let (mut pool, _, fencers) = two_team_pool();
    record(&mut pool, Slot::B, (1, 5), Side::Second);

    let home = pool.fencer_stats(fencers[0][1]);
    assert_eq!(home, Stats { victories: 0, touches_scored: 1, touches_received: 5 });
    let away = pool.fencer_stats(fencers[1][1]);
    assert_eq!(away, Stats { victories: 1, touches_scored: 5, touches_received: 1 });
    assert!(pool.has_bout(fencers[1][1], fencers[0][1]));
    assert!(!pool.has_bout(fencers[0][0], fencers[1][0]));
}

#[test]
fn test_expected_bouts() {
    let (mut pool, _, _) = two_team_pool();
    assert_eq!(pool.expected_bouts(), 3);
    pool.teams.push(TeamId::new());
    assert_eq!(pool.expected_bouts(), 9);
}

#[test]
fn test_deal_pools_round_robin() {
    let teams: Vec<(TeamId, Option<String>)> = (0..7)
        .map(|i| (TeamId::new(), Some(format!("club{}", i % 2))))
        .collect();
    let mut rng = StdRng::seed_from_u64(7);
    let pools = deal_pools(&teams, 3, &mut rng).unwrap();

    let sizes: Vec<usize> = pools.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![3, 2, 2]);
    let total: usize = sizes.iter().sum();
    assert_eq!(total, 7);
}

#[test]
fn test_deal_pools_reproducible_for_seed() {
    let teams: Vec<(TeamId, Option<String>)> =
        (0..9).map(|_| (TeamId::new(), Some("club".to_string()))).collect();
    let first = deal_pools(&teams, 3, &mut StdRng::seed_from_u64(42)).unwrap();
    let second = deal_pools(&teams, 3, &mut StdRng::seed_from_u64(42)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_deal_pools_spreads_a_club() {
    let mut teams: Vec<(TeamId, Option<String>)> =
        (0..3).map(|_| (TeamId::new(), Some("big".to_string()))).collect();
    teams.extend((0..3).map(|_| (TeamId::new(), Some("small".to_string()))));
    let pools = deal_pools(&teams, 3, &mut StdRng::seed_from_u64(1)).unwrap();

    for pool in &pools {
        let big = pool
            .iter()
            .filter(|id| teams.iter().any(|(t, c)| t == *id && c.as_deref() == Some("big")))
            .count();
        assert_eq!(big, 1, "each pool should hold exactly one team from 'big'");
    }
}

#[test]
fn test_deal_pools_rejects_bad_counts() {
    let teams = vec![(TeamId::new(), None), (TeamId::new(), None)];
    let mut rng = StdRng::seed_from_u64(0);
    assert!(deal_pools(&teams, 0, &mut rng).is_err());
    assert!(deal_pools(&teams, 3, &mut rng).is_err());
}
