use super::*;
use proptest::prelude::*;

fn stats(victories: u32, scored: u32, received: u32) -> Stats {
    Stats {
        victories,
        touches_scored: scored,
        touches_received: received,
    }
}

#[test]
fn test_win_rate_exact_comparison() {
    // 2 of 4 bouts equals 1 of 2 bouts
    assert_eq!(WinRate::new(2, 5), WinRate::new(1, 3));
    assert!(WinRate::new(2, 4) > WinRate::new(1, 3));
    assert_eq!(WinRate::new(0, 1).as_f64(), 0.0);
}

#[test]
fn test_four_distinct_teams() {
    // Win rates 1.0, 0.67, 0.33, 0.0 in a four-team pool
    let entries = vec![
        ("c", RankKey::new(&stats(1, 10, 12), 4)),
        ("a", RankKey::new(&stats(3, 15, 5), 4)),
        ("d", RankKey::new(&stats(0, 6, 15), 4)),
        ("b", RankKey::new(&stats(2, 12, 11), 4)),
    ];
    let ranked = rank_entries(entries);
    let order: Vec<&str> = ranked.iter().map(|r| r.entry).collect();
    assert_eq!(order, vec!["a", "b", "c", "d"]);
    let labels: Vec<String> = ranked.iter().map(|r| r.place.to_string()).collect();
    assert_eq!(labels, vec!["1", "2", "3", "4"]);
}

#[test]
fn test_two_way_tie_at_top() {
    let entries = vec![
        ("x", RankKey::new(&stats(2, 14, 9), 3)),
        ("y", RankKey::new(&stats(2, 14, 9), 3)),
        ("z", RankKey::new(&stats(0, 4, 15), 3)),
    ];
    let ranked = rank_entries(entries);
    let labels: Vec<String> = ranked.iter().map(|r| r.place.to_string()).collect();
    assert_eq!(labels, vec!["1T", "1T", "3"]);
    // Tied entries keep input order
    assert_eq!(ranked[0].entry, "x");
    assert_eq!(ranked[1].entry, "y");
}

#[test]
fn test_indicator_then_touches_break_ties() {
    let entries = vec![
        ("low_touches", RankKey::new(&stats(1, 8, 6), 3)),
        ("better_indicator", RankKey::new(&stats(1, 9, 5), 3)),
        ("high_touches", RankKey::new(&stats(1, 10, 8), 3)),
    ];
    let ranked = rank_entries(entries);
    let order: Vec<&str> = ranked.iter().map(|r| r.entry).collect();
    assert_eq!(order, vec!["better_indicator", "high_touches", "low_touches"]);
    assert!(ranked.iter().all(|r| !r.place.is_tied()));
}

#[test]
fn test_assign_places_advances_by_group_size() {
    let labels = assign_places(&[9, 7, 7, 7, 3, 3, 1]);
    let text: Vec<String> = labels.iter().map(ToString::to_string).collect();
    assert_eq!(text, vec!["1", "2T", "2T", "2T", "5T", "5T", "7"]);

    let offset = assign_places_from(&[4, 4, 2], 13);
    assert_eq!(
        offset,
        vec![PlaceLabel::Tied(13), PlaceLabel::Tied(13), PlaceLabel::Outright(15)]
    );
}

#[test]
fn test_place_label_serde() {
    let json = serde_json::to_string(&PlaceLabel::Tied(5)).unwrap();
    assert_eq!(json, "\"5T\"");
    let back: PlaceLabel = serde_json::from_str(&json).unwrap();
    assert_eq!(back, PlaceLabel::Tied(5));
    assert!(serde_json::from_str::<PlaceLabel>("\"x\"").is_err());
}

proptest! {
    #[test]
    fn prop_ranking_is_idempotent(
        raw in prop::collection::vec((0u32..6, 0u32..30, 0u32..30), 1..12)
    ) {
        let pool_size = raw.len();
        let entries: Vec<(usize, RankKey)> = raw
            .iter()
            .enumerate()
            .map(|(i, &(v, s, r))| (i, RankKey::new(&stats(v, s, r), pool_size)))
            .collect();

        let first = rank_entries(entries.clone());
        let second = rank_entries(entries);
        prop_assert_eq!(&first, &second);

        // Re-ranking the output keeps the same order
        let again = rank_entries(first.iter().map(|r| (r.entry, r.key)).collect());
        prop_assert_eq!(&first, &again);

        // Entries sharing a label share identical keys, and keys never increase
        for pair in first.windows(2) {
            prop_assert!(pair[0].key >= pair[1].key);
            if pair[0].place == pair[1].place {
                prop_assert_eq!(pair[0].key, pair[1].key);
            } else {
                prop_assert!(pair[0].key > pair[1].key);
            }
        }
    }
}
