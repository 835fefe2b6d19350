//! Bracket geometry as pure functions.
//!
//! Rounds count down toward the final: round 1 is the final, round 2 the
//! semifinals, and round `r` holds `2^(r-1)` bouts. Match indices are 0-based
//! within a round.

use crate::score::Side;

/// Smallest power of two that holds `entrants`
pub fn bracket_size(entrants: usize) -> usize {
    entrants.max(1).next_power_of_two()
}

/// Number of rounds in a bracket of `size` slots
pub fn round_count(size: usize) -> u32 {
    size.max(2).trailing_zeros()
}

/// Bouts fenced in `round`
pub fn matches_in_round(round: u32) -> usize {
    1 << (round - 1)
}

/// Standard seeding order for a bracket of `size` slots.
///
/// Consecutive pairs of the result are the first-round bouts, arranged so
/// the top seeds meet as late as possible. For 8 slots:
/// `[1, 8, 4, 5, 2, 7, 3, 6]`.
pub fn seed_order(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    let mut slots = 1;
    while slots < size {
        slots *= 2;
        order = order
            .iter()
            .flat_map(|&seed| [seed, slots + 1 - seed])
            .collect();
    }
    order
}

/// Where the winner of `(round, match_index)` goes: the next round, the match
/// in that round, and the competitor slot. The final has no next position.
pub fn next_position(round: u32, match_index: usize) -> Option<(u32, usize, Side)> {
    if round <= 1 {
        return None;
    }
    let side = if match_index % 2 == 0 {
        Side::First
    } else {
        Side::Second
    };
    Some((round - 1, match_index / 2, side))
}

/// Slot a semifinal loser takes in the third-place bout
pub fn third_place_side(semifinal_index: usize) -> Side {
    if semifinal_index % 2 == 0 {
        Side::First
    } else {
        Side::Second
    }
}

/// Number in the `match<N>` label: the final is match 1, the semifinals
/// 2 and 3, and so on toward the earliest round.
pub fn match_number(round: u32, match_index: usize) -> usize {
    matches_in_round(round) + match_index
}

#[cfg(test)]
#[path = "seeding_tests.rs"]
mod seeding_tests;
