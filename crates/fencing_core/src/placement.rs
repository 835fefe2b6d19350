//! Final placement.
//!
//! Bracket rounds resolve from the outside in: once every bout of a round
//! before the semifinals is decided, its losers take the block of places just
//! below the teams still alive. Inside the block a narrower defeat places
//! better, and equal margins share a place. Teams that never entered the
//! bracket are placed from the pool ranking after the last bracket place.

use serde::{Deserialize, Serialize};

use crate::bracket::{Bracket, DeState};
use crate::ranking::{PlaceLabel, Ranked, assign_places_from};
use crate::seeding::matches_in_round;
use crate::types::{Team, TeamId};

/// A place decided for one team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub team: TeamId,
    pub place: PlaceLabel,
}

/// Number of bouts actually fenced in a round (byes excluded)
pub fn contested_bouts(bracket: &Bracket, round: u32) -> usize {
    bracket
        .round(round)
        .filter(|de| de.state != DeState::Bye)
        .count()
}

/// A round is complete when as many teams were eliminated in it as it had
/// contested bouts.
pub fn round_is_complete(bracket: &Bracket, teams: &[Team], round: u32) -> bool {
    let eliminated = teams
        .iter()
        .filter(|t| t.round_eliminated_in == Some(round))
        .count();
    eliminated == contested_bouts(bracket, round)
}

/// Places for the losers of a completed round before the semifinals.
///
/// The block starts right after the `2^(round-1)` teams that survived the
/// round. Losers are ordered by margin of defeat, narrowest first, then by
/// seed.
pub fn round_places(bracket: &Bracket, round: u32) -> Vec<Placement> {
    let mut losers: Vec<(TeamId, u32, usize)> = bracket
        .round(round)
        .filter(|de| de.state == DeState::Finished)
        .filter_map(|de| {
            let team = de.loser_team()?;
            let margin = de.scores?.margin();
            Some((team, margin, bracket.seed_of(team).unwrap_or(usize::MAX)))
        })
        .collect();
    losers.sort_by_key(|&(_, margin, seed)| (margin, seed));

    let margins: Vec<u32> = losers.iter().map(|&(_, margin, _)| margin).collect();
    let first = matches_in_round(round) as u32 + 1;
    losers
        .into_iter()
        .zip(assign_places_from(&margins, first))
        .map(|((team, _, _), place)| Placement { team, place })
        .collect()
}

/// Places for teams ranked below the direct-entry cut, starting at `first`.
///
/// Pool ties among these teams stay tied.
pub fn pool_places(ranked: &[Ranked<TeamId>], first: u32) -> Vec<Placement> {
    let keys: Vec<_> = ranked.iter().map(|r| r.key).collect();
    ranked
        .iter()
        .zip(assign_places_from(&keys, first))
        .map(|(r, place)| Placement {
            team: r.entry,
            place,
        })
        .collect()
}

/// One row of the final standings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub team: TeamId,
    pub name: String,
    pub rank: u32,
    pub label: PlaceLabel,
}

/// Final standings for every placed team, by rank.
///
/// `order` breaks display ties between teams sharing a rank (seed order for
/// bracket teams, pool order for the rest).
pub fn standings<F>(teams: &[Team], order: F) -> Vec<Standing>
where
    F: Fn(TeamId) -> usize,
{
    let mut placed: Vec<&Team> = teams.iter().filter(|t| t.final_place.is_some()).collect();
    placed.sort_by_key(|t| (t.final_place, order(t.id)));

    placed
        .iter()
        .map(|team| {
            let rank = team.final_place.unwrap_or_default();
            let shared = placed.iter().filter(|t| t.final_place == Some(rank)).count();
            Standing {
                team: team.id,
                name: team.name.clone(),
                rank,
                label: if shared > 1 {
                    PlaceLabel::Tied(rank)
                } else {
                    PlaceLabel::Outright(rank)
                },
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "placement_tests.rs"]
mod placement_tests;
