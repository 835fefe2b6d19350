//! Round-robin pools and the aggregates derived from their bouts.
//!
//! Each pool number holds a team roster plus one individual sub-pool per
//! active position. Fencers only meet the same position of the other teams,
//! so two teams meet in exactly three bouts. Team results and team stats are
//! never stored on their own; they are folded from the individual results.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::score::Side;
use crate::types::{FencerId, PoolId, Slot, Stats, TeamId};

/// Position bouts a team must win to take the team encounter
pub const TEAM_MAJORITY: u32 = 2;

/// The individual round-robin of one position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubPool {
    pub slot: Slot,
    /// Fencers in pool-sheet order
    pub fencers: Vec<FencerId>,
}

/// One individual bout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoutResult {
    pub slot: Slot,
    pub fencer: FencerId,
    pub team: TeamId,
    pub opponent: FencerId,
    pub opponent_team: TeamId,
    pub fencer_score: u32,
    pub opponent_score: u32,
    pub fencer_won: bool,
}

impl BoutResult {
    /// Touches scored, touches received and the victory flag for `fencer`
    pub fn line_for(&self, fencer: FencerId) -> Option<(u32, u32, bool)> {
        if fencer == self.fencer {
            Some((self.fencer_score, self.opponent_score, self.fencer_won))
        } else if fencer == self.opponent {
            Some((self.opponent_score, self.fencer_score, !self.fencer_won))
        } else {
            None
        }
    }

    pub fn involves(&self, a: FencerId, b: FencerId) -> bool {
        (self.fencer == a && self.opponent == b) || (self.fencer == b && self.opponent == a)
    }
}

/// Aggregate of the position bouts between two teams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamResult {
    pub team: TeamId,
    pub opponent_team: TeamId,
    pub touches: u32,
    pub opponent_touches: u32,
    pub bouts_won: u32,
    pub opponent_bouts_won: u32,
}

impl TeamResult {
    pub fn winner(&self) -> Option<TeamId> {
        if self.bouts_won >= TEAM_MAJORITY {
            Some(self.team)
        } else if self.opponent_bouts_won >= TEAM_MAJORITY {
            Some(self.opponent_team)
        } else {
            None
        }
    }

    /// Folds one more position bout into the encounter.
    #[must_use]
    fn with_bout(self, bout: &BoutResult) -> Self {
        let (scored, received, won) = if bout.team == self.team {
            (bout.fencer_score, bout.opponent_score, bout.fencer_won)
        } else {
            (bout.opponent_score, bout.fencer_score, !bout.fencer_won)
        };
        Self {
            touches: self.touches + scored,
            opponent_touches: self.opponent_touches + received,
            bouts_won: self.bouts_won + u32::from(won),
            opponent_bouts_won: self.opponent_bouts_won + u32::from(!won),
            ..self
        }
    }
}

/// A pool: team roster, sub-pools and recorded bouts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub id: PoolId,
    /// 1-based pool number
    pub number: u32,
    pub teams: Vec<TeamId>,
    pub sub_pools: Vec<SubPool>,
    pub results: Vec<BoutResult>,
    pub complete: bool,
}

impl Pool {
    /// Number of teams, which is also the size of every sub-pool
    pub fn size(&self) -> usize {
        self.teams.len()
    }

    pub fn sub_pool(&self, slot: Slot) -> Option<&SubPool> {
        self.sub_pools.iter().find(|s| s.slot == slot)
    }

    pub fn has_bout(&self, a: FencerId, b: FencerId) -> bool {
        self.results.iter().any(|r| r.involves(a, b))
    }

    /// Bouts needed for a full round robin in every sub-pool
    pub fn expected_bouts(&self) -> usize {
        let n = self.size();
        n * n.saturating_sub(1) / 2 * self.sub_pools.len()
    }

    pub fn missing_bouts(&self) -> usize {
        self.expected_bouts().saturating_sub(self.results.len())
    }

    /// Team encounters derived from the individual bouts, in order of first
    /// appearance
    pub fn team_results(&self) -> Vec<TeamResult> {
        let mut encounters: Vec<TeamResult> = Vec::new();
        for bout in &self.results {
            let existing = encounters.iter_mut().find(|t| {
                (t.team == bout.team && t.opponent_team == bout.opponent_team)
                    || (t.team == bout.opponent_team && t.opponent_team == bout.team)
            });
            match existing {
                Some(encounter) => *encounter = encounter.with_bout(bout),
                None => encounters.push(
                    TeamResult {
                        team: bout.team,
                        opponent_team: bout.opponent_team,
                        touches: 0,
                        opponent_touches: 0,
                        bouts_won: 0,
                        opponent_bouts_won: 0,
                    }
                    .with_bout(bout),
                ),
            }
        }
        encounters
    }

    /// Team stats: touches from every position bout, victories from the
    /// derived team encounters.
    pub fn team_stats(&self, team: TeamId) -> Stats {
        let touches = self.results.iter().fold(Stats::default(), |stats, bout| {
            if bout.team == team {
                stats.with_bout(bout.fencer_score, bout.opponent_score, false)
            } else if bout.opponent_team == team {
                stats.with_bout(bout.opponent_score, bout.fencer_score, false)
            } else {
                stats
            }
        });
        self.team_results()
            .iter()
            .filter(|encounter| encounter.winner() == Some(team))
            .fold(touches, |stats, _| stats.with_victory())
    }

    pub fn fencer_stats(&self, fencer: FencerId) -> Stats {
        self.results
            .iter()
            .filter_map(|bout| bout.line_for(fencer))
            .fold(Stats::default(), |stats, (scored, received, won)| {
                stats.with_bout(scored, received, won)
            })
    }
}

/// Builds the bout record for a validated pool bout.
pub fn bout_result(
    slot: Slot,
    fencer: (FencerId, TeamId),
    opponent: (FencerId, TeamId),
    fencer_score: u32,
    opponent_score: u32,
    winner: Side,
) -> BoutResult {
    BoutResult {
        slot,
        fencer: fencer.0,
        team: fencer.1,
        opponent: opponent.0,
        opponent_team: opponent.1,
        fencer_score,
        opponent_score,
        fencer_won: winner == Side::First,
    }
}

/// Deal teams into `count` pools.
///
/// Teams are grouped by club and shuffled inside each club, then dealt
/// round-robin so teams of one club land in different pools where possible.
pub fn deal_pools<R: Rng + ?Sized>(
    teams: &[(TeamId, Option<String>)],
    count: usize,
    rng: &mut R,
) -> Result<Vec<Vec<TeamId>>, EngineError> {
    if count == 0 || count > teams.len() {
        return Err(EngineError::InvalidPoolPlan(format!(
            "cannot split {} teams into {count} pools",
            teams.len()
        )));
    }

    let mut ordered: Vec<(TeamId, Option<String>)> = teams.to_vec();
    ordered.sort_by(|a, b| a.1.cmp(&b.1));
    let mut start = 0;
    while start < ordered.len() {
        let mut end = start + 1;
        while end < ordered.len() && ordered[end].1 == ordered[start].1 {
            end += 1;
        }
        ordered[start..end].shuffle(rng);
        start = end;
    }

    let mut pools = vec![Vec::new(); count];
    for (i, (team, _)) in ordered.into_iter().enumerate() {
        pools[i % count].push(team);
    }
    Ok(pools)
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod pool_tests;
