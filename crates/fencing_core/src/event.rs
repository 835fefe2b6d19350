//! The event aggregate: every record of one event and the stage gating
//! between pools and eliminations.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::bracket::{Bracket, DeState};
use crate::error::EngineError;
use crate::placement::{Standing, pool_places, standings};
use crate::pool::{Pool, SubPool, bout_result, deal_pools};
use crate::ranking::{PlaceLabel, RankKey, Ranked, rank_entries};
use crate::score::validate_pool_pair;
use crate::tableau::Tableau;
use crate::types::{DeId, EventId, Fencer, FencerId, PoolId, Rules, Slot, Stats, Team, TeamId};

/// Progression stages of an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    /// Teams known, pools not built yet
    Seeding,
    /// Pool bouts being recorded
    Pools,
    /// All pools complete, ranking final
    PoolResults,
    /// Bracket generated, bouts being fenced
    Eliminations,
    Finished,
}

/// Roster of a team joining an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamEntry {
    pub name: String,
    #[serde(default)]
    pub club: Option<String>,
    /// Fencer names for slots A-D; A and B are required
    pub fencers: [Option<String>; 4],
    #[serde(default = "default_checked_in")]
    pub checked_in: bool,
}

fn default_checked_in() -> bool {
    true
}

/// One row of the pool ranking as shown to spectators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    pub id: TeamId,
    pub name: String,
    pub pool: u32,
    pub win_rate: f64,
    pub indicator: i32,
    pub touches_scored: u32,
    pub place: PlaceLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub rules: Rules,
    pub stage: Stage,
    pub teams: Vec<Team>,
    pub fencers: Vec<Fencer>,
    pub pools: Vec<Pool>,
    pub bracket: Option<Bracket>,
    pub tableau: Option<Tableau>,
}

impl Event {
    pub fn new(name: &str, rules: Rules) -> Self {
        Self {
            id: EventId::new(),
            name: name.to_string(),
            rules,
            stage: Stage::Seeding,
            teams: Vec::new(),
            fencers: Vec::new(),
            pools: Vec::new(),
            bracket: None,
            tableau: None,
        }
    }

    pub(crate) fn require_stage(&self, expected: Stage) -> Result<(), EngineError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(EngineError::WrongStage {
                expected,
                actual: self.stage,
            })
        }
    }

    pub fn team(&self, id: TeamId) -> Result<&Team, EngineError> {
        self.teams
            .iter()
            .find(|t| t.id == id)
            .ok_or(EngineError::UnknownTeam(id))
    }

    pub fn team_by_name(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.name == name)
    }

    pub fn fencer(&self, id: FencerId) -> Result<&Fencer, EngineError> {
        self.fencers
            .iter()
            .find(|f| f.id == id)
            .ok_or(EngineError::UnknownFencer(id))
    }

    pub fn pool(&self, id: PoolId) -> Result<&Pool, EngineError> {
        self.pools
            .iter()
            .find(|p| p.id == id)
            .ok_or(EngineError::UnknownPool(id))
    }

    pub fn pool_by_number(&self, number: u32) -> Option<&Pool> {
        self.pools.iter().find(|p| p.number == number)
    }

    fn pool_index(&self, id: PoolId) -> Result<usize, EngineError> {
        self.pools
            .iter()
            .position(|p| p.id == id)
            .ok_or(EngineError::UnknownPool(id))
    }

    /// Register a team and its four fencer slots. Empty C/D slots hold
    /// placeholders.
    pub fn add_team(&mut self, entry: TeamEntry) -> Result<TeamId, EngineError> {
        self.require_stage(Stage::Seeding)?;
        if entry.name.trim().is_empty() {
            return Err(EngineError::InvalidRoster("team name is empty".into()));
        }
        if self.team_by_name(&entry.name).is_some() {
            return Err(EngineError::InvalidRoster(format!(
                "team '{}' is already entered",
                entry.name
            )));
        }
        for slot in [Slot::A, Slot::B] {
            let named = entry.fencers[slot.idx()]
                .as_deref()
                .is_some_and(|n| !n.trim().is_empty());
            if !named {
                return Err(EngineError::InvalidRoster(format!(
                    "team '{}' has no fencer in slot {slot}",
                    entry.name
                )));
            }
        }

        let team_id = TeamId::new();
        let fencers: Vec<Fencer> = Slot::ALL
            .iter()
            .map(|&slot| Fencer {
                id: FencerId::new(),
                team: team_id,
                slot,
                name: entry.fencers[slot.idx()]
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or_default()
                    .to_string(),
                stats: Stats::default(),
                pool: None,
            })
            .collect();

        self.teams.push(Team {
            id: team_id,
            name: entry.name,
            club: entry.club,
            checked_in: entry.checked_in,
            fencers: [fencers[0].id, fencers[1].id, fencers[2].id, fencers[3].id],
            stats: Stats::default(),
            pool: None,
            final_place: None,
            round_eliminated_in: None,
            de_indicator: None,
        });
        self.fencers.extend(fencers);
        Ok(team_id)
    }

    /// Deal the checked-in teams into `count` pools
    pub fn build_pools<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> Result<(), EngineError> {
        self.require_stage(Stage::Seeding)?;
        let entrants: Vec<(TeamId, Option<String>)> = self
            .teams
            .iter()
            .filter(|t| t.checked_in)
            .map(|t| (t.id, t.club.clone()))
            .collect();
        let dealt = deal_pools(&entrants, count, rng)?;
        self.assign_pools(dealt)
    }

    /// Build pools from an explicit plan, one roster per pool in pool-sheet
    /// order. Every checked-in team must appear exactly once.
    pub fn assign_pools(&mut self, plan: Vec<Vec<TeamId>>) -> Result<(), EngineError> {
        self.require_stage(Stage::Seeding)?;
        if plan.is_empty() || plan.iter().any(Vec::is_empty) {
            return Err(EngineError::InvalidPoolPlan("every pool needs at least one team".into()));
        }
        let mut planned: Vec<TeamId> = plan.iter().flatten().copied().collect();
        for &id in &planned {
            let team = self.team(id)?;
            if !team.checked_in {
                return Err(EngineError::InvalidPoolPlan(format!(
                    "team {} is not checked in",
                    team.name
                )));
            }
        }
        planned.sort_unstable();
        planned.dedup();
        if planned.len() != plan.iter().map(Vec::len).sum::<usize>() {
            return Err(EngineError::InvalidPoolPlan("a team is listed in more than one pool".into()));
        }
        if let Some(missing) = self
            .teams
            .iter()
            .find(|t| t.checked_in && planned.binary_search(&t.id).is_err())
        {
            return Err(EngineError::InvalidPoolPlan(format!(
                "team {} has no pool",
                missing.name
            )));
        }

        let mut pools = Vec::with_capacity(plan.len());
        for (i, roster) in plan.into_iter().enumerate() {
            let mut sub_pools = Vec::with_capacity(Slot::ACTIVE.len());
            for slot in Slot::ACTIVE {
                let fencers = roster
                    .iter()
                    .map(|&team| self.team(team).map(|t| t.fencer(slot)))
                    .collect::<Result<Vec<_>, _>>()?;
                sub_pools.push(SubPool { slot, fencers });
            }
            pools.push(Pool {
                id: PoolId::new(),
                number: i as u32 + 1,
                teams: roster,
                sub_pools,
                results: Vec::new(),
                complete: false,
            });
        }

        for pool in &pools {
            for team in self.teams.iter_mut().filter(|t| pool.teams.contains(&t.id)) {
                team.pool = Some(pool.id);
            }
            for sub in &pool.sub_pools {
                for fencer in self.fencers.iter_mut().filter(|f| sub.fencers.contains(&f.id)) {
                    fencer.pool = Some(pool.id);
                }
            }
        }
        self.pools = pools;
        self.stage = Stage::Pools;
        Ok(())
    }

    /// Record one pool bout from its raw sheet scores
    pub fn record_pool_bout(
        &mut self,
        pool: PoolId,
        fencer: FencerId,
        opponent: FencerId,
        raw_fencer: &str,
        raw_opponent: &str,
    ) -> Result<(), EngineError> {
        self.require_stage(Stage::Pools)?;
        let idx = self.pool_index(pool)?;
        let (home, away) = (self.fencer(fencer)?, self.fencer(opponent)?);
        let target = &self.pools[idx];
        if target.complete {
            return Err(EngineError::PoolClosed(target.number));
        }
        if home.team == away.team {
            return Err(EngineError::InvalidRoster(
                "fencers of the same team do not meet in pools".into(),
            ));
        }
        let in_sub_pool = |f: &Fencer| {
            target
                .sub_pool(f.slot)
                .is_some_and(|sub| sub.fencers.contains(&f.id))
        };
        if home.slot != away.slot || !in_sub_pool(home) || !in_sub_pool(away) {
            return Err(EngineError::InvalidRoster(format!(
                "fencers {fencer} and {opponent} are not in the same sub-pool of pool {}",
                target.number
            )));
        }
        if target.has_bout(fencer, opponent) {
            return Err(EngineError::DuplicateBout(fencer, opponent));
        }

        let (pair, winner) = validate_pool_pair(raw_fencer, raw_opponent, self.rules.pool_touches)?;
        let result = bout_result(
            home.slot,
            (home.id, home.team),
            (away.id, away.team),
            pair.first,
            pair.second,
            winner,
        );
        self.pools[idx].results.push(result);
        self.refresh_stats(idx);
        Ok(())
    }

    /// Mark a pool complete once every bout of its round robin is in
    pub fn complete_pool(&mut self, pool: PoolId) -> Result<(), EngineError> {
        self.require_stage(Stage::Pools)?;
        let idx = self.pool_index(pool)?;
        let target = &mut self.pools[idx];
        let missing = target.missing_bouts();
        if missing > 0 {
            return Err(EngineError::PoolIncomplete {
                pool: target.number,
                missing,
            });
        }
        target.complete = true;
        Ok(())
    }

    /// Drop every result of a pool so it can be fenced again
    pub fn reset_pool(&mut self, pool: PoolId) -> Result<(), EngineError> {
        self.require_stage(Stage::Pools)?;
        let idx = self.pool_index(pool)?;
        self.pools[idx].results.clear();
        self.pools[idx].complete = false;
        self.refresh_stats(idx);
        Ok(())
    }

    /// Close pool play; every pool must be complete
    pub fn close_pools(&mut self) -> Result<(), EngineError> {
        self.require_stage(Stage::Pools)?;
        if let Some(open) = self.pools.iter().find(|p| !p.complete) {
            return Err(EngineError::PoolIncomplete {
                pool: open.number,
                missing: open.missing_bouts(),
            });
        }
        self.stage = Stage::PoolResults;
        Ok(())
    }

    /// Recompute the aggregates of everyone in a pool from its results
    fn refresh_stats(&mut self, idx: usize) {
        let pool = &self.pools[idx];
        for team in self.teams.iter_mut().filter(|t| pool.teams.contains(&t.id)) {
            team.stats = pool.team_stats(team.id);
        }
        for fencer in self.fencers.iter_mut().filter(|f| f.pool == Some(pool.id)) {
            fencer.stats = pool.fencer_stats(fencer.id);
        }
    }

    /// Checked-in teams with a pool, ranked across all pools
    pub fn ranked_teams(&self) -> Vec<Ranked<TeamId>> {
        let entries = self
            .teams
            .iter()
            .filter(|t| t.checked_in)
            .filter_map(|t| {
                let pool = self.pools.iter().find(|p| Some(p.id) == t.pool)?;
                Some((t.id, RankKey::new(&t.stats, pool.size())))
            })
            .collect();
        rank_entries(entries)
    }

    /// Pool ranking rows for presentation
    pub fn pool_ranking(&self) -> Vec<RankingRow> {
        self.ranked_teams()
            .into_iter()
            .filter_map(|ranked| {
                let team = self.team(ranked.entry).ok()?;
                let pool = self.pools.iter().find(|p| Some(p.id) == team.pool)?;
                Some(RankingRow {
                    id: team.id,
                    name: team.name.clone(),
                    pool: pool.number,
                    win_rate: ranked.key.win_rate.as_f64(),
                    indicator: ranked.key.indicator,
                    touches_scored: ranked.key.touches_scored,
                    place: ranked.place,
                })
            })
            .collect()
    }

    /// Individual ranking of one position's sub-pool
    pub fn sub_pool_ranking(&self, pool: PoolId, slot: Slot) -> Result<Vec<Ranked<FencerId>>, EngineError> {
        let target = self.pool(pool)?;
        let sub = target.sub_pool(slot).ok_or_else(|| {
            EngineError::InvalidRoster(format!("pool {} has no {slot} sub-pool", target.number))
        })?;
        let entries = sub
            .fencers
            .iter()
            .map(|&id| {
                self.fencer(id)
                    .map(|f| (id, RankKey::new(&f.stats, sub.fencers.len())))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rank_entries(entries))
    }

    /// Seed the bracket from the pool ranking and place everyone below the
    /// direct-entry cut.
    pub fn generate_bracket(&mut self) -> Result<(), EngineError> {
        self.require_stage(Stage::PoolResults)?;
        let ranked = self.ranked_teams();
        let direct = ranked.len().min(self.rules.direct_entry_limit);
        let seeds: Vec<TeamId> = ranked[..direct].iter().map(|r| r.entry).collect();

        let bracket = Bracket::build(seeds)?;
        let tableau = bracket.initial_tableau(|id| {
            self.team(id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|_| id.to_string())
        });
        let leftovers = pool_places(&ranked[direct..], direct as u32 + 1);

        for placement in leftovers {
            assign_place(&mut self.teams, placement.team, placement.place.place())?;
        }
        self.bracket = Some(bracket);
        self.tableau = Some(tableau);
        self.stage = Stage::Eliminations;
        Ok(())
    }

    pub fn bracket(&self) -> Result<&Bracket, EngineError> {
        self.bracket
            .as_ref()
            .ok_or_else(|| EngineError::InconsistentBracket("event has no bracket".into()))
    }

    /// Mark a ready bout as being fenced
    pub fn start_bout(&mut self, id: DeId) -> Result<(), EngineError> {
        self.require_stage(Stage::Eliminations)?;
        let bracket = self
            .bracket
            .as_mut()
            .ok_or_else(|| EngineError::InconsistentBracket("event has no bracket".into()))?;
        let de = bracket.de_mut(id)?;
        match de.state {
            DeState::Ready => {
                de.state = DeState::InProgress;
                Ok(())
            }
            DeState::InProgress => Ok(()),
            DeState::NotReady => Err(EngineError::NotReady(id)),
            DeState::Finished | DeState::Bye => Err(EngineError::BoutClosed(id)),
        }
    }

    /// Bouts waiting for a score
    pub fn ready_bouts(&self) -> Vec<DeId> {
        self.bracket
            .as_ref()
            .map(|b| {
                b.des
                    .iter()
                    .filter(|de| matches!(de.state, DeState::Ready | DeState::InProgress))
                    .map(|de| de.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Final standings for every placed team
    pub fn standings(&self) -> Vec<Standing> {
        let pool_order: Vec<TeamId> = self.ranked_teams().into_iter().map(|r| r.entry).collect();
        let bracket = self.bracket.as_ref();
        standings(&self.teams, |id| {
            bracket
                .and_then(|b| b.seed_of(id))
                .or_else(|| pool_order.iter().position(|&t| t == id))
                .unwrap_or(usize::MAX)
        })
    }
}

/// Give a team its final place. A team is placed exactly once.
pub(crate) fn assign_place(teams: &mut [Team], team: TeamId, place: u32) -> Result<(), EngineError> {
    let entry = teams
        .iter_mut()
        .find(|t| t.id == team)
        .ok_or(EngineError::UnknownTeam(team))?;
    if let Some(existing) = entry.final_place {
        return Err(EngineError::InconsistentBracket(format!(
            "team {} already holds place {existing}",
            entry.name
        )));
    }
    entry.final_place = Some(place);
    Ok(())
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod event_tests;
