//! Scripted events.
//!
//! A script is a TOML description of a whole event: the teams, optionally the
//! pool plan, the pool encounters and the elimination scores. Replaying it
//! drives the engine through the same operations a live event uses.
//!
//! ```toml
//! name = "Team Foil"
//! seed = 7
//!
//! [[teams]]
//! name = "Paris"
//! club = "PUC"
//! fencers = ["Ann", "Bea", "Cid"]
//!
//! [[encounters]]
//! teams = ["Paris", "Lyon"]
//! bouts = [["V", "D3"], ["D4", "V"], ["V", "D1"]]
//!
//! [[eliminations]]
//! round = 2
//! match = 0
//! scores = [15, 11]
//!
//! [[eliminations]]
//! third = true
//! scores = [15, 9]
//! ```

use std::path::Path;

use fencing_core::{BoutSubmission, Event, EventId, Side, Slot, Team, TeamEntry};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::TournamentConfig;
use crate::engine::TournamentEngine;
use crate::error::{ConfigError, TournamentError};
use crate::store::RecordStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventScript {
    pub name: String,
    /// Overrides the configured draw seed
    #[serde(default)]
    pub seed: Option<u64>,
    /// Overrides the configured pool count
    #[serde(default)]
    pub pool_count: Option<usize>,
    pub teams: Vec<ScriptTeam>,
    /// Explicit pool plan; the pools are drawn when empty
    #[serde(default)]
    pub pools: Vec<ScriptPool>,
    #[serde(default)]
    pub encounters: Vec<Encounter>,
    #[serde(default)]
    pub eliminations: Vec<EliminationScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptTeam {
    pub name: String,
    #[serde(default)]
    pub club: Option<String>,
    /// Fencers in slot order A, B, C, D; at least two
    pub fencers: Vec<String>,
    #[serde(default = "default_checked_in")]
    pub checked_in: bool,
}

fn default_checked_in() -> bool {
    true
}

impl ScriptTeam {
    pub fn entry(&self) -> Result<TeamEntry, TournamentError> {
        if self.fencers.len() > Slot::ALL.len() {
            return Err(TournamentError::Script(format!(
                "team {} lists {} fencers, at most 4 fit",
                self.name,
                self.fencers.len()
            )));
        }
        let mut fencers: [Option<String>; 4] = Default::default();
        for (slot, name) in fencers.iter_mut().zip(&self.fencers) {
            *slot = Some(name.clone());
        }
        Ok(TeamEntry {
            name: self.name.clone(),
            club: self.club.clone(),
            fencers,
            checked_in: self.checked_in,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptPool {
    pub teams: Vec<String>,
}

/// Position bouts between two teams, in slot order A, B, C
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub teams: [String; 2],
    pub bouts: Vec<[String; 2]>,
}

/// Score of one elimination bout, addressed by round (1 = final) and match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EliminationScore {
    #[serde(default)]
    pub round: u32,
    #[serde(default, rename = "match")]
    pub match_index: usize,
    #[serde(default)]
    pub third: bool,
    pub scores: [u32; 2],
    /// Needed for level scores
    #[serde(default)]
    pub winner: Option<Side>,
}

impl EventScript {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn team_named<'a>(event: &'a Event, name: &str) -> Result<&'a Team, TournamentError> {
    event
        .team_by_name(name)
        .ok_or_else(|| TournamentError::Script(format!("no team named {name}")))
}

/// Replay a script through the engine and return the new event's id
pub fn run_script<S: RecordStore>(
    engine: &TournamentEngine<S>,
    script: &EventScript,
    config: &TournamentConfig,
) -> Result<EventId, TournamentError> {
    let config = TournamentConfig {
        seed: script.seed.or(config.seed),
        pool_count: script.pool_count.or(config.pool_count),
        ..config.clone()
    };
    let id = engine.create_event(&script.name, config.rules())?;
    for team in &script.teams {
        engine.add_team(id, team.entry()?)?;
    }

    if script.pools.is_empty() {
        let entrants = script.teams.iter().filter(|t| t.checked_in).count();
        engine.build_pools(id, config.pools_for(entrants), &mut config.rng())?;
    } else {
        let event = engine.event(id)?;
        let plan = script
            .pools
            .iter()
            .map(|pool| {
                pool.teams
                    .iter()
                    .map(|name| team_named(&event, name).map(|t| t.id))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        engine.assign_pools(id, plan)?;
    }

    let event = engine.event(id)?;
    for encounter in &script.encounters {
        let [home, away] = &encounter.teams;
        let (home, away) = (team_named(&event, home)?, team_named(&event, away)?);
        let pool = match (home.pool, away.pool) {
            (Some(a), Some(b)) if a == b => a,
            _ => {
                return Err(TournamentError::Script(format!(
                    "{} and {} are not in the same pool",
                    home.name, away.name
                )));
            }
        };
        if encounter.bouts.len() > Slot::ACTIVE.len() {
            return Err(TournamentError::Script(format!(
                "{} vs {} lists more than three bouts",
                home.name, away.name
            )));
        }
        for (slot, [raw_home, raw_away]) in Slot::ACTIVE.into_iter().zip(&encounter.bouts) {
            engine.record_pool_bout(
                id,
                pool,
                home.fencer(slot),
                away.fencer(slot),
                raw_home,
                raw_away,
            )?;
        }
    }
    for pool in &event.pools {
        engine.complete_pool(id, pool.id)?;
    }
    engine.close_pools(id)?;
    engine.generate_bracket(id)?;

    for score in &script.eliminations {
        let event = engine.event(id)?;
        let bracket = event.bracket()?;
        let de = if score.third {
            bracket.third()
        } else {
            bracket.at(score.round, score.match_index)
        }
        .ok_or_else(|| {
            TournamentError::Script(format!(
                "no elimination bout at round {} match {}",
                score.round, score.match_index
            ))
        })?;

        let mut submission = BoutSubmission::new(de.id, score.scores[0], score.scores[1]);
        if let Some(side) = score.winner {
            submission = submission.with_winner(side);
        }
        engine.submit_bout(id, &submission)?;
    }

    info!(event = %id, name = %script.name, "script replayed");
    Ok(id)
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod script_tests;
