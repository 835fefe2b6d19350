//! Presentation snapshot of the bracket.
//!
//! The tableau is derived from the elimination bouts and never read back by
//! the engine. Rows run from the earliest round to the final; the final row
//! carries the `third` cell after `match1`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::EngineError;
use crate::score::ScorePair;
use crate::seeding::{match_number, matches_in_round};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MatchLabel {
    Match(usize),
    Third,
}

impl fmt::Display for MatchLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchLabel::Match(n) => write!(f, "match{n}"),
            MatchLabel::Third => write!(f, "third"),
        }
    }
}

impl From<MatchLabel> for String {
    fn from(label: MatchLabel) -> Self {
        label.to_string()
    }
}

impl TryFrom<String> for MatchLabel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "third" {
            return Ok(MatchLabel::Third);
        }
        value
            .strip_prefix("match")
            .and_then(|n| n.parse::<usize>().ok())
            .map(MatchLabel::Match)
            .ok_or_else(|| format!("invalid match label '{value}'"))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableauCell {
    pub score_a: Option<u32>,
    pub score_b: Option<u32>,
    pub label: MatchLabel,
}

impl TableauCell {
    fn empty(label: MatchLabel) -> Self {
        Self {
            score_a: None,
            score_b: None,
            label,
        }
    }

    pub fn is_scored(&self) -> bool {
        self.score_a.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tableau {
    /// First-round pairings as display names, `None` for a bye
    pub teams: Vec<[Option<String>; 2]>,
    /// Cells by round, earliest round first
    pub results: Vec<Vec<TableauCell>>,
}

impl Tableau {
    /// Empty grid for a bracket with `rounds` rounds
    pub fn new(rounds: u32, teams: Vec<[Option<String>; 2]>) -> Self {
        let results = (1..=rounds)
            .rev()
            .map(|round| {
                let mut row: Vec<TableauCell> = (0..matches_in_round(round))
                    .map(|m| TableauCell::empty(MatchLabel::Match(match_number(round, m))))
                    .collect();
                if round == 1 {
                    row.push(TableauCell::empty(MatchLabel::Third));
                }
                row
            })
            .collect();
        Self { teams, results }
    }

    pub fn rounds(&self) -> u32 {
        self.results.len() as u32
    }

    fn row(&self, round: u32) -> Option<usize> {
        let rounds = self.results.len();
        let round = round as usize;
        (1..=rounds).contains(&round).then(|| rounds - round)
    }

    pub fn cell(&self, round: u32, match_index: usize) -> Option<&TableauCell> {
        self.row(round)
            .and_then(|row| self.results[row].get(match_index))
            .filter(|cell| cell.label != MatchLabel::Third)
    }

    pub fn third(&self) -> Option<&TableauCell> {
        self.results
            .last()
            .and_then(|row| row.iter().find(|cell| cell.label == MatchLabel::Third))
    }

    /// Write the score of a bracket bout into its cell
    pub fn record(&mut self, round: u32, match_index: usize, pair: ScorePair) -> Result<(), EngineError> {
        let row = self.row(round).ok_or_else(|| {
            EngineError::InconsistentBracket(format!("tableau has no round {round}"))
        })?;
        let cell = self.results[row]
            .get_mut(match_index)
            .filter(|cell| cell.label != MatchLabel::Third)
            .ok_or_else(|| {
                EngineError::InconsistentBracket(format!(
                    "tableau round {round} has no match {match_index}"
                ))
            })?;
        cell.score_a = Some(pair.first);
        cell.score_b = Some(pair.second);
        Ok(())
    }

    pub fn record_third(&mut self, pair: ScorePair) -> Result<(), EngineError> {
        let cell = self
            .results
            .last_mut()
            .and_then(|row| row.iter_mut().find(|cell| cell.label == MatchLabel::Third))
            .ok_or_else(|| EngineError::InconsistentBracket("tableau has no third cell".into()))?;
        cell.score_a = Some(pair.first);
        cell.score_b = Some(pair.second);
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
#[path = "tableau_tests.rs"]
mod tableau_tests;
