//! Event reports for the CLI

use std::path::Path;

use fencing_core::{DeState, Event, MatchLabel, RankingRow, Stage, Standing};
use serde::{Deserialize, Serialize};

/// Everything a spectator sees of one event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventReport {
    pub name: String,
    pub stage: Stage,
    pub teams: usize,
    pub ranking: Vec<RankingRow>,
    pub bouts: Vec<BoutLine>,
    pub standings: Vec<Standing>,
}

/// One elimination bout as shown in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoutLine {
    pub label: MatchLabel,
    pub round: u32,
    pub first: Option<String>,
    pub second: Option<String>,
    pub score: Option<(u32, u32)>,
    pub state: DeState,
}

impl EventReport {
    pub fn from_event(event: &Event) -> Self {
        let name_of = |team: Option<fencing_core::TeamId>| {
            team.and_then(|id| event.team(id).ok()).map(|t| t.name.clone())
        };
        let mut bouts: Vec<BoutLine> = event
            .bracket
            .iter()
            .flat_map(|bracket| bracket.des.iter())
            .map(|de| BoutLine {
                label: de.label(),
                round: de.round,
                first: name_of(de.first),
                second: name_of(de.second),
                score: de.scores.map(|s| (s.first, s.second)),
                state: de.state,
            })
            .collect();
        // Earliest round first, like the tableau
        bouts.sort_by_key(|b| std::cmp::Reverse(b.round));

        Self {
            name: event.name.clone(),
            stage: event.stage,
            teams: event.teams.len(),
            ranking: event.pool_ranking(),
            bouts,
            standings: event.standings(),
        }
    }

    /// Save report to JSON file
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize: {}", e))?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write: {}", e))
    }

    /// Load report from JSON file
    pub fn load(path: &Path) -> Result<Self, String> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| format!("Failed to read: {}", e))?;
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse: {}", e))
    }

    /// Generate a text report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();
        report.push_str(&format!("=== Event: {} ===\n\n", self.name));
        report.push_str(&format!("Stage: {:?}, {} teams\n\n", self.stage, self.teams));

        if !self.ranking.is_empty() {
            report.push_str("Pool ranking:\n");
            report.push_str(&format!(
                "{:<5} {:<24} {:>4} {:>6} {:>5} {:>5}\n",
                "Place", "Team", "Pool", "Win%", "Ind", "TS"
            ));
            report.push_str(&"-".repeat(54));
            report.push('\n');
            for row in &self.ranking {
                report.push_str(&format!(
                    "{:<5} {:<24} {:>4} {:>5.1}% {:>+5} {:>5}\n",
                    row.place.to_string(),
                    row.name,
                    row.pool,
                    row.win_rate * 100.0,
                    row.indicator,
                    row.touches_scored
                ));
            }
            report.push('\n');
        }

        let fenced: Vec<&BoutLine> = self
            .bouts
            .iter()
            .filter(|b| b.state != DeState::Bye || b.first.is_some() || b.second.is_some())
            .collect();
        if !fenced.is_empty() {
            report.push_str("Eliminations:\n");
            for bout in fenced {
                let first = bout.first.as_deref().unwrap_or("-");
                let second = bout.second.as_deref().unwrap_or("-");
                let result = match (bout.state, bout.score) {
                    (_, Some((a, b))) => format!("{a:>2}-{b:<2}"),
                    (DeState::Bye, _) => "bye".to_string(),
                    _ => String::new(),
                };
                report.push_str(&format!(
                    "{:<8} {:<24} {:<6} {:<24}\n",
                    bout.label.to_string(),
                    first,
                    result,
                    second
                ));
            }
            report.push('\n');
        }

        if !self.standings.is_empty() {
            report.push_str("Standings:\n");
            for standing in &self.standings {
                report.push_str(&format!("{:>4}  {}\n", standing.label.to_string(), standing.name));
            }
        }

        report
    }

    /// Print report to stdout
    pub fn print_report(&self) {
        println!("{}", self.generate_report());
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod report_tests;
