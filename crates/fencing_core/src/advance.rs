//! Elimination bout submission.
//!
//! A submission is validated against the bout first; nothing changes when
//! validation fails. The outcome is then applied to a working copy of the
//! event, which replaces the event only if every step succeeds, so a
//! submission is never half-applied.

use serde::{Deserialize, Serialize};

use crate::bracket::{De, DeState, Readiness};
use crate::error::EngineError;
use crate::event::{Event, Stage, assign_place};
use crate::placement::{Placement, round_is_complete, round_places};
use crate::ranking::PlaceLabel;
use crate::score::{ScorePair, Side, validate_pair};
use crate::types::{DeId, Team, TeamId};

/// A score sheet for one elimination bout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoutSubmission {
    pub de: DeId,
    pub score_a: String,
    pub score_b: String,
    /// Required when the scores are level
    #[serde(default)]
    pub winner: Option<Side>,
}

impl BoutSubmission {
    pub fn new(de: DeId, score_a: u32, score_b: u32) -> Self {
        Self {
            de,
            score_a: score_a.to_string(),
            score_b: score_b.to_string(),
            winner: None,
        }
    }

    #[must_use]
    pub fn with_winner(mut self, side: Side) -> Self {
        self.winner = Some(side);
        self
    }
}

/// Everything a submission changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoutOutcome {
    pub de: DeId,
    pub round: u32,
    pub is_third: bool,
    pub scores: ScorePair,
    pub winner: TeamId,
    pub loser: TeamId,
    /// Bouts that received their second competitor
    pub now_ready: Vec<DeId>,
    /// Places decided by this submission
    pub placements: Vec<Placement>,
    /// Round whose losers were placed
    pub resolved_round: Option<u32>,
    pub event_complete: bool,
}

/// Check a submission against its bout without touching anything.
///
/// Returns the score pair and the winning side.
pub fn validate_submission(
    de: &De,
    submission: &BoutSubmission,
    target: u32,
) -> Result<(ScorePair, Side), EngineError> {
    match de.state {
        DeState::Ready | DeState::InProgress => {}
        DeState::NotReady => return Err(EngineError::NotReady(de.id)),
        DeState::Finished | DeState::Bye => return Err(EngineError::BoutClosed(de.id)),
    }
    if de.competitors().is_none() {
        return Err(EngineError::NotReady(de.id));
    }

    let pair = validate_pair(&submission.score_a, &submission.score_b, target)?;
    let winner = match (pair.leader(), submission.winner) {
        (Some(leader), None) => leader,
        (Some(leader), Some(designated)) if leader == designated => leader,
        (Some(_), Some(_)) => {
            return Err(EngineError::InvalidScore(format!(
                "designated winner trails {}-{}",
                pair.first, pair.second
            )));
        }
        (None, Some(designated)) => designated,
        (None, None) => return Err(EngineError::AmbiguousTie(de.id)),
    };
    Ok((pair, winner))
}

impl Event {
    /// Apply one elimination bout result.
    pub fn submit_bout(&mut self, submission: &BoutSubmission) -> Result<BoutOutcome, EngineError> {
        self.require_stage(Stage::Eliminations)?;
        let de = self.bracket()?.de(submission.de)?;
        let (scores, winner) = validate_submission(de, submission, self.rules.de_touches)?;

        let mut next = self.clone();
        let outcome = next.apply_bout(submission.de, scores, winner)?;
        *self = next;
        Ok(outcome)
    }

    fn apply_bout(&mut self, id: DeId, scores: ScorePair, side: Side) -> Result<BoutOutcome, EngineError> {
        let Event {
            bracket,
            tableau,
            teams,
            stage,
            ..
        } = self;
        let bracket = bracket
            .as_mut()
            .ok_or_else(|| EngineError::InconsistentBracket("event has no bracket".into()))?;
        let tableau = tableau
            .as_mut()
            .ok_or_else(|| EngineError::InconsistentBracket("event has no tableau".into()))?;

        let de = bracket.de_mut(id)?;
        de.scores = Some(scores);
        de.winner = Some(side);
        de.state = DeState::Finished;
        let (winner, loser) = de
            .winner_team()
            .zip(de.loser_team())
            .ok_or_else(|| EngineError::InconsistentBracket(format!("bout {id} lost a competitor")))?;
        let (round, match_index, is_third) = (de.round, de.match_index, de.is_third);
        let (winner_to, loser_to) = (de.winner_to, de.loser_to);

        let mut outcome = BoutOutcome {
            de: id,
            round,
            is_third,
            scores,
            winner,
            loser,
            now_ready: Vec::new(),
            placements: Vec::new(),
            resolved_round: None,
            event_complete: false,
        };

        if is_third {
            tableau.record_third(scores)?;
            place(teams, &mut outcome, winner, 3)?;
            place(teams, &mut outcome, loser, 4)?;
        } else if round == 1 {
            tableau.record(round, match_index, scores)?;
            for team in [winner, loser] {
                team_mut(teams, team)?.round_eliminated_in = Some(1);
            }
            place(teams, &mut outcome, winner, 1)?;
            place(teams, &mut outcome, loser, 2)?;
        } else {
            tableau.record(round, match_index, scores)?;
            let eliminated = team_mut(teams, loser)?;
            eliminated.round_eliminated_in = Some(round);
            eliminated.de_indicator = Some(scores.margin());

            let link = winner_to.ok_or_else(|| {
                EngineError::InconsistentBracket(format!("bout {id} in round {round} feeds nothing"))
            })?;
            bracket.place(link, winner)?;
            if bracket.refresh(link.de)? == Readiness::BecameReady {
                outcome.now_ready.push(link.de);
            }

            if let Some(link) = loser_to {
                bracket.place(link, loser)?;
                match bracket.refresh(link.de)? {
                    Readiness::BecameReady => outcome.now_ready.push(link.de),
                    // The other semifinal was a bye: third place without a bout
                    Readiness::BecameBye(Some(team)) => place(teams, &mut outcome, team, 3)?,
                    Readiness::BecameBye(None) | Readiness::Waiting => {}
                }
            }

            if round >= 3 && round_is_complete(bracket, teams, round) {
                for placement in round_places(bracket, round) {
                    assign_place(teams, placement.team, placement.place.place())?;
                    outcome.placements.push(placement);
                }
                outcome.resolved_round = Some(round);
            }
        }

        if bracket.is_complete() {
            *stage = Stage::Finished;
            outcome.event_complete = true;
        }
        Ok(outcome)
    }
}

fn team_mut(teams: &mut [Team], id: TeamId) -> Result<&mut Team, EngineError> {
    teams
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or(EngineError::UnknownTeam(id))
}

fn place(teams: &mut [Team], outcome: &mut BoutOutcome, team: TeamId, place: u32) -> Result<(), EngineError> {
    assign_place(teams, team, place)?;
    outcome.placements.push(Placement {
        team,
        place: PlaceLabel::Outright(place),
    });
    Ok(())
}

#[cfg(test)]
#[path = "advance_tests.rs"]
mod advance_tests;
