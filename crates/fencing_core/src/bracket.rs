//! Elimination bracket construction.
//!
//! The bracket is an explicit tree: every bout knows the bout its winner
//! feeds (and, for semifinals, the bout its loser feeds), so advancing never
//! depends on where a bout happens to sit in a list.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::score::{ScorePair, Side};
use crate::seeding::{
    bracket_size, match_number, matches_in_round, next_position, round_count, seed_order,
    third_place_side,
};
use crate::tableau::{MatchLabel, Tableau};
use crate::types::{DeId, TeamId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeState {
    /// Missing at least one competitor
    NotReady,
    /// Both competitors known, waiting for a score
    Ready,
    InProgress,
    Finished,
    /// Decided without a bout
    Bye,
}

impl DeState {
    /// Still needs a bout before the event can finish
    pub fn is_open(self) -> bool {
        matches!(self, DeState::NotReady | DeState::Ready | DeState::InProgress)
    }
}

/// Destination slot in another bout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub de: DeId,
    pub side: Side,
}

/// A single elimination bout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct De {
    pub id: DeId,
    /// 1 = final, counting up toward the earliest round
    pub round: u32,
    pub match_index: usize,
    pub is_third: bool,
    pub first: Option<TeamId>,
    pub second: Option<TeamId>,
    pub scores: Option<ScorePair>,
    pub winner: Option<Side>,
    pub state: DeState,
    pub winner_to: Option<Link>,
    pub loser_to: Option<Link>,
    /// Sides that will never be filled because their feeder was a bye
    #[serde(default)]
    pub vacant: Vec<Side>,
}

impl De {
    fn new(round: u32, match_index: usize, is_third: bool) -> Self {
        Self {
            id: DeId::new(),
            round,
            match_index,
            is_third,
            first: None,
            second: None,
            scores: None,
            winner: None,
            state: DeState::NotReady,
            winner_to: None,
            loser_to: None,
            vacant: Vec::new(),
        }
    }

    pub fn slot(&self, side: Side) -> Option<TeamId> {
        match side {
            Side::First => self.first,
            Side::Second => self.second,
        }
    }

    fn slot_mut(&mut self, side: Side) -> &mut Option<TeamId> {
        match side {
            Side::First => &mut self.first,
            Side::Second => &mut self.second,
        }
    }

    /// Both competitors, once known
    pub fn competitors(&self) -> Option<(TeamId, TeamId)> {
        Some((self.first?, self.second?))
    }

    pub fn winner_team(&self) -> Option<TeamId> {
        self.slot(self.winner?)
    }

    pub fn loser_team(&self) -> Option<TeamId> {
        self.slot(self.winner?.other())
    }

    pub fn is_final(&self) -> bool {
        self.round == 1 && !self.is_third
    }

    pub fn is_semifinal(&self) -> bool {
        self.round == 2 && !self.is_third
    }

    pub fn label(&self) -> MatchLabel {
        if self.is_third {
            MatchLabel::Third
        } else {
            MatchLabel::Match(match_number(self.round, self.match_index))
        }
    }
}

/// What happened to a bout whose slots were just re-examined
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readiness {
    Waiting,
    BecameReady,
    /// Every open side is vacant; the lone competitor (if any) wins by bye
    BecameBye(Option<TeamId>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    /// Number of leaf slots, a power of two
    pub size: usize,
    pub rounds: u32,
    /// Direct entrants in seed order; seed 1 first
    pub seeds: Vec<TeamId>,
    /// Final first, then each round toward the earliest; third-place bout last
    pub des: Vec<De>,
}

impl Bracket {
    /// Build the bracket for direct entrants given in seed order.
    ///
    /// Seeds without an opponent get a bye and move straight into the next
    /// round.
    pub fn build(seeds: Vec<TeamId>) -> Result<Self, EngineError> {
        let entrants = seeds.len();
        if entrants < 2 {
            return Err(EngineError::TooFewEntrants(entrants));
        }
        let size = bracket_size(entrants);
        let rounds = round_count(size);

        let mut des: Vec<De> = (1..=rounds)
            .flat_map(|round| (0..matches_in_round(round)).map(move |m| De::new(round, m, false)))
            .collect();
        let mut third = De::new(1, 1, true);
        if rounds == 1 {
            third.vacant = vec![Side::First, Side::Second];
        }
        let third_id = third.id;

        for i in 0..des.len() {
            let (round, m) = (des[i].round, des[i].match_index);
            if let Some((next_round, next_match, side)) = next_position(round, m) {
                let target = des[match_number(next_round, next_match) - 1].id;
                des[i].winner_to = Some(Link { de: target, side });
            }
            if round == 2 {
                des[i].loser_to = Some(Link {
                    de: third_id,
                    side: third_place_side(m),
                });
            }
        }
        des.push(third);

        let mut bracket = Self {
            size,
            rounds,
            seeds,
            des,
        };

        let order = seed_order(size);
        for (m, pair) in order.chunks(2).enumerate() {
            let first = bracket.seeds[pair[0] - 1];
            let second = bracket.seeds.get(pair[1] - 1).copied();
            let idx = match_number(rounds, m) - 1;
            let de = &mut bracket.des[idx];
            de.first = Some(first);
            de.second = second;
            if second.is_some() {
                de.state = DeState::Ready;
                continue;
            }

            de.state = DeState::Bye;
            de.winner = Some(Side::First);
            let (winner_to, loser_to) = (de.winner_to, de.loser_to);
            if let Some(link) = winner_to {
                bracket.place(link, first)?;
            }
            if let Some(link) = loser_to {
                bracket.de_mut(link.de)?.vacant.push(link.side);
            }
        }

        let pending: Vec<DeId> = bracket
            .des
            .iter()
            .filter(|de| de.state == DeState::NotReady)
            .map(|de| de.id)
            .collect();
        for id in pending {
            bracket.refresh(id)?;
        }
        Ok(bracket)
    }

    pub fn de(&self, id: DeId) -> Result<&De, EngineError> {
        self.des
            .iter()
            .find(|de| de.id == id)
            .ok_or(EngineError::UnknownDe(id))
    }

    pub(crate) fn de_mut(&mut self, id: DeId) -> Result<&mut De, EngineError> {
        self.des
            .iter_mut()
            .find(|de| de.id == id)
            .ok_or(EngineError::UnknownDe(id))
    }

    /// Bracket bout at a position; never the third-place bout
    pub fn at(&self, round: u32, match_index: usize) -> Option<&De> {
        self.des
            .iter()
            .find(|de| !de.is_third && de.round == round && de.match_index == match_index)
    }

    pub fn final_bout(&self) -> Option<&De> {
        self.at(1, 0)
    }

    pub fn third(&self) -> Option<&De> {
        self.des.iter().find(|de| de.is_third)
    }

    /// Bouts of a round in match order, third-place bout excluded
    pub fn round(&self, round: u32) -> impl Iterator<Item = &De> {
        self.des
            .iter()
            .filter(move |de| de.round == round && !de.is_third)
    }

    /// 1-based seed of a direct entrant
    pub fn seed_of(&self, team: TeamId) -> Option<usize> {
        self.seeds.iter().position(|&t| t == team).map(|i| i + 1)
    }

    pub fn byes(&self) -> usize {
        self.des.iter().filter(|de| de.state == DeState::Bye && !de.is_third).count()
    }

    /// No bout is waiting for a competitor or a score
    pub fn is_complete(&self) -> bool {
        self.des.iter().all(|de| !de.state.is_open())
    }

    /// Put a team into a slot. Re-placing the same team is a no-op; any other
    /// occupant means the tree is broken.
    pub(crate) fn place(&mut self, link: Link, team: TeamId) -> Result<(), EngineError> {
        let de = self.de_mut(link.de)?;
        if de.state != DeState::NotReady {
            return Err(EngineError::InconsistentBracket(format!(
                "bout {} is {:?} and cannot take new competitors",
                de.id, de.state
            )));
        }
        if de.vacant.contains(&link.side) {
            return Err(EngineError::InconsistentBracket(format!(
                "bout {} has a vacant {:?} slot",
                de.id, link.side
            )));
        }
        let slot = de.slot_mut(link.side);
        match *slot {
            None => {
                *slot = Some(team);
                Ok(())
            }
            Some(existing) if existing == team => Ok(()),
            Some(existing) => Err(EngineError::InconsistentBracket(format!(
                "bout {} slot {:?} already holds {existing}, cannot place {team}",
                link.de, link.side
            ))),
        }
    }

    /// Re-examine a waiting bout after one of its slots changed.
    pub(crate) fn refresh(&mut self, id: DeId) -> Result<Readiness, EngineError> {
        let de = self.de_mut(id)?;
        if de.state != DeState::NotReady {
            return Ok(Readiness::Waiting);
        }
        if de.competitors().is_some() {
            de.state = DeState::Ready;
            return Ok(Readiness::BecameReady);
        }
        let open_sides_vacant = [Side::First, Side::Second]
            .into_iter()
            .filter(|&side| de.slot(side).is_none())
            .all(|side| de.vacant.contains(&side));
        if !open_sides_vacant {
            return Ok(Readiness::Waiting);
        }
        de.state = DeState::Bye;
        let lone = if de.first.is_some() {
            Some(Side::First)
        } else if de.second.is_some() {
            Some(Side::Second)
        } else {
            None
        };
        de.winner = lone;
        Ok(Readiness::BecameBye(lone.and_then(|side| de.slot(side))))
    }

    /// Empty tableau with first-round pairings labelled `Name (seed)`
    pub fn initial_tableau<F>(&self, name_of: F) -> Tableau
    where
        F: Fn(TeamId) -> String,
    {
        let label = |team: Option<TeamId>| {
            team.map(|t| {
                let seed = self.seed_of(t).unwrap_or_default();
                format!("{} ({seed})", name_of(t))
            })
        };
        let pairings = self
            .round(self.rounds)
            .map(|de| [label(de.first), label(de.second)])
            .collect();
        Tableau::new(self.rounds, pairings)
    }
}

#[cfg(test)]
#[path = "bracket_tests.rs"]
mod bracket_tests;
