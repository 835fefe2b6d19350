//! Error kinds raised by the progression engine

use thiserror::Error;

use crate::event::Stage;
use crate::types::{DeId, FencerId, PoolId, TeamId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Malformed or rule-violating score pair
    #[error("invalid score: {0}")]
    InvalidScore(String),

    /// Equal scores submitted without a designated winner
    #[error("bout {0} ended level and no winner was designated")]
    AmbiguousTie(DeId),

    /// Bout still missing a competitor
    #[error("bout {0} is still waiting for a competitor")]
    NotReady(DeId),

    /// Bout already finished or decided by a bye
    #[error("bout {0} has already been decided")]
    BoutClosed(DeId),

    /// Internal invariant violation; the whole operation is discarded
    #[error("inconsistent bracket: {0}")]
    InconsistentBracket(String),

    #[error("operation requires stage {expected:?} but event is in {actual:?}")]
    WrongStage { expected: Stage, actual: Stage },

    #[error("a bracket needs at least 2 entrants, got {0}")]
    TooFewEntrants(usize),

    #[error("unknown bout {0}")]
    UnknownDe(DeId),

    #[error("unknown team {0}")]
    UnknownTeam(TeamId),

    #[error("unknown fencer {0}")]
    UnknownFencer(FencerId),

    #[error("unknown pool {0}")]
    UnknownPool(PoolId),

    #[error("bout between {0} and {1} was already recorded")]
    DuplicateBout(FencerId, FencerId),

    #[error("pool {0} is already complete")]
    PoolClosed(u32),

    #[error("pool {pool} is missing {missing} bouts")]
    PoolIncomplete { pool: u32, missing: usize },

    #[error("invalid pool plan: {0}")]
    InvalidPoolPlan(String),

    #[error("invalid roster: {0}")]
    InvalidRoster(String),
}

impl EngineError {
    /// Local validation failures leave the event untouched and are safe to
    /// report back to the caller. Everything else points at a broken bracket.
    pub fn is_validation(&self) -> bool {
        !matches!(self, EngineError::InconsistentBracket(_))
    }
}
