//! Bout score validation.
//!
//! Raw scores arrive as text from score sheets. Elimination bouts use bare
//! integers; pool sheets may also use victory/defeat notation (`V`, `V4`, `D3`).

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// One of the two competitors of a bout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }
}

/// A validated pair of touch counts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePair {
    pub first: u32,
    pub second: u32,
}

impl ScorePair {
    /// Side with more touches, None when level
    pub fn leader(&self) -> Option<Side> {
        match self.first.cmp(&self.second) {
            std::cmp::Ordering::Greater => Some(Side::First),
            std::cmp::Ordering::Less => Some(Side::Second),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn margin(&self) -> u32 {
        self.first.abs_diff(self.second)
    }

    pub fn touches(&self, side: Side) -> u32 {
        match side {
            Side::First => self.first,
            Side::Second => self.second,
        }
    }
}

/// Parse a raw touch count
pub fn parse_touches(raw: &str) -> Result<u32, EngineError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<u32>()
        .map_err(|_| EngineError::InvalidScore(format!("'{trimmed}' is not a touch count")))
}

/// Check two touch counts against the touch target.
///
/// Level scores are returned without a leader; the caller decides whether a
/// designated winner is available.
pub fn validate_touches(first: u32, second: u32, target: u32) -> Result<ScorePair, EngineError> {
    if first > target || second > target {
        return Err(EngineError::InvalidScore(format!(
            "{first}-{second} exceeds the {target} touch target"
        )));
    }
    if first == target && second == target {
        return Err(EngineError::InvalidScore(format!(
            "both sides cannot reach {target}"
        )));
    }
    Ok(ScorePair { first, second })
}

/// Parse and check a raw score pair
pub fn validate_pair(raw_first: &str, raw_second: &str, target: u32) -> Result<ScorePair, EngineError> {
    let first = parse_touches(raw_first)?;
    let second = parse_touches(raw_second)?;
    validate_touches(first, second, target)
}

/// A pool sheet entry: touches plus an optional victory/defeat mark
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolScore {
    pub touches: u32,
    /// Some(true) for `V`, Some(false) for `D`, None for a bare number
    pub victory: Option<bool>,
}

impl PoolScore {
    /// Parse `V`, `V<n>`, `D<n>` or a bare integer. A lone `V` means a
    /// victory at the touch target.
    pub fn parse(raw: &str, target: u32) -> Result<Self, EngineError> {
        let trimmed = raw.trim();
        let mut chars = trimmed.chars();
        match chars.next() {
            Some('V' | 'v') => {
                let rest = chars.as_str();
                let touches = if rest.is_empty() {
                    target
                } else {
                    parse_touches(rest)?
                };
                Ok(Self {
                    touches,
                    victory: Some(true),
                })
            }
            Some('D' | 'd') => Ok(Self {
                touches: parse_touches(chars.as_str())?,
                victory: Some(false),
            }),
            _ => Ok(Self {
                touches: parse_touches(trimmed)?,
                victory: None,
            }),
        }
    }
}

/// Validate a pool bout and return the score pair with its winner.
pub fn validate_pool_pair(
    raw_first: &str,
    raw_second: &str,
    target: u32,
) -> Result<(ScorePair, Side), EngineError> {
    let first = PoolScore::parse(raw_first, target)?;
    let second = PoolScore::parse(raw_second, target)?;
    let pair = validate_touches(first.touches, second.touches, target)?;

    let winner = match (first.victory, second.victory) {
        (None, None) => pair.leader().ok_or_else(|| {
            EngineError::InvalidScore(format!(
                "{}-{} is level; mark the victor with V",
                pair.first, pair.second
            ))
        })?,
        (Some(true), Some(false)) => Side::First,
        (Some(false), Some(true)) => Side::Second,
        _ => {
            return Err(EngineError::InvalidScore(format!(
                "'{}' and '{}' must mark exactly one victory and one defeat",
                raw_first.trim(),
                raw_second.trim()
            )));
        }
    };

    if pair.touches(winner) < pair.touches(winner.other()) {
        return Err(EngineError::InvalidScore(format!(
            "victor scored fewer touches ({}-{})",
            pair.first, pair.second
        )));
    }
    Ok((pair, winner))
}

#[cfg(test)]
#[path = "score_tests.rs"]
mod score_tests;
