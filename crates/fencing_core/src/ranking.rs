//! Pool ranking with deterministic tie-breaks.
//!
//! Entries are ordered by win percentage, then indicator, then touches scored,
//! all descending. Entries equal on every key form a tie group that shares one
//! place label (`3T`), and the next place skips past the whole group.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::types::Stats;

/// Victories over bouts fenced, compared exactly.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct WinRate {
    pub victories: u32,
    pub bouts: u32,
}

impl WinRate {
    /// Win rate for a member of a pool with `pool_size` members
    pub fn new(victories: u32, pool_size: usize) -> Self {
        Self {
            victories,
            bouts: pool_size.saturating_sub(1) as u32,
        }
    }

    pub fn as_f64(&self) -> f64 {
        if self.bouts == 0 {
            return 0.0;
        }
        f64::from(self.victories) / f64::from(self.bouts)
    }

    fn fraction(&self) -> (u64, u64) {
        if self.bouts == 0 {
            (0, 1)
        } else {
            (u64::from(self.victories), u64::from(self.bouts))
        }
    }
}

impl Ord for WinRate {
    fn cmp(&self, other: &Self) -> Ordering {
        let (n1, d1) = self.fraction();
        let (n2, d2) = other.fraction();
        (n1 * d2).cmp(&(n2 * d1))
    }
}

impl PartialOrd for WinRate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for WinRate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for WinRate {}

/// Composite ranking key. Field order is the tie-break order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RankKey {
    pub win_rate: WinRate,
    pub indicator: i32,
    pub touches_scored: u32,
}

impl RankKey {
    pub fn new(stats: &Stats, pool_size: usize) -> Self {
        Self {
            win_rate: WinRate::new(stats.victories, pool_size),
            indicator: stats.indicator(),
            touches_scored: stats.touches_scored,
        }
    }
}

/// A place, either held alone or shared with a tie group
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PlaceLabel {
    Outright(u32),
    Tied(u32),
}

impl PlaceLabel {
    pub fn place(&self) -> u32 {
        match *self {
            PlaceLabel::Outright(p) | PlaceLabel::Tied(p) => p,
        }
    }

    pub fn is_tied(&self) -> bool {
        matches!(self, PlaceLabel::Tied(_))
    }
}

impl fmt::Display for PlaceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceLabel::Outright(p) => write!(f, "{p}"),
            PlaceLabel::Tied(p) => write!(f, "{p}T"),
        }
    }
}

impl From<PlaceLabel> for String {
    fn from(label: PlaceLabel) -> Self {
        label.to_string()
    }
}

impl TryFrom<String> for PlaceLabel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let (digits, tied) = match value.strip_suffix('T') {
            Some(rest) => (rest, true),
            None => (value.as_str(), false),
        };
        let place = digits
            .parse::<u32>()
            .map_err(|_| format!("invalid place label '{value}'"))?;
        Ok(if tied {
            PlaceLabel::Tied(place)
        } else {
            PlaceLabel::Outright(place)
        })
    }
}

/// Assign place labels to keys that are already sorted best-first, starting
/// at place `first`.
///
/// Consecutive equal keys form a tie group. The running count advances by the
/// size of each group.
pub fn assign_places_from<K: PartialEq>(keys: &[K], first: u32) -> Vec<PlaceLabel> {
    let mut labels = Vec::with_capacity(keys.len());
    let mut start = 0;
    while start < keys.len() {
        let mut end = start + 1;
        while end < keys.len() && keys[end] == keys[start] {
            end += 1;
        }
        let place = first + start as u32;
        let label = if end - start == 1 {
            PlaceLabel::Outright(place)
        } else {
            PlaceLabel::Tied(place)
        };
        labels.extend(std::iter::repeat_n(label, end - start));
        start = end;
    }
    labels
}

pub fn assign_places<K: PartialEq>(keys: &[K]) -> Vec<PlaceLabel> {
    assign_places_from(keys, 1)
}

/// An entry with its key and place
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub entry: T,
    pub key: RankKey,
    pub place: PlaceLabel,
}

/// Rank entries by descending key. The sort is stable, so entries with equal
/// keys keep their input order.
pub fn rank_entries<T>(mut entries: Vec<(T, RankKey)>) -> Vec<Ranked<T>> {
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    let keys: Vec<RankKey> = entries.iter().map(|(_, key)| *key).collect();
    let places = assign_places(&keys);
    entries
        .into_iter()
        .zip(places)
        .map(|((entry, key), place)| Ranked { entry, key, place })
        .collect()
}

#[cfg(test)]
#[path = "ranking_tests.rs"]
mod ranking_tests;
