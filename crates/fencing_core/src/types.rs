//! Record types shared by every stage of an event

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of an event (one weapon's team competition)
    EventId
);
id_type!(TeamId);
id_type!(FencerId);
id_type!(PoolId);
id_type!(
    /// Identifier of a single elimination bout
    DeId
);

/// Position of a fencer inside a team.
///
/// A, B and C fence in pools; D is the reserve slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Slot {
    A,
    B,
    C,
    D,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::A, Slot::B, Slot::C, Slot::D];
    /// Positions that fence in the individual sub-pools
    pub const ACTIVE: [Slot; 3] = [Slot::A, Slot::B, Slot::C];

    pub fn idx(self) -> usize {
        match self {
            Slot::A => 0,
            Slot::B => 1,
            Slot::C => 2,
            Slot::D => 3,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Slot::A => 'A',
            Slot::B => 'B',
            Slot::C => 'C',
            Slot::D => 'D',
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Aggregate bout statistics for a team or a fencer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub victories: u32,
    pub touches_scored: u32,
    pub touches_received: u32,
}

impl Stats {
    /// Touches scored minus touches received
    pub fn indicator(&self) -> i32 {
        self.touches_scored as i32 - self.touches_received as i32
    }

    /// Returns the stats after one more bout. The prior value is untouched.
    #[must_use]
    pub fn with_bout(self, scored: u32, received: u32, won: bool) -> Self {
        Self {
            victories: self.victories + u32::from(won),
            touches_scored: self.touches_scored + scored,
            touches_received: self.touches_received + received,
        }
    }

    #[must_use]
    pub fn with_victory(self) -> Self {
        Self {
            victories: self.victories + 1,
            ..self
        }
    }
}

/// A team entered in an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub club: Option<String>,
    pub checked_in: bool,
    /// Fencers in slot order A, B, C, D
    pub fencers: [FencerId; 4],
    pub stats: Stats,
    pub pool: Option<PoolId>,
    /// 1-based final rank; teams sharing a value are tied
    pub final_place: Option<u32>,
    /// Bracket round the team lost in (1 = final)
    pub round_eliminated_in: Option<u32>,
    /// Margin of the defeat that eliminated the team
    pub de_indicator: Option<u32>,
}

impl Team {
    pub fn fencer(&self, slot: Slot) -> FencerId {
        self.fencers[slot.idx()]
    }
}

/// A fencer on a team roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fencer {
    pub id: FencerId,
    pub team: TeamId,
    pub slot: Slot,
    /// Empty for a placeholder that only fills the four-person team shape
    pub name: String,
    pub stats: Stats,
    pub pool: Option<PoolId>,
}

impl Fencer {
    pub fn is_placeholder(&self) -> bool {
        self.name.is_empty()
    }
}

/// Competition rules that parameterize validation and seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Touches needed to win a pool bout
    pub pool_touches: u32,
    /// Touches needed to win an elimination bout
    pub de_touches: u32,
    /// Number of ranked teams that enter the bracket directly
    pub direct_entry_limit: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            pool_touches: 5,
            de_touches: 15,
            direct_entry_limit: 12,
        }
    }
}
