//! Progression engine for fencing team events
//!
//! This crate provides the pure domain logic for:
//! - Validating bout scores
//! - Building pools and ranking teams after round-robin play
//! - Seeding and building the single-elimination bracket
//! - Advancing the bracket bout by bout
//! - Resolving final placements, ties included
//!
//! Everything here is synchronous and free of I/O. The [`Event`] aggregate owns
//! the whole record graph of one event; the `tournament` crate serializes
//! access to it and persists it.

pub mod advance;
pub mod bracket;
pub mod error;
pub mod event;
pub mod placement;
pub mod pool;
pub mod ranking;
pub mod score;
pub mod seeding;
pub mod tableau;
pub mod types;

pub use advance::*;
pub use bracket::*;
pub use error::*;
pub use event::*;
pub use placement::*;
pub use pool::*;
pub use ranking::*;
pub use score::*;
pub use seeding::*;
pub use tableau::*;
pub use types::*;
