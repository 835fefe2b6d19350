//! Tournament runner for fencing team events
//!
//! This crate wraps the `fencing_core` progression engine with:
//! - A record store abstraction (in memory or one JSON file per event)
//! - A single-writer engine that serializes mutations per event
//! - TOML configuration and scripted event replay
//! - Text and JSON reports
//!
//! # Usage
//!
//! ```bash
//! # Replay a scripted event and print the report
//! cargo run -p tournament -- run demos/six_team_foil.toml
//!
//! # Keep the event records and show one later
//! cargo run -p tournament -- run demos/six_team_foil.toml --state-dir events
//! cargo run -p tournament -- show events/<event id>.json --json
//! ```

mod config;
mod engine;
mod error;
pub mod logging;
mod report;
mod script;
mod store;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use report::*;
pub use script::*;
pub use store::*;
