//! Session protocol handling.
//!
//! The command parser for the stdin session loop, and JSON snapshots for
//! game state and action batches.

pub mod parser;
pub mod snapshot;

pub use parser::{parse_command, Command};
pub use snapshot::{from_json, parse_batch, to_json, to_json_pretty};
