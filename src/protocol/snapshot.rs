//! JSON snapshots of game state and action batches.

use crate::board::GameState;
use crate::resolve::ActionBatch;

pub fn to_json(state: &GameState) -> serde_json::Result<String> {
    serde_json::to_string(state)
}

pub fn to_json_pretty(state: &GameState) -> serde_json::Result<String> {
    serde_json::to_string_pretty(state)
}

pub fn from_json(json: &str) -> serde_json::Result<GameState> {
    serde_json::from_str(json)
}

/// Parses a batch: an object mapping player ids to their action lists.
pub fn parse_batch(json: &str) -> serde_json::Result<ActionBatch> {
    serde_json::from_str(json)
}
