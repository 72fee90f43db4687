//! Turn resolution.
//!
//! Each phase of a turn is a pure function from one `GameState` to the next.
//! `pipeline` resolves the players' actions, `environment` and `hostiles` the
//! board, `events` the event deck, and `phase` ties them into a full turn.

use std::collections::BTreeMap;

use crate::board::{PlayerAction, PlayerId};

pub mod actor;
pub mod combat;
pub mod damage;
pub mod engineering;
pub mod environment;
pub mod events;
pub mod fabrication;
pub mod hostiles;
pub mod medical;
pub mod navigation;
pub mod phase;
pub mod pipeline;
pub mod sensors;

#[cfg(test)]
pub(crate) mod test_support;

/// One turn's actions, keyed by the submitting player.
pub type ActionBatch = BTreeMap<PlayerId, Vec<PlayerAction>>;

pub use environment::{apply_environment_damage, apply_hazard_damage, update_orbits_and_objects};
pub use events::apply_event_phase;
pub use phase::{
    advance_turn, apply_auto_generate, apply_game_state_transitions, process_turn, process_turn_with,
    score_player,
};
pub use pipeline::{apply_player_actions, validate_batch};
