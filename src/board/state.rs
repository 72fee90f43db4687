//! Game state representation.
//!
//! Holds the complete snapshot of a game at a given point in time: status,
//! turn and phase, board, players, decks, and settings. Every engine operation
//! takes a snapshot by reference and returns a new one.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::player::PlayerState;
use super::space::{Board, RingColor};
use crate::catalog::Expansion;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identifies a player.
    PlayerId
);
string_id!(
    /// Identifies a crew member or captain.
    CrewId
);
string_id!(
    /// Identifies a board object.
    ObjectId
);

/// Lifecycle status of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Setup,
    InProgress,
    Completed,
    Abandoned,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GameStatus::Setup => "setup",
            GameStatus::InProgress => "in_progress",
            GameStatus::Completed => "completed",
            GameStatus::Abandoned => "abandoned",
        };
        f.write_str(s)
    }
}

/// The phase within a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    Event,
    ActionExecution,
    Environment,
    Resolution,
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TurnPhase::Event => "event",
            TurnPhase::ActionExecution => "action_execution",
            TurnPhase::Environment => "environment",
            TurnPhase::Resolution => "resolution",
        };
        f.write_str(s)
    }
}

/// Direction the rings rotate each turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

impl RotationDirection {
    pub fn sign(self) -> i64 {
        match self {
            RotationDirection::Clockwise => 1,
            RotationDirection::CounterClockwise => -1,
        }
    }
}

/// Shape of one ring in the board layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingLayout {
    pub num_spaces: u32,
    pub color: RingColor,
}

/// Tunable game rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub max_players: usize,
    /// Rings from outermost to innermost.
    pub ring_layout: Vec<RingLayout>,
    pub rotation: RotationDirection,
    /// Objects drift one ring inward every this many turns (0 disables).
    pub infall_interval: u32,
    /// Any ship still active at the end of this turn is lost.
    pub max_turns: u32,
    /// Thrust needed to leave the outermost ring.
    pub escape_speed: u32,
    pub starting_shields: u32,
    pub starting_life_support: u32,
    pub expansions: Vec<Expansion>,
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            max_players: 4,
            ring_layout: vec![
                RingLayout { num_spaces: 24, color: RingColor::Green },
                RingLayout { num_spaces: 20, color: RingColor::Green },
                RingLayout { num_spaces: 16, color: RingColor::Yellow },
                RingLayout { num_spaces: 12, color: RingColor::Yellow },
                RingLayout { num_spaces: 8, color: RingColor::Orange },
                RingLayout { num_spaces: 6, color: RingColor::Red },
            ],
            rotation: RotationDirection::Clockwise,
            infall_interval: 3,
            max_turns: 20,
            escape_speed: 8,
            starting_shields: 4,
            starting_life_support: 8,
            expansions: vec![Expansion::Core],
        }
    }
}

/// Lingering effect of the last resolved event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRuntimeState {
    pub event_id: String,
    /// Last turn on which the effect applies.
    pub expires_turn: u32,
    pub scan_penalty: u32,
}

/// Complete game state at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub id: String,
    pub status: GameStatus,
    pub current_turn: u32,
    pub turn_phase: TurnPhase,
    pub board: Board,
    pub players: BTreeMap<PlayerId, PlayerState>,
    /// Players in join order; ship placement and tie-breaks follow it.
    pub player_order: Vec<PlayerId>,
    /// Remaining event card ids, next card first.
    pub event_deck: Vec<String>,
    /// Remaining upgrade card ids, next card first.
    pub upgrade_deck: Vec<String>,
    pub created_at: u64,
    pub started_at: Option<u64>,
    pub settings: GameSettings,
    pub last_resolved_event: Option<String>,
    pub event_runtime: Option<EventRuntimeState>,
    pub next_object_seq: u32,
}

impl GameState {
    pub fn player(&self, id: &PlayerId) -> Option<&PlayerState> {
        self.players.get(id)
    }

    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut PlayerState> {
        self.players.get_mut(id)
    }

    /// Ids of players still in play, in join order.
    pub fn active_player_ids(&self) -> Vec<PlayerId> {
        self.player_order
            .iter()
            .filter(|id| self.players.get(*id).is_some_and(|p| p.is_active()))
            .cloned()
            .collect()
    }

    /// Scan penalty from the current event, if still in effect.
    pub fn scan_penalty(&self) -> u32 {
        match &self.event_runtime {
            Some(rt) if rt.expires_turn >= self.current_turn => rt.scan_penalty,
            _ => 0,
        }
    }

    /// Allocates the next object id.
    pub fn allocate_object_id(&mut self) -> ObjectId {
        self.next_object_seq += 1;
        ObjectId(format!("obj-{}", self.next_object_seq))
    }

    /// Structural checks for a state that did not come out of the engine:
    /// seat order matches the roster, every ship is consistent, and every
    /// ship and object sits on the board.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.player_order.len() != self.players.len() || self.player_order.iter().any(|id| !self.players.contains_key(id)) {
            return Err("player order does not match the player roster".to_string());
        }
        for p in self.players.values() {
            p.ship.check_invariants().map_err(|e| format!("ship of '{}': {}", p.id, e))?;
            self.board.validate_position(p.ship.position).map_err(|e| format!("ship of '{}': {}", p.id, e))?;
        }
        for obj in &self.board.objects {
            self.board.validate_position(obj.position).map_err(|e| format!("object '{}': {}", obj.id, e))?;
        }
        Ok(())
    }
}
