//! Session state management.
//!
//! Holds the current game, the session options, and the catalog, and answers
//! each command with one line on the output: `ok ...`, `state <json>`,
//! `readyok`, or `error <message>`.

use std::collections::HashMap;
use std::io::{self, Write};

use tracing::debug;

use crate::board::{CaptainType, GameSettings, GameState, OfficerRole, PlayerId, RotationDirection};
use crate::bot::bot_actions;
use crate::catalog::Catalog;
use crate::error::EngineError;
use crate::protocol::snapshot;
use crate::resolve::{process_turn, process_turn_with, ActionBatch};
use crate::setup::{self, PlayerInput, STANDARD_RING_SPEEDS};

/// Why a session command could not be carried out.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no game loaded; send 'newgame <id> <created_at>' first")]
    NoGame,

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("option {name} has invalid value '{value}'")]
    BadOption { name: String, value: String },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Holds the mutable state of the session between commands.
pub struct Engine {
    pub game: Option<GameState>,
    pub options: HashMap<String, String>,
    catalog: Catalog,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates a session with no game and the standard catalog.
    pub fn new() -> Self {
        Engine { game: None, options: HashMap::new(), catalog: Catalog::standard() }
    }

    /// Sets a session option. Game options take effect at the next `newgame`.
    pub fn set_option(&mut self, name: String, value: Option<String>) {
        self.options.insert(name, value.unwrap_or_default());
    }

    fn numeric_option<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, SessionError> {
        match self.options.get(name) {
            None => Ok(None),
            Some(v) => v
                .parse()
                .map(Some)
                .map_err(|_| SessionError::BadOption { name: name.to_string(), value: v.clone() }),
        }
    }

    /// Game settings: the defaults, overridden by any game options set.
    pub fn settings(&self) -> Result<GameSettings, SessionError> {
        let mut settings = GameSettings::default();
        if let Some(v) = self.numeric_option("MaxTurns")? {
            settings.max_turns = v;
        }
        if let Some(v) = self.numeric_option("MaxPlayers")? {
            settings.max_players = v;
        }
        if let Some(v) = self.numeric_option("EscapeSpeed")? {
            settings.escape_speed = v;
        }
        if let Some(v) = self.numeric_option("InfallInterval")? {
            settings.infall_interval = v;
        }
        if let Some(v) = self.options.get("Rotation") {
            settings.rotation = match v.as_str() {
                "clockwise" => RotationDirection::Clockwise,
                "counterclockwise" => RotationDirection::CounterClockwise,
                _ => return Err(SessionError::BadOption { name: "Rotation".into(), value: v.clone() }),
            };
        }
        Ok(settings)
    }

    fn pretty(&self) -> bool {
        self.options.get("Pretty").is_some_and(|v| v.is_empty() || v == "true")
    }

    fn game(&self) -> Result<&GameState, SessionError> {
        self.game.as_ref().ok_or(SessionError::NoGame)
    }

    pub fn new_game(&mut self, id: &str, created_at: u64) -> Result<(), SessionError> {
        let settings = self.settings()?;
        self.game = Some(setup::create_new_game(id, created_at, settings, &STANDARD_RING_SPEEDS, &self.catalog)?);
        Ok(())
    }

    pub fn add_player(&mut self, id: &str, captain: CaptainType, officers: &[OfficerRole]) -> Result<(), SessionError> {
        let next = setup::add_player_to_game(self.game()?, PlayerInput::new(id, captain, officers))?;
        self.game = Some(next);
        Ok(())
    }

    pub fn start(&mut self, started_at: u64) -> Result<(), SessionError> {
        let next = setup::start_game(self.game()?, started_at)?;
        self.game = Some(next);
        Ok(())
    }

    /// Plays one turn with a JSON action batch.
    pub fn play_actions(&mut self, json: &str) -> Result<(), SessionError> {
        let batch = snapshot::parse_batch(json)?;
        let next = process_turn(self.game()?, &batch, &self.catalog)?;
        self.game = Some(next);
        Ok(())
    }

    /// Plays one turn with a bot in every seat.
    pub fn play_bot_turn(&mut self) -> Result<(), SessionError> {
        let next = process_turn_with(self.game()?, &self.catalog, |state| {
            state
                .active_player_ids()
                .into_iter()
                .map(|id: PlayerId| {
                    let actions = bot_actions(state, &id);
                    debug!(player = %id, actions = actions.len(), "bot turn");
                    (id, actions)
                })
                .collect::<ActionBatch>()
        })?;
        self.game = Some(next);
        Ok(())
    }

    /// Replaces the session's game with a JSON snapshot. A snapshot that
    /// parses but breaks a structural invariant is refused and the current
    /// game is kept.
    pub fn load(&mut self, json: &str) -> Result<(), SessionError> {
        let game = snapshot::from_json(json)?;
        game.check_invariants().map_err(EngineError::invariant)?;
        self.game = Some(game);
        Ok(())
    }

    /// Writes the outcome of a command: `ok <what>` on success.
    pub fn reply<W: Write>(&self, out: &mut W, what: &str, result: Result<(), SessionError>) -> io::Result<()> {
        match result {
            Ok(()) => match &self.game {
                Some(g) => writeln!(out, "ok {} turn {} phase {} status {}", what, g.current_turn, g.turn_phase, g.status)?,
                None => writeln!(out, "ok {}", what)?,
            },
            Err(e) => writeln!(out, "error {}", e)?,
        }
        out.flush()
    }

    /// Handles the `state` command.
    pub fn handle_state<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let json = self.game().and_then(|g| {
            let text = if self.pretty() { snapshot::to_json_pretty(g) } else { snapshot::to_json(g) };
            text.map_err(SessionError::from)
        });
        match json {
            Ok(text) => writeln!(out, "state {}", text)?,
            Err(e) => writeln!(out, "error {}", e)?,
        }
        out.flush()
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }
}
