//! Engine error types.
//!
//! Every public operation returns `Result<_, EngineError>`. A failed call never
//! hands back a partially updated state: callers keep the input snapshot.

use crate::board::{ActionType, CrewId, GameStatus, ObjectId, PlayerId, ShipSection, TurnPhase};
use crate::power::PowerError;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Top-level engine error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Setup(#[from] SetupError),

    #[error("operation requires phase {expected}, but the game is in {actual}")]
    WrongPhase { expected: TurnPhase, actual: TurnPhase },

    #[error("game is {status}; start the game before resolving turns")]
    NotInProgress { status: GameStatus },

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("engine invariant violated: {0}")]
    Invariant(String),
}

/// Errors from game creation, joining, and starting.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("game is {status}; players can only join or start during setup")]
    WrongStatus { status: GameStatus },

    #[error("player '{0}' already joined; pick another id")]
    DuplicatePlayer(PlayerId),

    #[error("game is full ({max} players); raise max_players in the settings")]
    GameFull { max: usize },

    #[error("no players have joined; add at least one player before starting")]
    NoPlayers,

    #[error("ring layout is invalid: {0}")]
    InvalidRingLayout(String),

    #[error("expected {expected} ring speeds to match the ring layout, got {actual}")]
    RingSpeedMismatch { expected: usize, actual: usize },

    #[error("outer ring has {spaces} spaces, not divisible by {players} players; change the layout or player count")]
    IndivisibleOuterRing { spaces: u32, players: usize },

    #[error("roster for '{player}' is invalid: {reason}")]
    InvalidRoster { player: PlayerId, reason: String },
}

/// Errors from validating or resolving a batch of player actions.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("no action list submitted for active player '{0}'; submit an empty list to pass")]
    MissingSubmission(PlayerId),

    #[error("actions submitted for '{0}', who is not an active player in this game")]
    UnexpectedSubmission(PlayerId),

    #[error("action for '{action_player}' was filed under '{key}'; file each action under its own player")]
    PlayerMismatch { key: PlayerId, action_player: PlayerId },

    #[error("player '{player}' has no crew member '{crew}'")]
    UnknownCrew { player: PlayerId, crew: CrewId },

    #[error("crew member '{0}' is not active and cannot act")]
    CrewInactive(CrewId),

    #[error("object '{0}' is not on the board")]
    UnknownObject(ObjectId),

    #[error("player '{0}' is not in this game")]
    UnknownPlayer(PlayerId),

    #[error("crew member '{crew}' already acted this turn; only one member may act twice, with a powered Cybernetics or Temporal Shift")]
    TooManyActions { player: PlayerId, crew: CrewId },

    #[error("crew member '{crew}' must be in {} to {action}", .required.name())]
    WrongSection { crew: CrewId, action: ActionType, required: ShipSection },

    #[error("{} has no hull left; repair it first", .0.name())]
    SectionDestroyed(ShipSection),

    #[error("{} has no power; route power there first", .0.name())]
    SectionUnpowered(ShipSection),

    #[error("power for '{player}': {source}")]
    Power {
        player: PlayerId,
        #[source]
        source: PowerError,
    },

    #[error("player '{player}' lacks the resources to {purpose}")]
    InsufficientResources { player: PlayerId, purpose: String },

    #[error("player '{player}' has no {item} left; assemble one first")]
    EmptyInventory { player: PlayerId, item: &'static str },

    #[error("target '{target}' is {distance} away, beyond range {range}")]
    OutOfRange { target: String, distance: u32, range: u32 },

    #[error("invalid action payload: {0}")]
    InvalidPayload(String),

    #[error("crew member '{0}' is not unconscious")]
    NotUnconscious(CrewId),

    #[error("no doctor with a stim pack is in {}", .0.name())]
    NoStimAvailable(ShipSection),

    #[error("ship is already on the innermost ring")]
    InnermostRing,

    #[error("thrust {thrust} is below the required {required}")]
    InsufficientThrust { thrust: u32, required: u32 },

    #[error("object '{0}' has not been scanned or probed; scan it first")]
    NotDiscovered(ObjectId),

    #[error("player '{player}' already drew an upgrade from station '{station}'")]
    StationVisited { player: PlayerId, station: ObjectId },

    #[error("upgrade {0:?} is not pending for this player")]
    UpgradeNotPending(crate::board::UpgradeKind),

    #[error("'{0}' has not attacked this ship this turn")]
    NotAnAttacker(String),
}

impl EngineError {
    /// Wraps a message from a board-level invariant check.
    pub fn invariant(msg: impl Into<String>) -> Self {
        EngineError::Invariant(msg.into())
    }
}
