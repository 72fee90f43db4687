//! Board representation and game-state types.
//!
//! Contains the core data structures for ship sections, ships, the orbit
//! board, crew, players, actions, and the overall game state.

pub mod action;
pub mod crew;
pub mod player;
pub mod section;
pub mod ship;
pub mod space;
pub mod state;
pub mod upgrade;

pub use action::{
    ActionKind, ActionType, AssemblyItem, LaunchItem, ManeuverDirection, PlayerAction, PowerNode,
    PowerTransfer, RepairTarget, Target, RESOLUTION_ORDER,
};
pub use crew::{
    BasicRole, CaptainType, CrewKind, CrewMember, CrewStatus, OfficerRole, ALL_BASIC_ROLES,
    REVIVE_THRESHOLD,
};
pub use player::{
    Attacker, Discovery, Inventory, PlayerState, PlayerStats, PlayerStatus, ResourceKind,
    Resources,
};
pub use section::{Edge, ShipSection, ALL_SECTIONS, SECTION_COUNT, TOPOLOGY};
pub use ship::{SectionState, Ship};
pub use space::{Board, ObjectKind, OrbitRing, Position, RingColor, SpaceObject};
pub use state::{
    CrewId, EventRuntimeState, GameSettings, GameState, GameStatus, ObjectId, PlayerId,
    RingLayout, RotationDirection, TurnPhase,
};
pub use upgrade::{UpgradeKind, ALL_UPGRADES};
