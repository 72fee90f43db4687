//! Player actions.
//!
//! Each action kind carries a statically typed payload, validated once at the
//! pipeline boundary. `ActionType` gives the fixed order in which kinds
//! resolve within a turn.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::section::ShipSection;
use super::state::{CrewId, ObjectId, PlayerId};
use super::upgrade::UpgradeKind;

/// Resolution category of an action. Declaration order is resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Restore,
    Route,
    Revive,
    Repair,
    Maneuver,
    Scan,
    Acquire,
    Attack,
    Launch,
    Retaliate,
    Assemble,
    Integrate,
}

/// All action types in resolution order.
pub const RESOLUTION_ORDER: [ActionType; 12] = [
    ActionType::Restore,
    ActionType::Route,
    ActionType::Revive,
    ActionType::Repair,
    ActionType::Maneuver,
    ActionType::Scan,
    ActionType::Acquire,
    ActionType::Attack,
    ActionType::Launch,
    ActionType::Retaliate,
    ActionType::Assemble,
    ActionType::Integrate,
];

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionType::Restore => "restore",
            ActionType::Route => "route",
            ActionType::Revive => "revive",
            ActionType::Repair => "repair",
            ActionType::Maneuver => "maneuver",
            ActionType::Scan => "scan",
            ActionType::Acquire => "acquire",
            ActionType::Attack => "attack",
            ActionType::Launch => "launch",
            ActionType::Retaliate => "retaliate",
            ActionType::Assemble => "assemble",
            ActionType::Integrate => "integrate",
        };
        f.write_str(s)
    }
}

/// An endpoint of a power transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerNode {
    Section(ShipSection),
    /// The life-support pool, outside the conduit graph.
    LifeSupport,
}

/// Move `amount` power from one node to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PowerTransfer {
    pub from: PowerNode,
    pub to: PowerNode,
    pub amount: u32,
}

impl PowerTransfer {
    pub fn between(from: ShipSection, to: ShipSection, amount: u32) -> Self {
        PowerTransfer {
            from: PowerNode::Section(from),
            to: PowerNode::Section(to),
            amount,
        }
    }
}

/// What a repair action fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "to", rename_all = "snake_case")]
pub enum RepairTarget {
    Hull,
    Conduit(ShipSection),
    Corridor(ShipSection),
}

/// Direction of a maneuver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManeuverDirection {
    Prograde,
    Retrograde,
    Inward,
    Outward,
}

/// Something that can be launched from the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchItem {
    Torpedo,
    Probe,
}

/// Something crew can assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyItem {
    Torpedo,
    Probe,
}

/// Target of an offensive action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Target {
    Object(ObjectId),
    Player(PlayerId),
}

/// An action kind with its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKind {
    Restore { transfers: Vec<PowerTransfer> },
    Route { transfers: Vec<PowerTransfer> },
    Revive { target: CrewId },
    Repair { section: ShipSection, target: RepairTarget },
    Maneuver { direction: ManeuverDirection, power: u32 },
    Scan { target: ObjectId },
    Acquire { target: ObjectId },
    Attack { target: Target },
    Launch { item: LaunchItem, target: Target },
    Retaliate { target: Target },
    Assemble { item: AssemblyItem },
    Integrate { upgrade: UpgradeKind },
}

impl ActionKind {
    pub fn action_type(&self) -> ActionType {
        match self {
            ActionKind::Restore { .. } => ActionType::Restore,
            ActionKind::Route { .. } => ActionType::Route,
            ActionKind::Revive { .. } => ActionType::Revive,
            ActionKind::Repair { .. } => ActionType::Repair,
            ActionKind::Maneuver { .. } => ActionType::Maneuver,
            ActionKind::Scan { .. } => ActionType::Scan,
            ActionKind::Acquire { .. } => ActionType::Acquire,
            ActionKind::Attack { .. } => ActionType::Attack,
            ActionKind::Launch { .. } => ActionType::Launch,
            ActionKind::Retaliate { .. } => ActionType::Retaliate,
            ActionKind::Assemble { .. } => ActionType::Assemble,
            ActionKind::Integrate { .. } => ActionType::Integrate,
        }
    }
}

/// One crew member's action for a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAction {
    pub player_id: PlayerId,
    pub crew_id: CrewId,
    /// Use a co-located Doctor's stim pack to double the action's magnitude.
    #[serde(default)]
    pub stim: bool,
    pub kind: ActionKind,
}

impl PlayerAction {
    pub fn new(player_id: &PlayerId, crew_id: &CrewId, kind: ActionKind) -> Self {
        PlayerAction {
            player_id: player_id.clone(),
            crew_id: crew_id.clone(),
            stim: false,
            kind,
        }
    }

    pub fn with_stim(mut self) -> Self {
        self.stim = true;
        self
    }

    pub fn action_type(&self) -> ActionType {
        self.kind.action_type()
    }
}
