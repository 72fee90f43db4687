//! Installable ship upgrades.
//!
//! An installed upgrade works only while its host section is intact and fully
//! powered.

use serde::{Deserialize, Serialize};

use super::section::ShipSection;
use super::ship::Ship;

/// Kind of ship upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeKind {
    /// Lets one crew member act twice per turn.
    Cybernetics,
    /// Lets one crew member act twice per turn.
    TemporalShift,
    /// Attacks may be made from the bridge.
    TacticalBridge,
    /// Absorbs one conduit overload per turn.
    PowerCoils,
    /// Shields lose half of the damage they absorb.
    ShieldModulator,
    /// Hostiles must scan the ship before attacking it.
    Cloak,
    /// Evades one torpedo per turn.
    Decoys,
    /// +1 life support every turn.
    LifeSupportRecycler,
}

pub const ALL_UPGRADES: [UpgradeKind; 8] = [
    UpgradeKind::Cybernetics,
    UpgradeKind::TemporalShift,
    UpgradeKind::TacticalBridge,
    UpgradeKind::PowerCoils,
    UpgradeKind::ShieldModulator,
    UpgradeKind::Cloak,
    UpgradeKind::Decoys,
    UpgradeKind::LifeSupportRecycler,
];

impl UpgradeKind {
    /// The section that hosts and powers this upgrade.
    pub const fn host_section(self) -> ShipSection {
        match self {
            UpgradeKind::Cybernetics | UpgradeKind::LifeSupportRecycler => ShipSection::MedLab,
            UpgradeKind::TemporalShift | UpgradeKind::PowerCoils => ShipSection::Engineering,
            UpgradeKind::TacticalBridge => ShipSection::Bridge,
            UpgradeKind::ShieldModulator | UpgradeKind::Decoys => ShipSection::Defense,
            UpgradeKind::Cloak => ShipSection::Drives,
        }
    }

    /// True for upgrades that grant a second action to one crew member.
    pub const fn grants_bonus_action(self) -> bool {
        matches!(self, UpgradeKind::Cybernetics | UpgradeKind::TemporalShift)
    }

    /// True if the host section currently powers the upgrade.
    pub fn is_powered_on(self, ship: &Ship) -> bool {
        ship.is_fully_powered(self.host_section())
    }
}
