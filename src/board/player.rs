//! Per-player state: ship, crew roster, resources, upgrades, and caches.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::crew::{CaptainType, CrewKind, CrewMember};
use super::section::ShipSection;
use super::ship::Ship;
use super::state::{CrewId, ObjectId, PlayerId};
use super::upgrade::UpgradeKind;

/// Kind of collectable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Fuel,
    Scrap,
    Electronics,
    Medical,
}

pub const ALL_RESOURCES: [ResourceKind; 4] = [
    ResourceKind::Fuel,
    ResourceKind::Scrap,
    ResourceKind::Electronics,
    ResourceKind::Medical,
];

/// Resource counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Resources {
    pub fuel: u32,
    pub scrap: u32,
    pub electronics: u32,
    pub medical: u32,
}

impl Resources {
    pub fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Fuel => self.fuel,
            ResourceKind::Scrap => self.scrap,
            ResourceKind::Electronics => self.electronics,
            ResourceKind::Medical => self.medical,
        }
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut u32 {
        match kind {
            ResourceKind::Fuel => &mut self.fuel,
            ResourceKind::Scrap => &mut self.scrap,
            ResourceKind::Electronics => &mut self.electronics,
            ResourceKind::Medical => &mut self.medical,
        }
    }

    pub fn total(&self) -> u32 {
        ALL_RESOURCES.iter().map(|&k| self.get(k)).sum()
    }

    pub fn add(&mut self, other: &Resources) {
        for k in ALL_RESOURCES {
            *self.get_mut(k) += other.get(k);
        }
    }

    pub fn covers(&self, cost: &Resources) -> bool {
        ALL_RESOURCES.iter().all(|&k| self.get(k) >= cost.get(k))
    }

    /// Subtracts `cost`, or returns `None` if any count would go negative.
    pub fn checked_sub(&self, cost: &Resources) -> Option<Resources> {
        let mut out = *self;
        for k in ALL_RESOURCES {
            *out.get_mut(k) = self.get(k).checked_sub(cost.get(k))?;
        }
        Some(out)
    }

    /// The most plentiful resource; ties go to declaration order. `None` when empty.
    pub fn largest(&self) -> Option<ResourceKind> {
        let mut best: Option<ResourceKind> = None;
        for k in ALL_RESOURCES {
            let v = self.get(k);
            if v > 0 && best.map_or(true, |b| v > self.get(b)) {
                best = Some(k);
            }
        }
        best
    }
}

/// Assembled items held by a player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub torpedoes: u32,
    pub probes: u32,
}

/// Whether a player is still in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerStatus {
    Active,
    Escaped,
    Wrecked,
}

/// What a scan or probe revealed about an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    pub turn: u32,
    pub loot: Resources,
}

/// Something that damaged a player's ship and may be retaliated against.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Attacker {
    Object(ObjectId),
    Player(PlayerId),
}

/// Counters feeding score and mission checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub hostiles_destroyed: u32,
    pub objects_acquired: u32,
    pub objects_scanned: u32,
}

/// Complete state of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub status: PlayerStatus,
    pub ship: Ship,
    pub crew: Vec<CrewMember>,
    pub captain: CrewMember,
    pub resources: Resources,
    pub inventory: Inventory,
    pub installed_upgrades: Vec<UpgradeKind>,
    pub pending_upgrades: Vec<UpgradeKind>,
    /// Turn on which each once-per-turn upgrade was last used.
    pub upgrade_cooldowns: BTreeMap<UpgradeKind, u32>,
    pub scan_cache: BTreeMap<ObjectId, Discovery>,
    pub probe_cache: BTreeMap<ObjectId, Discovery>,
    pub attacked_by: Vec<Attacker>,
    pub stats: PlayerStats,
    pub score: u32,
}

impl PlayerState {
    pub fn is_active(&self) -> bool {
        self.status == PlayerStatus::Active
    }

    pub fn captain_type(&self) -> CaptainType {
        match self.captain.kind {
            CrewKind::Captain(t) => t,
            _ => CaptainType::Veteran,
        }
    }

    /// Every member, crew first then the captain.
    pub fn members(&self) -> impl Iterator<Item = &CrewMember> {
        self.crew.iter().chain(std::iter::once(&self.captain))
    }

    pub fn members_mut(&mut self) -> impl Iterator<Item = &mut CrewMember> {
        self.crew.iter_mut().chain(std::iter::once(&mut self.captain))
    }

    pub fn member(&self, id: &CrewId) -> Option<&CrewMember> {
        self.members().find(|m| &m.id == id)
    }

    pub fn member_mut(&mut self, id: &CrewId) -> Option<&mut CrewMember> {
        self.members_mut().find(|m| &m.id == id)
    }

    pub fn active_member_count(&self) -> usize {
        self.members().filter(|m| m.is_active()).count()
    }

    pub fn has_installed(&self, kind: UpgradeKind) -> bool {
        self.installed_upgrades.contains(&kind)
    }

    /// True if the upgrade is installed and its host section powers it.
    pub fn has_powered_upgrade(&self, kind: UpgradeKind) -> bool {
        self.has_installed(kind) && kind.is_powered_on(&self.ship)
    }

    /// True if a once-per-turn upgrade is powered and unused this turn.
    pub fn upgrade_ready(&self, kind: UpgradeKind, turn: u32) -> bool {
        self.has_powered_upgrade(kind) && self.upgrade_cooldowns.get(&kind) != Some(&turn)
    }

    pub fn mark_upgrade_used(&mut self, kind: UpgradeKind, turn: u32) {
        self.upgrade_cooldowns.insert(kind, turn);
    }

    /// True if the player scanned or probed the object.
    pub fn has_discovered(&self, id: &ObjectId) -> bool {
        self.scan_cache.contains_key(id) || self.probe_cache.contains_key(id)
    }

    pub fn record_attacker(&mut self, attacker: Attacker) {
        if !self.attacked_by.contains(&attacker) {
            self.attacked_by.push(attacker);
        }
    }

    /// Knocks out every active member standing in `section`.
    pub fn knock_out_in(&mut self, section: ShipSection) {
        for m in self.members_mut() {
            if m.location == Some(section) {
                m.knock_out();
            }
        }
    }
}
