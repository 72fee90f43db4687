//! Read-only content catalogs.
//!
//! Event, upgrade, and mission cards are plain data. The engine never reaches
//! for a global table: callers pass a `Catalog` into deck building and into the
//! phases that resolve cards. `Catalog::standard()` provides the base set.

use serde::{Deserialize, Serialize};

use crate::board::{ObjectKind, PlayerState, PlayerStatus, Resources, UpgradeKind};
use crate::rng::{deck_key, KeyedRng};

/// Content expansion a card belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expansion {
    Core,
    DeepSpace,
}

/// Effect of an event card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEffect {
    /// Places an object on the board; ring is random unless fixed.
    SpawnObject { object: ObjectKind, ring: Option<usize> },
    ShieldDrain { amount: u32 },
    IonStorm { scan_penalty: u32 },
    GravitationalSurge,
    SupplyDrop { resources: Resources },
    Calm,
}

/// An event card definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCard {
    pub id: String,
    pub name: String,
    pub expansion: Expansion,
    pub copies: u32,
    pub effect: EventEffect,
}

/// An upgrade card definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeCard {
    pub id: String,
    pub kind: UpgradeKind,
    pub expansion: Expansion,
    pub copies: u32,
    /// Resources spent to integrate the upgrade.
    pub cost: Resources,
}

/// Condition a mission checks at the end of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "count", rename_all = "snake_case")]
pub enum MissionGoal {
    Escape,
    DestroyHostiles(u32),
    AcquireObjects(u32),
    ScanObjects(u32),
    HoardResources(u32),
}

impl MissionGoal {
    pub fn is_met(&self, player: &PlayerState) -> bool {
        match *self {
            MissionGoal::Escape => player.status == PlayerStatus::Escaped,
            MissionGoal::DestroyHostiles(n) => player.stats.hostiles_destroyed >= n,
            MissionGoal::AcquireObjects(n) => player.stats.objects_acquired >= n,
            MissionGoal::ScanObjects(n) => player.stats.objects_scanned >= n,
            MissionGoal::HoardResources(n) => player.resources.total() >= n,
        }
    }
}

/// A mission card definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionCard {
    pub id: String,
    pub name: String,
    pub points: u32,
    pub goal: MissionGoal,
}

/// All content available to a game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub events: Vec<EventCard>,
    pub upgrades: Vec<UpgradeCard>,
    pub missions: Vec<MissionCard>,
}

impl Catalog {
    pub fn event(&self, id: &str) -> Option<&EventCard> {
        self.events.iter().find(|c| c.id == id)
    }

    pub fn upgrade(&self, id: &str) -> Option<&UpgradeCard> {
        self.upgrades.iter().find(|c| c.id == id)
    }

    pub fn upgrade_for_kind(&self, kind: UpgradeKind) -> Option<&UpgradeCard> {
        self.upgrades.iter().find(|c| c.kind == kind)
    }

    /// Builds the shuffled event deck for a game.
    ///
    /// Copies are expanded in catalog order, then shuffled with the stream
    /// keyed by `"event:" + game_id + created_at`.
    pub fn build_event_deck(&self, expansions: &[Expansion], game_id: &str, created_at: u64) -> Vec<String> {
        let mut deck: Vec<String> = self
            .events
            .iter()
            .filter(|c| expansions.contains(&c.expansion))
            .flat_map(|c| std::iter::repeat(c.id.clone()).take(c.copies as usize))
            .collect();
        KeyedRng::new(&deck_key("event", game_id, created_at)).shuffle(&mut deck);
        deck
    }

    /// Builds the shuffled upgrade deck, keyed by `"upgrade:" + game_id + created_at`.
    pub fn build_upgrade_deck(&self, expansions: &[Expansion], game_id: &str, created_at: u64) -> Vec<String> {
        let mut deck: Vec<String> = self
            .upgrades
            .iter()
            .filter(|c| expansions.contains(&c.expansion))
            .flat_map(|c| std::iter::repeat(c.id.clone()).take(c.copies as usize))
            .collect();
        KeyedRng::new(&deck_key("upgrade", game_id, created_at)).shuffle(&mut deck);
        deck
    }

    /// Total mission points a player has earned.
    pub fn mission_points(&self, player: &PlayerState) -> u32 {
        self.missions
            .iter()
            .filter(|m| m.goal.is_met(player))
            .map(|m| m.points)
            .sum()
    }

    /// The base card set.
    pub fn standard() -> Self {
        Catalog {
            events: standard_events(),
            upgrades: standard_upgrades(),
            missions: standard_missions(),
        }
    }
}

fn event(id: &str, name: &str, expansion: Expansion, copies: u32, effect: EventEffect) -> EventCard {
    EventCard {
        id: id.to_string(),
        name: name.to_string(),
        expansion,
        copies,
        effect,
    }
}

fn standard_events() -> Vec<EventCard> {
    use Expansion::*;
    vec![
        event("ev-debris-field", "Debris Field", Core, 3, EventEffect::SpawnObject { object: ObjectKind::Debris, ring: None }),
        event(
            "ev-asteroid-swarm",
            "Asteroid Swarm",
            Core,
            2,
            EventEffect::SpawnObject { object: ObjectKind::AsteroidCluster { hull: 6 }, ring: None },
        ),
        event(
            "ev-radiation-bloom",
            "Radiation Bloom",
            Core,
            2,
            EventEffect::SpawnObject { object: ObjectKind::Hazard { intensity: 2 }, ring: None },
        ),
        event("ev-derelict", "Derelict Hulk", Core, 2, EventEffect::SpawnObject { object: ObjectKind::WreckedShip, ring: None }),
        event(
            "ev-station-beacon",
            "Station Beacon",
            Core,
            1,
            EventEffect::SpawnObject { object: ObjectKind::FunctionalStation { visited_by: Vec::new() }, ring: Some(1) },
        ),
        event(
            "ev-raider",
            "Raider Sighted",
            Core,
            2,
            EventEffect::SpawnObject {
                object: ObjectKind::HostileShip { hull: 8, has_torpedo: true, cloak_scanned: Vec::new() },
                ring: None,
            },
        ),
        event("ev-solar-flare", "Solar Flare", Core, 2, EventEffect::ShieldDrain { amount: 2 }),
        event("ev-ion-storm", "Ion Storm", Core, 2, EventEffect::IonStorm { scan_penalty: 2 }),
        event("ev-gravity-surge", "Gravitational Surge", Core, 1, EventEffect::GravitationalSurge),
        event(
            "ev-supply-drop",
            "Supply Drop",
            Core,
            2,
            EventEffect::SupplyDrop { resources: Resources { fuel: 1, scrap: 1, ..Default::default() } },
        ),
        event("ev-calm", "Calm Orbit", Core, 3, EventEffect::Calm),
        event(
            "ev-hunter",
            "Hunter Pack",
            DeepSpace,
            2,
            EventEffect::SpawnObject {
                object: ObjectKind::HostileShip { hull: 12, has_torpedo: true, cloak_scanned: Vec::new() },
                ring: Some(0),
            },
        ),
        event(
            "ev-void-rift",
            "Void Rift",
            DeepSpace,
            1,
            EventEffect::SpawnObject { object: ObjectKind::Hazard { intensity: 4 }, ring: None },
        ),
    ]
}

fn upgrade(kind: UpgradeKind, copies: u32, cost: Resources) -> UpgradeCard {
    let id = match kind {
        UpgradeKind::Cybernetics => "up-cybernetics",
        UpgradeKind::TemporalShift => "up-temporal-shift",
        UpgradeKind::TacticalBridge => "up-tactical-bridge",
        UpgradeKind::PowerCoils => "up-power-coils",
        UpgradeKind::ShieldModulator => "up-shield-modulator",
        UpgradeKind::Cloak => "up-cloak",
        UpgradeKind::Decoys => "up-decoys",
        UpgradeKind::LifeSupportRecycler => "up-life-support-recycler",
    };
    UpgradeCard {
        id: id.to_string(),
        kind,
        expansion: Expansion::Core,
        copies,
        cost,
    }
}

fn standard_upgrades() -> Vec<UpgradeCard> {
    let cost = |fuel, scrap, electronics| Resources { fuel, scrap, electronics, medical: 0 };
    vec![
        upgrade(UpgradeKind::Cybernetics, 1, cost(0, 1, 2)),
        upgrade(UpgradeKind::TemporalShift, 1, cost(2, 0, 2)),
        upgrade(UpgradeKind::TacticalBridge, 2, cost(0, 2, 1)),
        upgrade(UpgradeKind::PowerCoils, 2, cost(0, 2, 1)),
        upgrade(UpgradeKind::ShieldModulator, 2, cost(0, 1, 1)),
        upgrade(UpgradeKind::Cloak, 1, cost(1, 0, 2)),
        upgrade(UpgradeKind::Decoys, 2, cost(0, 2, 0)),
        upgrade(UpgradeKind::LifeSupportRecycler, 2, cost(0, 1, 1)),
    ]
}

fn standard_missions() -> Vec<MissionCard> {
    let mission = |id: &str, name: &str, points, goal| MissionCard {
        id: id.to_string(),
        name: name.to_string(),
        points,
        goal,
    };
    vec![
        mission("m-breakout", "Breakout", 10, MissionGoal::Escape),
        mission("m-hunter", "Hunter", 6, MissionGoal::DestroyHostiles(2)),
        mission("m-salvager", "Salvager", 4, MissionGoal::AcquireObjects(3)),
        mission("m-surveyor", "Surveyor", 4, MissionGoal::ScanObjects(4)),
        mission("m-hoarder", "Hoarder", 3, MissionGoal::HoardResources(8)),
    ]
}
