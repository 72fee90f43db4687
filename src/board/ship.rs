//! Ship state: per-section hull, stored power, conduits and corridors.
//!
//! Sections live in a fixed-size array indexed by `ShipSection as usize`.
//! Conduit and corridor setters always write both ends so the graph stays
//! symmetric.

use serde::{Deserialize, Serialize};

use super::section::{
    has_corridor, max_conduits, ShipSection, ALL_SECTIONS, SECTION_COUNT, TOPOLOGY,
};
use super::space::Position;

/// Maximum shield value for any ship.
pub const MAX_SHIELDS: u32 = 10;

/// Mutable state of one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionState {
    pub hull: u32,
    /// Power dice; the section's stored power is their sum.
    pub power_dice: Vec<u8>,
    /// Conduit count to every other section, indexed by `ShipSection`.
    pub conduits: [u8; SECTION_COUNT],
    /// Corridor intactness to every other section, indexed by `ShipSection`.
    pub corridors: [bool; SECTION_COUNT],
}

impl SectionState {
    /// Sum of the section's power dice.
    pub fn stored_power(&self) -> u32 {
        self.power_dice.iter().map(|&d| u32::from(d)).sum()
    }
}

/// A player's ship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ship {
    pub sections: [SectionState; SECTION_COUNT],
    pub shields: u32,
    pub max_shields: u32,
    pub speed: u32,
    pub position: Position,
    /// Crew capacity of the life-support pool.
    pub life_support: u32,
}

impl Ship {
    /// Builds a ship in its starting configuration.
    pub fn new(position: Position, shields: u32, life_support: u32) -> Self {
        let sections = ALL_SECTIONS.map(|s| {
            let mut conduits = [0u8; SECTION_COUNT];
            let mut corridors = [false; SECTION_COUNT];
            for other in ALL_SECTIONS {
                conduits[other.index()] = max_conduits(s, other);
                corridors[other.index()] = has_corridor(s, other);
            }
            SectionState {
                hull: s.max_hull(),
                power_dice: s.starting_dice().to_vec(),
                conduits,
                corridors,
            }
        });
        Ship {
            sections,
            shields: shields.min(MAX_SHIELDS),
            max_shields: MAX_SHIELDS,
            speed: 0,
            position,
            life_support,
        }
    }

    pub fn section(&self, section: ShipSection) -> &SectionState {
        &self.sections[section.index()]
    }

    pub fn section_mut(&mut self, section: ShipSection) -> &mut SectionState {
        &mut self.sections[section.index()]
    }

    pub fn hull(&self, section: ShipSection) -> u32 {
        self.section(section).hull
    }

    pub fn total_hull(&self) -> u32 {
        self.sections.iter().map(|s| s.hull).sum()
    }

    pub fn power(&self, section: ShipSection) -> u32 {
        self.section(section).stored_power()
    }

    pub fn total_power(&self) -> u32 {
        self.sections.iter().map(SectionState::stored_power).sum()
    }

    /// True if the section has hull left and any stored power.
    pub fn is_powered(&self, section: ShipSection) -> bool {
        self.hull(section) > 0 && self.power(section) > 0
    }

    /// True if the section's stored power meets its requirement.
    pub fn is_fully_powered(&self, section: ShipSection) -> bool {
        self.hull(section) > 0 && self.power(section) >= section.power_requirement()
    }

    /// Sets hull, clamped to `[0, max_hull]`.
    pub fn set_hull(&mut self, section: ShipSection, hull: u32) {
        self.section_mut(section).hull = hull.min(section.max_hull());
    }

    /// Removes up to `amount` hull and returns how much was removed.
    pub fn damage_hull(&mut self, section: ShipSection, amount: u32) -> u32 {
        let current = self.hull(section);
        let dealt = amount.min(current);
        self.set_hull(section, current - dealt);
        dealt
    }

    /// Restores hull and returns the amount actually repaired.
    pub fn repair_hull(&mut self, section: ShipSection, amount: u32) -> u32 {
        let current = self.hull(section);
        self.set_hull(section, current.saturating_add(amount));
        self.hull(section) - current
    }

    pub fn conduits(&self, a: ShipSection, b: ShipSection) -> u8 {
        self.section(a).conduits[b.index()]
    }

    /// Sets the conduit count on both ends of an edge.
    pub fn set_conduits(&mut self, a: ShipSection, b: ShipSection, count: u8) {
        self.section_mut(a).conduits[b.index()] = count;
        self.section_mut(b).conduits[a.index()] = count;
    }

    /// Removes one conduit from both ends; returns false if none were left.
    pub fn degrade_conduit(&mut self, a: ShipSection, b: ShipSection) -> bool {
        let count = self.conduits(a, b);
        if count == 0 {
            return false;
        }
        self.set_conduits(a, b, count - 1);
        true
    }

    pub fn corridor_intact(&self, a: ShipSection, b: ShipSection) -> bool {
        self.section(a).corridors[b.index()]
    }

    /// Sets corridor intactness on both ends.
    pub fn set_corridor(&mut self, a: ShipSection, b: ShipSection, intact: bool) {
        self.section_mut(a).corridors[b.index()] = intact;
        self.section_mut(b).corridors[a.index()] = intact;
    }

    /// The section with the most hull remaining; ties go to declaration order.
    pub fn largest_hull_section(&self) -> ShipSection {
        let mut best = ShipSection::Bridge;
        for s in ALL_SECTIONS {
            if self.hull(s) > self.hull(best) {
                best = s;
            }
        }
        best
    }

    /// Checks conduit/corridor symmetry and that no link exists outside the
    /// topology. Returns a description of the first violation.
    pub fn check_invariants(&self) -> Result<(), String> {
        for a in ALL_SECTIONS {
            if self.hull(a) > a.max_hull() {
                return Err(format!("{} hull {} exceeds max {}", a.name(), self.hull(a), a.max_hull()));
            }
            for b in ALL_SECTIONS {
                if self.conduits(a, b) != self.conduits(b, a) {
                    return Err(format!("conduits {}-{} are asymmetric", a.name(), b.name()));
                }
                if self.corridor_intact(a, b) != self.corridor_intact(b, a) {
                    return Err(format!("corridor {}-{} is asymmetric", a.name(), b.name()));
                }
                if self.conduits(a, b) > max_conduits(a, b) {
                    return Err(format!("conduits {}-{} exceed topology", a.name(), b.name()));
                }
            }
        }
        Ok(())
    }

    /// Iterates the topology edges with their current conduit counts.
    pub fn edges(&self) -> impl Iterator<Item = (ShipSection, ShipSection, u8)> + '_ {
        TOPOLOGY.iter().map(move |e| (e.a, e.b, self.conduits(e.a, e.b)))
    }
}
