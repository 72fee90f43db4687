//! Ship sections and the fixed ship topology.
//!
//! The six sections are enumerated in declaration order, which is also the
//! tie-break order used by routing and damage allocation. Section metadata and
//! the conduit/corridor topology are compile-time tables indexed by
//! `ShipSection as usize`.

use serde::{Deserialize, Serialize};

/// The number of sections on every ship.
pub const SECTION_COUNT: usize = 6;

/// Maximum value of a single power die.
pub const MAX_DIE: u8 = 6;

/// A fixed ship compartment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ShipSection {
    Bridge = 0,
    Engineering = 1,
    Drives = 2,
    MedLab = 3,
    SciLab = 4,
    Defense = 5,
}

/// All sections in declaration order.
pub const ALL_SECTIONS: [ShipSection; SECTION_COUNT] = [
    ShipSection::Bridge,
    ShipSection::Engineering,
    ShipSection::Drives,
    ShipSection::MedLab,
    ShipSection::SciLab,
    ShipSection::Defense,
];

/// Static metadata for a section.
pub struct SectionInfo {
    pub name: &'static str,
    pub max_hull: u32,
    /// Stored power at or above which the section counts as fully powered.
    pub power_requirement: u32,
    pub starting_dice: &'static [u8],
}

/// Compile-time lookup table: index by `ShipSection as usize`.
pub static SECTION_INFO: [SectionInfo; SECTION_COUNT] = [
    SectionInfo { name: "bridge", max_hull: 12, power_requirement: 6, starting_dice: &[6] },
    SectionInfo { name: "engineering", max_hull: 14, power_requirement: 8, starting_dice: &[6, 2] },
    SectionInfo { name: "drives", max_hull: 12, power_requirement: 6, starting_dice: &[6] },
    SectionInfo { name: "med_lab", max_hull: 10, power_requirement: 4, starting_dice: &[4] },
    SectionInfo { name: "sci_lab", max_hull: 10, power_requirement: 4, starting_dice: &[4] },
    SectionInfo { name: "defense", max_hull: 12, power_requirement: 6, starting_dice: &[6] },
];

impl ShipSection {
    /// Returns the snake_case name.
    pub const fn name(self) -> &'static str {
        SECTION_INFO[self as usize].name
    }

    pub const fn max_hull(self) -> u32 {
        SECTION_INFO[self as usize].max_hull
    }

    pub const fn power_requirement(self) -> u32 {
        SECTION_INFO[self as usize].power_requirement
    }

    pub const fn starting_dice(self) -> &'static [u8] {
        SECTION_INFO[self as usize].starting_dice
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Parses a section from its snake_case name.
    pub fn from_name(name: &str) -> Option<ShipSection> {
        ALL_SECTIONS.iter().copied().find(|s| s.name() == name)
    }
}

/// A single undirected link in the ship topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyEntry {
    pub a: ShipSection,
    pub b: ShipSection,
    /// Conduits installed at the start of the game, also the repair cap.
    pub conduits: u8,
    pub corridor: bool,
}

use ShipSection::*;

const fn link(a: ShipSection, b: ShipSection, conduits: u8, corridor: bool) -> TopologyEntry {
    TopologyEntry { a, b, conduits, corridor }
}

/// Number of undirected links in the topology.
pub const TOPOLOGY_COUNT: usize = 9;

/// The fixed ship topology. Each pair appears once; lookups are symmetric.
pub static TOPOLOGY: [TopologyEntry; TOPOLOGY_COUNT] = [
    link(Bridge, Engineering, 2, true),
    link(Bridge, SciLab, 1, true),
    link(Bridge, Defense, 1, true),
    link(Engineering, Drives, 3, true),
    link(Engineering, MedLab, 2, true),
    link(Engineering, Defense, 2, true),
    link(Drives, Defense, 1, true),
    link(Drives, MedLab, 0, true),
    link(MedLab, SciLab, 1, true),
];

/// Looks up the topology entry linking two sections, in either direction.
pub fn topology_link(a: ShipSection, b: ShipSection) -> Option<&'static TopologyEntry> {
    TOPOLOGY
        .iter()
        .find(|e| (e.a == a && e.b == b) || (e.a == b && e.b == a))
}

/// Maximum conduit count between two sections (0 if not linked).
pub fn max_conduits(a: ShipSection, b: ShipSection) -> u8 {
    topology_link(a, b).map_or(0, |e| e.conduits)
}

/// Returns true if the topology has a corridor between the two sections.
pub fn has_corridor(a: ShipSection, b: ShipSection) -> bool {
    topology_link(a, b).is_some_and(|e| e.corridor)
}

/// An undirected edge, stored with the lower-ordered section first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge(pub ShipSection, pub ShipSection);

impl Edge {
    /// Creates a normalized edge.
    pub fn new(a: ShipSection, b: ShipSection) -> Self {
        if a <= b {
            Edge(a, b)
        } else {
            Edge(b, a)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_index_in_order() {
        for (i, s) in ALL_SECTIONS.iter().enumerate() {
            assert_eq!(s.index(), i);
        }
    }

    #[test]
    fn name_roundtrip() {
        for s in ALL_SECTIONS {
            assert_eq!(ShipSection::from_name(s.name()), Some(s));
        }
        assert_eq!(ShipSection::from_name("galley"), None);
    }

    #[test]
    fn starting_dice_valid() {
        for s in ALL_SECTIONS {
            assert!(s.starting_dice().iter().all(|&d| d >= 1 && d <= MAX_DIE));
        }
    }

    #[test]
    fn topology_has_no_self_links_or_duplicates() {
        for (i, e) in TOPOLOGY.iter().enumerate() {
            assert_ne!(e.a, e.b);
            for other in &TOPOLOGY[i + 1..] {
                assert!(Edge::new(e.a, e.b) != Edge::new(other.a, other.b));
            }
        }
    }

    #[test]
    fn topology_lookup_is_symmetric() {
        assert_eq!(max_conduits(Bridge, Engineering), 2);
        assert_eq!(max_conduits(Engineering, Bridge), 2);
        assert_eq!(max_conduits(Drives, MedLab), 0);
        assert!(has_corridor(MedLab, Drives));
        assert!(!has_corridor(Bridge, Drives));
        assert!(topology_link(SciLab, Defense).is_none());
    }

    #[test]
    fn edge_is_normalized() {
        assert_eq!(Edge::new(Defense, Bridge), Edge(Bridge, Defense));
    }
}
