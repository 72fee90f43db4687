//! Crew members, officers, and captains.
//!
//! A captain is stored as a `CrewMember` whose kind is `CrewKind::Captain`, so
//! every actor lookup and status rule treats crew and captain uniformly.

use serde::{Deserialize, Serialize};

use super::action::AssemblyItem;
use super::section::ShipSection;
use super::state::CrewId;

/// Stim packs a Doctor carries at the start of the game.
pub const DOCTOR_STIM_PACKS: u32 = 2;

/// Revive points needed to wake an unconscious member.
pub const REVIVE_THRESHOLD: u32 = 12;

/// Health status of a crew member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrewStatus {
    Active,
    Unconscious,
    Dead,
}

/// Role of a basic crew member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasicRole {
    Pilot,
    Engineer,
    Medic,
    Scientist,
    Tactician,
}

/// Every basic role, in the order crew are created.
pub const ALL_BASIC_ROLES: [BasicRole; 5] = [
    BasicRole::Pilot,
    BasicRole::Engineer,
    BasicRole::Medic,
    BasicRole::Scientist,
    BasicRole::Tactician,
];

impl BasicRole {
    /// The section a member of this role starts in.
    pub const fn home_section(self) -> ShipSection {
        match self {
            BasicRole::Pilot => ShipSection::Bridge,
            BasicRole::Engineer => ShipSection::Engineering,
            BasicRole::Medic => ShipSection::MedLab,
            BasicRole::Scientist => ShipSection::SciLab,
            BasicRole::Tactician => ShipSection::Defense,
        }
    }
}

/// Role of an officer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfficerRole {
    AcePilot,
    ChiefEngineer,
    Doctor,
    SeniorScientist,
    MasterTactician,
    FirstOfficer,
}

impl OfficerRole {
    pub const fn home_section(self) -> ShipSection {
        match self {
            OfficerRole::AcePilot | OfficerRole::FirstOfficer => ShipSection::Bridge,
            OfficerRole::ChiefEngineer => ShipSection::Engineering,
            OfficerRole::Doctor => ShipSection::MedLab,
            OfficerRole::SeniorScientist => ShipSection::SciLab,
            OfficerRole::MasterTactician => ShipSection::Defense,
        }
    }

    pub fn from_name(name: &str) -> Option<OfficerRole> {
        match name {
            "ace_pilot" => Some(OfficerRole::AcePilot),
            "chief_engineer" => Some(OfficerRole::ChiefEngineer),
            "doctor" => Some(OfficerRole::Doctor),
            "senior_scientist" => Some(OfficerRole::SeniorScientist),
            "master_tactician" => Some(OfficerRole::MasterTactician),
            "first_officer" => Some(OfficerRole::FirstOfficer),
            _ => None,
        }
    }
}

/// Captain archetype; each grants a passive on top of the all-trades template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptainType {
    Veteran,
    Explorer,
    Merchant,
    Imperialist,
    Technologist,
    Survivor,
}

impl CaptainType {
    pub fn from_name(name: &str) -> Option<CaptainType> {
        match name {
            "veteran" => Some(CaptainType::Veteran),
            "explorer" => Some(CaptainType::Explorer),
            "merchant" => Some(CaptainType::Merchant),
            "imperialist" => Some(CaptainType::Imperialist),
            "technologist" => Some(CaptainType::Technologist),
            "survivor" => Some(CaptainType::Survivor),
            _ => None,
        }
    }
}

/// What kind of actor a crew member is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "role", rename_all = "snake_case")]
pub enum CrewKind {
    Basic(BasicRole),
    Officer(OfficerRole),
    Captain(CaptainType),
}

impl CrewKind {
    pub fn is_basic(self) -> bool {
        matches!(self, CrewKind::Basic(_))
    }

    pub fn is_doctor(self) -> bool {
        matches!(self, CrewKind::Officer(OfficerRole::Doctor))
    }

    pub fn home_section(self) -> ShipSection {
        match self {
            CrewKind::Basic(r) => r.home_section(),
            CrewKind::Officer(r) => r.home_section(),
            CrewKind::Captain(_) => ShipSection::Bridge,
        }
    }
}

/// Partial progress toward assembling an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyProgress {
    pub item: AssemblyItem,
    pub points: u32,
}

/// A crew member, officer, or captain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: CrewId,
    pub kind: CrewKind,
    pub status: CrewStatus,
    /// `None` only while unconscious or dead.
    pub location: Option<ShipSection>,
    pub revive_progress: u32,
    pub assembly: Option<AssemblyProgress>,
    pub stim_packs: u32,
}

impl CrewMember {
    /// Creates an active member in their home section.
    pub fn new(id: CrewId, kind: CrewKind) -> Self {
        CrewMember {
            id,
            kind,
            status: CrewStatus::Active,
            location: Some(kind.home_section()),
            revive_progress: 0,
            assembly: None,
            stim_packs: if kind.is_doctor() { DOCTOR_STIM_PACKS } else { 0 },
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == CrewStatus::Active
    }

    /// Knocks the member out. Dead members stay dead.
    pub fn knock_out(&mut self) {
        if self.status == CrewStatus::Active {
            self.status = CrewStatus::Unconscious;
            self.revive_progress = 0;
        }
    }

    /// Brings an unconscious member back into the given section.
    pub fn revive_into(&mut self, section: ShipSection) {
        self.status = CrewStatus::Active;
        self.revive_progress = 0;
        self.location = Some(section);
    }
}
