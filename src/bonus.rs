//! Crew bonus tables.
//!
//! Every role adds a flat bonus to the magnitude of certain action kinds.
//! Officers specialise; the First Officer and every captain add one to
//! everything. Resolvers never read the tables directly: they go through
//! `effective_bonus`, which layers captain passives on top.

use crate::board::{BasicRole, CaptainType, CrewKind, CrewMember, OfficerRole, PlayerState};

/// Action magnitudes a crew bonus can apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BonusKind {
    Restore = 0,
    Repair = 1,
    Revive = 2,
    Scan = 3,
    Acquire = 4,
    Attack = 5,
    Maneuver = 6,
    Assemble = 7,
    Shield = 8,
}

pub const BONUS_KIND_COUNT: usize = 9;

type BonusRow = [u32; BONUS_KIND_COUNT];

//                        Rst Rep Rev Scn Acq Atk Man Asm Shd
const PILOT: BonusRow = [0, 0, 0, 0, 0, 0, 1, 0, 0];
const ENGINEER: BonusRow = [1, 1, 0, 0, 0, 0, 0, 1, 0];
const MEDIC: BonusRow = [0, 0, 1, 0, 0, 0, 0, 0, 0];
const SCIENTIST: BonusRow = [0, 0, 0, 1, 1, 0, 0, 1, 0];
const TACTICIAN: BonusRow = [0, 0, 0, 0, 0, 1, 0, 0, 1];
const ACE_PILOT: BonusRow = [0, 0, 0, 0, 0, 1, 2, 0, 0];
const CHIEF_ENGINEER: BonusRow = [2, 2, 0, 0, 0, 0, 0, 1, 0];
const DOCTOR: BonusRow = [0, 0, 2, 0, 0, 0, 0, 0, 0];
const SENIOR_SCIENTIST: BonusRow = [0, 0, 0, 2, 2, 0, 0, 2, 0];
const MASTER_TACTICIAN: BonusRow = [0, 0, 0, 0, 0, 2, 0, 0, 2];
const ALL_TRADES: BonusRow = [1; BONUS_KIND_COUNT];

fn row(kind: CrewKind) -> &'static BonusRow {
    match kind {
        CrewKind::Basic(BasicRole::Pilot) => &PILOT,
        CrewKind::Basic(BasicRole::Engineer) => &ENGINEER,
        CrewKind::Basic(BasicRole::Medic) => &MEDIC,
        CrewKind::Basic(BasicRole::Scientist) => &SCIENTIST,
        CrewKind::Basic(BasicRole::Tactician) => &TACTICIAN,
        CrewKind::Officer(OfficerRole::AcePilot) => &ACE_PILOT,
        CrewKind::Officer(OfficerRole::ChiefEngineer) => &CHIEF_ENGINEER,
        CrewKind::Officer(OfficerRole::Doctor) => &DOCTOR,
        CrewKind::Officer(OfficerRole::SeniorScientist) => &SENIOR_SCIENTIST,
        CrewKind::Officer(OfficerRole::MasterTactician) => &MASTER_TACTICIAN,
        CrewKind::Officer(OfficerRole::FirstOfficer) | CrewKind::Captain(_) => &ALL_TRADES,
    }
}

/// Table bonus for a crew kind, before captain passives.
pub fn crew_bonus(kind: CrewKind, bonus: BonusKind) -> u32 {
    row(kind)[bonus as usize]
}

/// Extra bonus a Technologist captain grants: +1 to positive basic-crew
/// bonuses, except for revive and shield magnitudes.
pub fn technologist_adjustment(captain: CaptainType, kind: CrewKind, bonus: BonusKind) -> u32 {
    let applies = matches!(
        bonus,
        BonusKind::Restore
            | BonusKind::Repair
            | BonusKind::Maneuver
            | BonusKind::Scan
            | BonusKind::Acquire
            | BonusKind::Attack
            | BonusKind::Assemble
    );
    if captain == CaptainType::Technologist && applies && kind.is_basic() && crew_bonus(kind, bonus) > 0 {
        1
    } else {
        0
    }
}

/// The bonus a member adds to an action, including captain passives.
pub fn effective_bonus(player: &PlayerState, member: &CrewMember, bonus: BonusKind) -> u32 {
    crew_bonus(member.kind, bonus) + technologist_adjustment(player.captain_type(), member.kind, bonus)
}

/// Mission points after the Imperialist passive (x1.5, rounded down).
pub fn mission_score(captain: CaptainType, points: u32) -> u32 {
    if captain == CaptainType::Imperialist {
        points * 3 / 2
    } else {
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lookups() {
        assert_eq!(crew_bonus(CrewKind::Basic(BasicRole::Pilot), BonusKind::Maneuver), 1);
        assert_eq!(crew_bonus(CrewKind::Basic(BasicRole::Pilot), BonusKind::Attack), 0);
        assert_eq!(crew_bonus(CrewKind::Officer(OfficerRole::ChiefEngineer), BonusKind::Repair), 2);
        assert_eq!(crew_bonus(CrewKind::Officer(OfficerRole::FirstOfficer), BonusKind::Shield), 1);
        assert_eq!(crew_bonus(CrewKind::Captain(CaptainType::Merchant), BonusKind::Revive), 1);
    }

    #[test]
    fn technologist_boosts_basic_crew_only() {
        let tech = CaptainType::Technologist;
        let engineer = CrewKind::Basic(BasicRole::Engineer);
        assert_eq!(technologist_adjustment(tech, engineer, BonusKind::Repair), 1);
        assert_eq!(technologist_adjustment(tech, engineer, BonusKind::Scan), 0);
        let chief = CrewKind::Officer(OfficerRole::ChiefEngineer);
        assert_eq!(technologist_adjustment(tech, chief, BonusKind::Repair), 0);
        assert_eq!(technologist_adjustment(CaptainType::Veteran, engineer, BonusKind::Repair), 0);
    }

    #[test]
    fn technologist_skips_revive_and_shield() {
        let tech = CaptainType::Technologist;
        assert_eq!(technologist_adjustment(tech, CrewKind::Basic(BasicRole::Medic), BonusKind::Revive), 0);
        assert_eq!(technologist_adjustment(tech, CrewKind::Basic(BasicRole::Tactician), BonusKind::Shield), 0);
        assert_eq!(technologist_adjustment(tech, CrewKind::Basic(BasicRole::Tactician), BonusKind::Attack), 1);
    }

    #[test]
    fn imperialist_mission_score_floors() {
        assert_eq!(mission_score(CaptainType::Imperialist, 5), 7);
        assert_eq!(mission_score(CaptainType::Explorer, 5), 5);
    }
}
