//! Damage application for ships and board objects.

use crate::board::{ObjectKind, PlayerState, ShipSection, SpaceObject, UpgradeKind, ALL_SECTIONS};
use crate::bonus::{effective_bonus, BonusKind};

/// How a hit on a ship was absorbed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShipDamage {
    /// Damage stopped by shields.
    pub absorbed: u32,
    /// Shield points actually lost.
    pub shield_loss: u32,
    /// Damage taken by hull.
    pub hull: u32,
}

/// Applies a hit: shields absorb first, the rest goes to hull.
///
/// A powered Shield Modulator halves the shield loss (rounded up) without
/// reducing what the shields absorb. While shields are up, the best shield
/// bonus on duty in a powered Defense section stops that many more points at
/// no shield cost.
pub fn damage_ship(player: &mut PlayerState, amount: u32) -> ShipDamage {
    let shields = player.ship.shields;
    let stopped = amount.min(shields);
    let extra = if shields > 0 { shield_bonus(player) } else { 0 };
    let absorbed = amount.min(shields + extra);
    let shield_loss = if player.has_powered_upgrade(UpgradeKind::ShieldModulator) {
        stopped.div_ceil(2)
    } else {
        stopped
    };
    player.ship.shields -= shield_loss;
    let hull = damage_hull(player, amount - absorbed);
    ShipDamage { absorbed, shield_loss, hull }
}

/// Highest shield bonus among active members in an intact, powered Defense
/// section.
pub fn shield_bonus(player: &PlayerState) -> u32 {
    let defense = ShipSection::Defense;
    if !player.ship.is_powered(defense) {
        return 0;
    }
    player
        .members()
        .filter(|m| m.is_active() && m.location == Some(defense))
        .map(|m| effective_bonus(player, m, BonusKind::Shield))
        .max()
        .unwrap_or(0)
}

/// Hull damage that bypasses shields. Each point lands on whichever section
/// has the most hull left at that moment.
pub fn damage_hull(player: &mut PlayerState, amount: u32) -> u32 {
    let mut dealt = 0;
    while dealt < amount && player.ship.total_hull() > 0 {
        let section = player.ship.largest_hull_section();
        dealt += player.ship.damage_hull(section, 1);
        knock_out_if_breached(player, section);
    }
    dealt
}

/// Removes `amount` hull from one section.
pub fn damage_section(player: &mut PlayerState, section: ShipSection, amount: u32) -> u32 {
    let dealt = player.ship.damage_hull(section, amount);
    knock_out_if_breached(player, section);
    dealt
}

/// Removes `amount` hull from every section.
pub fn damage_every_section(player: &mut PlayerState, amount: u32) -> u32 {
    ALL_SECTIONS.iter().map(|&s| damage_section(player, s, amount)).sum()
}

/// Members standing in a section with no hull left are knocked out.
pub fn knock_out_if_breached(player: &mut PlayerState, section: ShipSection) {
    if player.ship.hull(section) == 0 {
        player.knock_out_in(section);
    }
}

/// Outcome of damaging a board object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectDamage {
    /// The object has no hull to damage.
    Immune,
    Damaged { remaining: u32 },
    /// The object broke apart; `hostile` is set when it was a hostile ship.
    Destroyed { hostile: bool },
}

/// Damages a hostile ship or asteroid cluster in place. A destroyed hostile
/// becomes a wrecked ship and a destroyed cluster becomes debris.
pub fn damage_object(object: &mut SpaceObject, amount: u32) -> ObjectDamage {
    match &mut object.kind {
        ObjectKind::HostileShip { hull, .. } => {
            *hull = hull.saturating_sub(amount);
            if *hull == 0 {
                object.kind = ObjectKind::WreckedShip;
                object.loot = None;
                ObjectDamage::Destroyed { hostile: true }
            } else {
                ObjectDamage::Damaged { remaining: *hull }
            }
        }
        ObjectKind::AsteroidCluster { hull } => {
            *hull = hull.saturating_sub(amount);
            if *hull == 0 {
                object.kind = ObjectKind::Debris;
                object.loot = None;
                ObjectDamage::Destroyed { hostile: false }
            } else {
                ObjectDamage::Damaged { remaining: *hull }
            }
        }
        _ => ObjectDamage::Immune,
    }
}

/// True if attacks can target this object.
pub fn is_damageable(kind: &ObjectKind) -> bool {
    matches!(kind, ObjectKind::HostileShip { .. } | ObjectKind::AsteroidCluster { .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CrewStatus, ObjectId, Position};
    use crate::resolve::test_support::sample_player;
    use ShipSection::*;

    #[test]
    fn shields_absorb_first() {
        let mut p = sample_player("p1");
        // Four from the shields, one more from the tactician in Defense.
        let dmg = damage_ship(&mut p, 7);
        assert_eq!(dmg.absorbed, 5);
        assert_eq!(dmg.shield_loss, 4);
        assert_eq!(dmg.hull, 2);
        assert_eq!(p.ship.shields, 0);
        assert_eq!(p.ship.hull(Engineering), 12);
    }

    #[test]
    fn shield_bonus_needs_crew_in_powered_defense() {
        let mut p = sample_player("p1");
        assert_eq!(shield_bonus(&p), 1);

        let mut unpowered = p.clone();
        let stored = unpowered.ship.power(Defense);
        crate::power::spend(&mut unpowered.ship, Defense, stored).unwrap();
        assert_eq!(shield_bonus(&unpowered), 0);

        let tactician = p.crew.iter_mut().find(|m| m.location == Some(Defense)).unwrap();
        tactician.knock_out();
        assert_eq!(shield_bonus(&p), 0);
        let dmg = damage_ship(&mut p, 7);
        assert_eq!(dmg.absorbed, 4);
        assert_eq!(dmg.hull, 3);
    }

    #[test]
    fn shield_bonus_needs_shields_up() {
        let mut p = sample_player("p1");
        p.ship.shields = 0;
        let dmg = damage_ship(&mut p, 3);
        assert_eq!(dmg.absorbed, 0);
        assert_eq!(dmg.hull, 3);
    }

    #[test]
    fn modulator_halves_shield_loss() {
        let mut p = sample_player("p1");
        p.installed_upgrades.push(UpgradeKind::ShieldModulator);
        let dmg = damage_ship(&mut p, 3);
        assert_eq!(dmg.absorbed, 3);
        assert_eq!(dmg.shield_loss, 2);
        assert_eq!(p.ship.shields, 2);
        assert_eq!(p.ship.total_hull(), 70);
    }

    #[test]
    fn hull_damage_spills_to_next_largest() {
        let mut p = sample_player("p1");
        p.ship.shields = 0;
        for s in ALL_SECTIONS {
            p.ship.set_hull(s, 1);
        }
        p.ship.set_hull(MedLab, 3);
        let dealt = damage_hull(&mut p, 4);
        assert_eq!(dealt, 4);
        // Two points level MedLab with the rest, then ties go in section order.
        assert_eq!(p.ship.hull(MedLab), 1);
        assert_eq!(p.ship.hull(Bridge), 0);
        assert_eq!(p.ship.hull(Engineering), 0);
        assert_eq!(p.ship.hull(Drives), 1);
    }

    #[test]
    fn hull_damage_is_spread_one_point_at_a_time() {
        let mut p = sample_player("p1");
        let dealt = damage_hull(&mut p, 5);
        assert_eq!(dealt, 5);
        let hulls: Vec<u32> = ALL_SECTIONS.iter().map(|&s| p.ship.hull(s)).collect();
        assert_eq!(hulls, vec![11, 11, 11, 10, 10, 12]);
    }

    #[test]
    fn hull_damage_stops_at_a_wreck() {
        let mut p = sample_player("p1");
        assert_eq!(damage_hull(&mut p, 100), 70);
        assert_eq!(p.ship.total_hull(), 0);
    }

    #[test]
    fn breached_section_knocks_out_its_crew() {
        let mut p = sample_player("p1");
        damage_section(&mut p, MedLab, 50);
        let medic = p.crew.iter().find(|m| m.location == Some(MedLab)).unwrap();
        assert_eq!(medic.status, CrewStatus::Unconscious);
        let pilot = p.crew.iter().find(|m| m.location == Some(Bridge)).unwrap();
        assert!(pilot.is_active());
    }

    #[test]
    fn destroyed_objects_change_kind() {
        let mut hostile = SpaceObject {
            id: ObjectId::from("obj-1"),
            position: Position::new(0, 0),
            kind: ObjectKind::HostileShip { hull: 5, has_torpedo: true, cloak_scanned: Vec::new() },
            loot: None,
        };
        assert_eq!(damage_object(&mut hostile, 3), ObjectDamage::Damaged { remaining: 2 });
        assert_eq!(damage_object(&mut hostile, 3), ObjectDamage::Destroyed { hostile: true });
        assert_eq!(hostile.kind, ObjectKind::WreckedShip);
        assert_eq!(damage_object(&mut hostile, 3), ObjectDamage::Immune);

        let mut rock = SpaceObject { kind: ObjectKind::AsteroidCluster { hull: 2 }, ..hostile };
        assert_eq!(damage_object(&mut rock, 2), ObjectDamage::Destroyed { hostile: false });
        assert_eq!(rock.kind, ObjectKind::Debris);
    }
}
