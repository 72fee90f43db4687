//! Per-action context and the actor preconditions shared by every resolver.
//!
//! A resolver works on its own player's copy of the state and reads everything
//! else from the snapshot taken at the start of the action type's batch. Any
//! change to another entity is queued as a `SharedEffect`.

use crate::board::{
    ActionType, Attacker, CrewId, CrewMember, GameState, ObjectId, PlayerId, PlayerState, Position,
    ShipSection, SpaceObject, Target,
};
use crate::catalog::Catalog;
use crate::error::{ActionError, EngineError, Result};
use crate::power::{self, RoutingLedger};
use crate::rng::entity_key;

/// A change to something other than the acting player, applied after every
/// player's actions of the current type have resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SharedEffect {
    DamagePlayer { attacker: Attacker, target: PlayerId, amount: u32, torpedo: bool },
    DamageObject { attacker: PlayerId, object: ObjectId, amount: u32 },
    RevealLoot { object: ObjectId, loot: crate::board::Resources },
    Acquire { player: PlayerId, object: ObjectId },
}

/// Everything a resolver may touch while resolving one player's actions.
pub struct ActionContext<'a> {
    pub snapshot: &'a GameState,
    pub catalog: &'a Catalog,
    pub player: PlayerState,
    pub ledger: &'a mut RoutingLedger,
    pub effects: Vec<SharedEffect>,
}

impl<'a> ActionContext<'a> {
    pub fn new(
        snapshot: &'a GameState,
        catalog: &'a Catalog,
        player: PlayerState,
        ledger: &'a mut RoutingLedger,
    ) -> Self {
        ActionContext { snapshot, catalog, player, ledger, effects: Vec::new() }
    }

    pub fn turn(&self) -> u32 {
        self.snapshot.current_turn
    }

    pub fn player_id(&self) -> PlayerId {
        self.player.id.clone()
    }

    /// RNG key for a draw made by this player's crew this turn.
    pub fn key(&self, purpose: &str, entity: &str) -> String {
        entity_key(purpose, &self.snapshot.id, self.snapshot.current_turn, entity)
    }

    pub fn position(&self) -> Position {
        self.player.ship.position
    }

    pub fn object(&self, id: &ObjectId) -> Result<&'a SpaceObject> {
        self.snapshot
            .board
            .object(id)
            .ok_or_else(|| ActionError::UnknownObject(id.clone()).into())
    }

    /// Another active player in the game.
    pub fn opponent(&self, id: &PlayerId) -> Result<&'a PlayerState> {
        if *id == self.player.id {
            return Err(ActionError::InvalidPayload(format!("player '{}' cannot target their own ship", id)).into());
        }
        let other = self
            .snapshot
            .player(id)
            .ok_or_else(|| EngineError::from(ActionError::UnknownPlayer(id.clone())))?;
        if !other.is_active() {
            return Err(ActionError::InvalidPayload(format!("player '{}' is no longer in play", id)).into());
        }
        Ok(other)
    }

    /// Board position of an attack target.
    pub fn target_position(&self, target: &Target) -> Result<Position> {
        match target {
            Target::Object(id) => Ok(self.object(id)?.position),
            Target::Player(id) => Ok(self.opponent(id)?.ship.position),
        }
    }

    /// Errors if `target` is farther than `range`.
    pub fn require_range(&self, target: &Target, range: u32) -> Result<u32> {
        let pos = self.target_position(target)?;
        let distance = self.snapshot.board.distance(self.position(), pos);
        if distance > range {
            return Err(ActionError::OutOfRange { target: target_label(target), distance, range }.into());
        }
        Ok(distance)
    }

    /// Spends power from one of this player's sections.
    pub fn spend_power(&mut self, section: ShipSection, amount: u32) -> Result<()> {
        power::spend(&mut self.player.ship, section, amount)
            .map_err(|source| ActionError::Power { player: self.player.id.clone(), source }.into())
    }

    pub fn push(&mut self, effect: SharedEffect) {
        self.effects.push(effect);
    }
}

pub fn target_label(target: &Target) -> String {
    match target {
        Target::Object(id) => id.to_string(),
        Target::Player(id) => id.to_string(),
    }
}

/// Looks up an active member of the player's crew and returns a copy.
pub fn acting_member(player: &PlayerState, crew: &CrewId) -> Result<CrewMember> {
    let member = player.member(crew).ok_or_else(|| ActionError::UnknownCrew {
        player: player.id.clone(),
        crew: crew.clone(),
    })?;
    if !member.is_active() {
        return Err(ActionError::CrewInactive(crew.clone()).into());
    }
    Ok(member.clone())
}

/// The section an active member stands in.
pub fn location(member: &CrewMember) -> Result<ShipSection> {
    member
        .location
        .ok_or_else(|| ActionError::CrewInactive(member.id.clone()).into())
}

/// Errors unless the member stands in `required` and that section has hull.
pub fn require_section(player: &PlayerState, member: &CrewMember, required: ShipSection, action: ActionType) -> Result<()> {
    if member.location != Some(required) {
        return Err(ActionError::WrongSection { crew: member.id.clone(), action, required }.into());
    }
    require_intact(player, required)
}

pub fn require_intact(player: &PlayerState, section: ShipSection) -> Result<()> {
    if player.ship.hull(section) == 0 {
        return Err(ActionError::SectionDestroyed(section).into());
    }
    Ok(())
}

/// Errors unless the section has hull and stored power.
pub fn require_powered(player: &PlayerState, section: ShipSection) -> Result<()> {
    require_intact(player, section)?;
    if !player.ship.is_powered(section) {
        return Err(ActionError::SectionUnpowered(section).into());
    }
    Ok(())
}

/// Consumes a stim pack from an active Doctor in `section`.
pub fn consume_stim(player: &mut PlayerState, section: ShipSection) -> Result<()> {
    let doctor = player
        .members_mut()
        .find(|m| m.is_active() && m.kind.is_doctor() && m.location == Some(section) && m.stim_packs > 0)
        .ok_or(ActionError::NoStimAvailable(section))?;
    doctor.stim_packs -= 1;
    Ok(())
}

/// Doubles a magnitude when a stim pack was used.
pub fn with_stim(magnitude: u32, stim: bool) -> u32 {
    if stim {
        magnitude * 2
    } else {
        magnitude
    }
}

/// Matches an attack target against the attackers recorded on a ship.
pub fn attacker_for(target: &Target) -> Attacker {
    match target {
        Target::Object(id) => Attacker::Object(id.clone()),
        Target::Player(id) => Attacker::Player(id.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::CrewStatus;
    use crate::resolve::test_support::sample_player;

    #[test]
    fn inactive_members_cannot_act() {
        let mut p = sample_player("p1");
        p.crew[0].status = CrewStatus::Unconscious;
        let err = acting_member(&p, &CrewId::from("p1-crew-1")).unwrap_err();
        assert!(matches!(err, EngineError::Action(ActionError::CrewInactive(_))));
        let err = acting_member(&p, &CrewId::from("p1-crew-99")).unwrap_err();
        assert!(matches!(err, EngineError::Action(ActionError::UnknownCrew { .. })));
    }

    #[test]
    fn section_requirements() {
        let mut p = sample_player("p1");
        let pilot = acting_member(&p, &CrewId::from("p1-crew-1")).unwrap();
        assert!(require_section(&p, &pilot, ShipSection::Bridge, ActionType::Maneuver).is_ok());
        assert!(require_section(&p, &pilot, ShipSection::Engineering, ActionType::Route).is_err());
        p.ship.section_mut(ShipSection::Bridge).power_dice.clear();
        assert!(matches!(
            require_powered(&p, ShipSection::Bridge),
            Err(EngineError::Action(ActionError::SectionUnpowered(ShipSection::Bridge)))
        ));
    }

    #[test]
    fn stim_needs_a_doctor_in_the_section() {
        let mut p = sample_player("p1");
        assert!(consume_stim(&mut p, ShipSection::Bridge).is_err());
        consume_stim(&mut p, ShipSection::MedLab).unwrap();
        consume_stim(&mut p, ShipSection::MedLab).unwrap();
        assert!(consume_stim(&mut p, ShipSection::MedLab).is_err());
        assert_eq!(with_stim(5, true), 10);
    }
}
