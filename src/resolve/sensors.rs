//! Scanning and acquiring board objects.
//!
//! Loot is rolled the first time anyone looks at an object and then stays on
//! the object, so every later scan or probe reveals the same contents.

use tracing::debug;

use crate::board::{
    ActionType, CrewMember, Discovery, ObjectId, ObjectKind, PlayerAction, Resources, ShipSection, SpaceObject,
    Target,
};
use crate::bonus::{effective_bonus, BonusKind};
use crate::error::{ActionError, Result};
use crate::rng::KeyedRng;

use super::actor::{self, ActionContext, SharedEffect};

pub const SCAN_BASE_RANGE: u32 = 3;
pub const ACQUIRE_BASE_RANGE: u32 = 1;

/// Rolls the contents of an object.
pub fn roll_loot(kind: &ObjectKind, rng: &mut KeyedRng) -> Resources {
    match kind {
        ObjectKind::Debris => Resources { scrap: rng.roll(2), ..Default::default() },
        ObjectKind::AsteroidCluster { .. } => Resources { fuel: rng.roll(2), scrap: 1, ..Default::default() },
        ObjectKind::WreckedShip => Resources {
            scrap: rng.roll(2),
            electronics: rng.roll(2),
            medical: rng.roll(3) - 1,
            fuel: 0,
        },
        ObjectKind::FunctionalStation { .. } => Resources { fuel: 1, medical: 1, ..Default::default() },
        ObjectKind::Hazard { .. } | ObjectKind::HostileShip { .. } => Resources::default(),
    }
}

/// The object's loot, rolling it with the `loot` key if nobody has yet.
/// Newly rolled loot is queued for the board.
pub(crate) fn reveal_loot(ctx: &mut ActionContext<'_>, object: &SpaceObject) -> Resources {
    if let Some(loot) = object.loot {
        return loot;
    }
    let mut rng = KeyedRng::new(&ctx.key("loot", object.id.as_str()));
    let loot = roll_loot(&object.kind, &mut rng);
    ctx.push(SharedEffect::RevealLoot { object: object.id.clone(), loot });
    loot
}

/// Scan: reveals an object's loot into the scan cache. Range is
/// `3 + bonus`, reduced by any event scan penalty.
pub fn resolve_scan(ctx: &mut ActionContext<'_>, action: &PlayerAction, member: &CrewMember, target: &ObjectId) -> Result<()> {
    actor::require_section(&ctx.player, member, ShipSection::SciLab, ActionType::Scan)?;
    actor::require_powered(&ctx.player, ShipSection::SciLab)?;
    let object = ctx.object(target)?;

    let bonus = effective_bonus(&ctx.player, member, BonusKind::Scan);
    let range = actor::with_stim(SCAN_BASE_RANGE + bonus, action.stim).saturating_sub(ctx.snapshot.scan_penalty());
    ctx.require_range(&Target::Object(target.clone()), range)?;

    if action.stim {
        actor::consume_stim(&mut ctx.player, ShipSection::SciLab)?;
    }
    ctx.spend_power(ShipSection::SciLab, 1)?;

    let loot = reveal_loot(ctx, object);
    let turn = ctx.turn();
    if ctx.player.scan_cache.insert(target.clone(), Discovery { turn, loot }).is_none() {
        ctx.player.stats.objects_scanned += 1;
    }
    debug!(player = %ctx.player.id, object = %target, kind = object.kind.label(), "scanned");
    Ok(())
}

/// Acquire: claims a scanned or probed object within `1 + bonus`.
///
/// The claim itself lands when the batch commits: salvage leaves the board and
/// its loot goes to the player, a station hands over one upgrade card. If two
/// players claim the same object in the same batch, every claim fizzles.
pub fn resolve_acquire(ctx: &mut ActionContext<'_>, action: &PlayerAction, member: &CrewMember, target: &ObjectId) -> Result<()> {
    actor::require_section(&ctx.player, member, ShipSection::SciLab, ActionType::Acquire)?;
    actor::require_powered(&ctx.player, ShipSection::SciLab)?;
    let object = ctx.object(target)?;

    match &object.kind {
        ObjectKind::Hazard { .. } | ObjectKind::HostileShip { .. } => {
            return Err(ActionError::InvalidPayload(format!(
                "cannot acquire {} '{}'",
                object.kind.label(),
                target
            ))
            .into());
        }
        ObjectKind::FunctionalStation { visited_by } if visited_by.contains(&ctx.player.id) => {
            return Err(ActionError::StationVisited { player: ctx.player.id.clone(), station: target.clone() }.into());
        }
        _ => {}
    }
    if !ctx.player.has_discovered(target) {
        return Err(ActionError::NotDiscovered(target.clone()).into());
    }

    let bonus = effective_bonus(&ctx.player, member, BonusKind::Acquire);
    let range = actor::with_stim(ACQUIRE_BASE_RANGE + bonus, action.stim);
    ctx.require_range(&Target::Object(target.clone()), range)?;

    if action.stim {
        actor::consume_stim(&mut ctx.player, ShipSection::SciLab)?;
    }
    ctx.spend_power(ShipSection::SciLab, 1)?;
    let player = ctx.player_id();
    ctx.push(SharedEffect::Acquire { player, object: target.clone() });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{ActionKind, CrewId, PlayerState, Position};
    use crate::catalog::Catalog;
    use crate::error::EngineError;
    use crate::power::RoutingLedger;
    use crate::resolve::test_support::{place_object, sample_game};

    fn scientist(p: &PlayerState) -> CrewMember {
        p.member(&CrewId::from("p1-crew-4")).unwrap().clone()
    }

    #[test]
    fn loot_is_deterministic() {
        let a = roll_loot(&ObjectKind::WreckedShip, &mut KeyedRng::new("loot:g:1:obj-1"));
        let b = roll_loot(&ObjectKind::WreckedShip, &mut KeyedRng::new("loot:g:1:obj-1"));
        assert_eq!(a, b);
        assert!(a.scrap >= 1 && a.electronics >= 1);
        assert_eq!(roll_loot(&ObjectKind::Hazard { intensity: 2 }, &mut KeyedRng::new("x")), Resources::default());
    }

    #[test]
    fn scan_reveals_and_caches() {
        let mut game = sample_game();
        let origin = game.players.values().next().unwrap().ship.position;
        let id = place_object(&mut game, ObjectKind::Debris, Position::new(origin.ring, origin.space + 2));
        let catalog = Catalog::standard();
        let mut ledger = RoutingLedger::new();
        let player = game.players.values().next().unwrap().clone();
        let pid = player.id.clone();
        let sci = scientist(&player);
        let mut ctx = ActionContext::new(&game, &catalog, player, &mut ledger);
        let action = PlayerAction::new(&pid, &sci.id, ActionKind::Scan { target: id.clone() });
        resolve_scan(&mut ctx, &action, &sci, &id).unwrap();
        assert!(ctx.player.scan_cache.contains_key(&id));
        assert_eq!(ctx.player.stats.objects_scanned, 1);
        assert_eq!(ctx.player.ship.power(ShipSection::SciLab), 3);
        assert!(matches!(ctx.effects[0], SharedEffect::RevealLoot { .. }));
    }

    #[test]
    fn scan_respects_range() {
        let mut game = sample_game();
        let origin = game.players.values().next().unwrap().ship.position;
        // Scientist range is 3 + 1.
        let id = place_object(&mut game, ObjectKind::Debris, Position::new(origin.ring, origin.space + 5));
        let catalog = Catalog::standard();
        let mut ledger = RoutingLedger::new();
        let player = game.players.values().next().unwrap().clone();
        let pid = player.id.clone();
        let sci = scientist(&player);
        let mut ctx = ActionContext::new(&game, &catalog, player, &mut ledger);
        let action = PlayerAction::new(&pid, &sci.id, ActionKind::Scan { target: id.clone() });
        let err = resolve_scan(&mut ctx, &action, &sci, &id).unwrap_err();
        assert!(matches!(err, EngineError::Action(ActionError::OutOfRange { distance: 5, range: 4, .. })));
    }

    #[test]
    fn acquire_needs_discovery() {
        let mut game = sample_game();
        let origin = game.players.values().next().unwrap().ship.position;
        let id = place_object(&mut game, ObjectKind::Debris, origin);
        let catalog = Catalog::standard();
        let mut ledger = RoutingLedger::new();
        let mut player = game.players.values().next().unwrap().clone();
        let pid = player.id.clone();
        let sci = scientist(&player);
        let action = PlayerAction::new(&pid, &sci.id, ActionKind::Acquire { target: id.clone() });
        {
            let mut ctx = ActionContext::new(&game, &catalog, player.clone(), &mut ledger);
            let err = resolve_acquire(&mut ctx, &action, &sci, &id).unwrap_err();
            assert!(matches!(err, EngineError::Action(ActionError::NotDiscovered(_))));
        }
        player.scan_cache.insert(id.clone(), Discovery { turn: 1, loot: Resources::default() });
        let mut ctx = ActionContext::new(&game, &catalog, player, &mut ledger);
        resolve_acquire(&mut ctx, &action, &sci, &id).unwrap();
        assert_eq!(ctx.effects, vec![SharedEffect::Acquire { player: pid, object: id }]);
    }

    #[test]
    fn hostiles_cannot_be_acquired() {
        let mut game = sample_game();
        let origin = game.players.values().next().unwrap().ship.position;
        let kind = ObjectKind::HostileShip { hull: 4, has_torpedo: false, cloak_scanned: Vec::new() };
        let id = place_object(&mut game, kind, origin);
        let catalog = Catalog::standard();
        let mut ledger = RoutingLedger::new();
        let player = game.players.values().next().unwrap().clone();
        let pid = player.id.clone();
        let sci = scientist(&player);
        let mut ctx = ActionContext::new(&game, &catalog, player, &mut ledger);
        let action = PlayerAction::new(&pid, &sci.id, ActionKind::Acquire { target: id.clone() });
        assert!(resolve_acquire(&mut ctx, &action, &sci, &id).is_err());
    }
}
