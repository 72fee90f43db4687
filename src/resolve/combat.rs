//! Attacks, launches, and retaliation.
//!
//! Damage dealt by a player is queued as a shared effect; shields, hull, and
//! destruction are applied when the batch commits.

use tracing::debug;

use crate::board::{
    ActionType, Attacker, CrewMember, Discovery, LaunchItem, ObjectKind, PlayerAction, ShipSection, Target, UpgradeKind,
};
use crate::bonus::{effective_bonus, BonusKind};
use crate::error::{ActionError, Result};
use crate::rng::roll_keyed;

use super::actor::{self, ActionContext, SharedEffect};
use super::damage::is_damageable;
use super::sensors::reveal_loot;

pub const ATTACK_POWER_COST: u32 = 2;
pub const ATTACK_RANGE: u32 = 2;
pub const RETALIATE_POWER_COST: u32 = 1;
pub const TORPEDO_RANGE: u32 = 3;
pub const TORPEDO_DAMAGE: u32 = 8;
pub const PROBE_RANGE: u32 = 5;

/// Errors unless the target can take damage.
fn require_damageable(ctx: &ActionContext<'_>, target: &Target) -> Result<()> {
    match target {
        Target::Object(id) => {
            let object = ctx.object(id)?;
            if !is_damageable(&object.kind) {
                return Err(ActionError::InvalidPayload(format!(
                    "{} '{}' cannot be attacked",
                    object.kind.label(),
                    id
                ))
                .into());
            }
        }
        Target::Player(id) => {
            ctx.opponent(id)?;
        }
    }
    Ok(())
}

fn queue_damage(ctx: &mut ActionContext<'_>, target: &Target, amount: u32, torpedo: bool) {
    let effect = match target {
        Target::Object(id) => SharedEffect::DamageObject { attacker: ctx.player_id(), object: id.clone(), amount },
        Target::Player(id) => SharedEffect::DamagePlayer {
            attacker: Attacker::Player(ctx.player_id()),
            target: id.clone(),
            amount,
            torpedo,
        },
    };
    ctx.push(effect);
}

/// Attack: two defense power for `d6 + bonus` damage within range 2. The
/// actor fires from defense, or from the bridge with a powered Tactical Bridge.
pub fn resolve_attack(ctx: &mut ActionContext<'_>, action: &PlayerAction, member: &CrewMember, target: &Target) -> Result<()> {
    let here = actor::location(member)?;
    let from_bridge = here == ShipSection::Bridge && ctx.player.has_powered_upgrade(UpgradeKind::TacticalBridge);
    if !from_bridge {
        actor::require_section(&ctx.player, member, ShipSection::Defense, ActionType::Attack)?;
    }
    actor::require_intact(&ctx.player, here)?;
    require_damageable(ctx, target)?;
    ctx.require_range(target, ATTACK_RANGE)?;

    if action.stim {
        actor::consume_stim(&mut ctx.player, here)?;
    }
    ctx.spend_power(ShipSection::Defense, ATTACK_POWER_COST)?;
    let roll = roll_keyed(&ctx.key("attack", member.id.as_str()), 6);
    let damage = actor::with_stim(roll + effective_bonus(&ctx.player, member, BonusKind::Attack), action.stim);
    debug!(player = %ctx.player.id, target = %actor::target_label(target), damage, "attack");
    queue_damage(ctx, target, damage, false);
    Ok(())
}

/// Launch: fires a torpedo (range 3, 8 damage) or a probe (range 5) from the
/// bridge. A probe reveals its target into the probe cache.
pub fn resolve_launch(
    ctx: &mut ActionContext<'_>,
    action: &PlayerAction,
    member: &CrewMember,
    item: LaunchItem,
    target: &Target,
) -> Result<()> {
    actor::require_section(&ctx.player, member, ShipSection::Bridge, ActionType::Launch)?;
    actor::require_powered(&ctx.player, ShipSection::Bridge)?;

    match item {
        LaunchItem::Torpedo => {
            if ctx.player.inventory.torpedoes == 0 {
                return Err(ActionError::EmptyInventory { player: ctx.player_id(), item: "torpedoes" }.into());
            }
            require_damageable(ctx, target)?;
            ctx.require_range(target, TORPEDO_RANGE)?;
            if action.stim {
                actor::consume_stim(&mut ctx.player, ShipSection::Bridge)?;
            }
            ctx.player.inventory.torpedoes -= 1;
            let damage = actor::with_stim(TORPEDO_DAMAGE, action.stim);
            queue_damage(ctx, target, damage, true);
        }
        LaunchItem::Probe => {
            let Target::Object(id) = target else {
                return Err(ActionError::InvalidPayload("probes can only target board objects".into()).into());
            };
            if ctx.player.inventory.probes == 0 {
                return Err(ActionError::EmptyInventory { player: ctx.player_id(), item: "probes" }.into());
            }
            let range = actor::with_stim(PROBE_RANGE, action.stim);
            ctx.require_range(target, range)?;
            if action.stim {
                actor::consume_stim(&mut ctx.player, ShipSection::Bridge)?;
            }
            ctx.player.inventory.probes -= 1;
            let object = ctx.object(id)?;
            let loot = reveal_loot(ctx, object);
            let turn = ctx.turn();
            ctx.player.probe_cache.insert(id.clone(), Discovery { turn, loot });
        }
    }
    Ok(())
}

/// Retaliate: one defense power for `d6 + bonus` against something that
/// attacked this ship. No range limit.
pub fn resolve_retaliate(ctx: &mut ActionContext<'_>, action: &PlayerAction, member: &CrewMember, target: &Target) -> Result<()> {
    actor::require_section(&ctx.player, member, ShipSection::Defense, ActionType::Retaliate)?;
    if !ctx.player.attacked_by.contains(&actor::attacker_for(target)) {
        return Err(ActionError::NotAnAttacker(actor::target_label(target)).into());
    }
    if let Target::Object(id) = target {
        if !matches!(ctx.object(id)?.kind, ObjectKind::HostileShip { .. }) {
            return Err(ActionError::InvalidPayload(format!("'{}' is no longer a hostile ship", id)).into());
        }
    } else {
        require_damageable(ctx, target)?;
    }

    if action.stim {
        actor::consume_stim(&mut ctx.player, ShipSection::Defense)?;
    }
    ctx.spend_power(ShipSection::Defense, RETALIATE_POWER_COST)?;
    let roll = roll_keyed(&ctx.key("retaliate", member.id.as_str()), 6);
    let damage = actor::with_stim(roll + effective_bonus(&ctx.player, member, BonusKind::Attack), action.stim);
    debug!(player = %ctx.player.id, target = %actor::target_label(target), damage, "retaliate");
    queue_damage(ctx, target, damage, false);
    Ok(())
}
