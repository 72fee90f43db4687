//! Restore, route, and repair.

use tracing::debug;

use crate::board::section::{has_corridor, max_conduits};
use crate::board::{ActionType, CrewMember, PlayerAction, PowerTransfer, RepairTarget, ShipSection};
use crate::bonus::{effective_bonus, BonusKind};
use crate::error::{ActionError, Result};
use crate::power;

use super::actor::{self, ActionContext};

/// Base power generated by a restore in engineering.
pub const RESTORE_BASE: u32 = 3;

/// Hull restored per repair point.
pub const HULL_PER_REPAIR: u32 = 2;

fn apply_transfers(ctx: &mut ActionContext<'_>, transfers: &[PowerTransfer]) -> Result<()> {
    for t in transfers {
        power::transfer(&mut ctx.player.ship, t.from, t.to, t.amount, ctx.ledger)
            .map_err(|source| ActionError::Power { player: ctx.player.id.clone(), source })?;
    }
    Ok(())
}

/// Restore: an actor in engineering generates power there, then any listed
/// transfers are applied. Works from any section with hull.
pub fn resolve_restore(ctx: &mut ActionContext<'_>, action: &PlayerAction, member: &CrewMember, transfers: &[PowerTransfer]) -> Result<()> {
    let section = actor::location(member)?;
    actor::require_intact(&ctx.player, section)?;
    if action.stim {
        actor::consume_stim(&mut ctx.player, section)?;
    }
    if section == ShipSection::Engineering {
        let bonus = effective_bonus(&ctx.player, member, BonusKind::Restore);
        let generated = actor::with_stim(RESTORE_BASE + bonus, action.stim);
        power::add(&mut ctx.player.ship, ShipSection::Engineering, generated);
        debug!(player = %ctx.player.id, crew = %member.id, generated, "restore");
    }
    apply_transfers(ctx, transfers)
}

/// Route: moves power along conduits. The actor must be in engineering.
pub fn resolve_route(ctx: &mut ActionContext<'_>, member: &CrewMember, transfers: &[PowerTransfer]) -> Result<()> {
    actor::require_section(&ctx.player, member, ShipSection::Engineering, ActionType::Route)?;
    if transfers.is_empty() {
        return Err(ActionError::InvalidPayload("route needs at least one transfer".into()).into());
    }
    apply_transfers(ctx, transfers)
}

/// Repair costs one power from the actor's section.
///
/// Hull may be repaired in the actor's own section or one joined to it by an
/// intact corridor; conduits and corridors only from the section itself.
pub fn resolve_repair(
    ctx: &mut ActionContext<'_>,
    action: &PlayerAction,
    member: &CrewMember,
    section: ShipSection,
    target: RepairTarget,
) -> Result<()> {
    let here = actor::location(member)?;
    actor::require_intact(&ctx.player, here)?;
    let reachable = match target {
        RepairTarget::Hull => here == section || ctx.player.ship.corridor_intact(here, section),
        RepairTarget::Conduit(_) | RepairTarget::Corridor(_) => here == section,
    };
    if !reachable {
        return Err(ActionError::WrongSection { crew: member.id.clone(), action: ActionType::Repair, required: section }.into());
    }

    // Reject no-op repairs before paying for them.
    match target {
        RepairTarget::Hull if ctx.player.ship.hull(section) >= section.max_hull() => {
            return Err(ActionError::InvalidPayload(format!("{} hull is already full", section.name())).into());
        }
        RepairTarget::Conduit(to) if ctx.player.ship.conduits(section, to) >= max_conduits(section, to) => {
            return Err(ActionError::InvalidPayload(format!(
                "conduits {}-{} are already at their maximum",
                section.name(),
                to.name()
            ))
            .into());
        }
        RepairTarget::Corridor(to) if !has_corridor(section, to) || ctx.player.ship.corridor_intact(section, to) => {
            return Err(ActionError::InvalidPayload(format!(
                "no damaged corridor between {} and {}",
                section.name(),
                to.name()
            ))
            .into());
        }
        _ => {}
    }

    if action.stim {
        actor::consume_stim(&mut ctx.player, here)?;
    }
    ctx.spend_power(here, 1)?;
    let bonus = effective_bonus(&ctx.player, member, BonusKind::Repair);

    match target {
        RepairTarget::Hull => {
            let amount = actor::with_stim(HULL_PER_REPAIR * (1 + bonus), action.stim);
            let repaired = ctx.player.ship.repair_hull(section, amount);
            debug!(player = %ctx.player.id, section = section.name(), repaired, "hull repaired");
        }
        RepairTarget::Conduit(to) => {
            let restored = actor::with_stim(1, action.stim) as u8;
            let count = (ctx.player.ship.conduits(section, to) + restored).min(max_conduits(section, to));
            ctx.player.ship.set_conduits(section, to, count);
        }
        RepairTarget::Corridor(to) => ctx.player.ship.set_corridor(section, to, true),
    }
    Ok(())
}
