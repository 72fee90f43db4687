//! Assembling torpedoes and probes, and integrating upgrades.

use tracing::debug;

use crate::board::crew::AssemblyProgress;
use crate::board::{ActionType, AssemblyItem, CrewMember, PlayerAction, Resources, ShipSection, UpgradeKind};
use crate::bonus::{effective_bonus, BonusKind};
use crate::error::{ActionError, EngineError, Result};

use super::actor::{self, ActionContext};

pub const ASSEMBLE_BASE: u32 = 2;

/// Points needed to finish an item.
pub const fn assembly_points(item: AssemblyItem) -> u32 {
    match item {
        AssemblyItem::Torpedo => 6,
        AssemblyItem::Probe => 4,
    }
}

/// Resources consumed when an item is finished.
pub fn assembly_cost(item: AssemblyItem) -> Resources {
    match item {
        AssemblyItem::Torpedo => Resources { fuel: 1, scrap: 1, ..Default::default() },
        AssemblyItem::Probe => Resources { electronics: 1, ..Default::default() },
    }
}

fn item_name(item: AssemblyItem) -> &'static str {
    match item {
        AssemblyItem::Torpedo => "torpedo",
        AssemblyItem::Probe => "probe",
    }
}

/// Assemble: one engineering power for `2 + bonus` points toward `item`.
///
/// Progress lives on the crew member and resets when they switch items. The
/// item's resources must be on hand for every step and are paid on completion.
pub fn resolve_assemble(ctx: &mut ActionContext<'_>, action: &PlayerAction, member: &CrewMember, item: AssemblyItem) -> Result<()> {
    actor::require_section(&ctx.player, member, ShipSection::Engineering, ActionType::Assemble)?;
    let cost = assembly_cost(item);
    if !ctx.player.resources.covers(&cost) {
        return Err(ActionError::InsufficientResources {
            player: ctx.player_id(),
            purpose: format!("assembling a {}", item_name(item)),
        }
        .into());
    }

    if action.stim {
        actor::consume_stim(&mut ctx.player, ShipSection::Engineering)?;
    }
    ctx.spend_power(ShipSection::Engineering, 1)?;
    let points = actor::with_stim(ASSEMBLE_BASE + effective_bonus(&ctx.player, member, BonusKind::Assemble), action.stim);

    let crew = ctx
        .player
        .member_mut(&member.id)
        .ok_or_else(|| EngineError::invariant(format!("acting member '{}' vanished", member.id)))?;
    let progress = match crew.assembly {
        Some(p) if p.item == item => p.points + points,
        _ => points,
    };
    if progress < assembly_points(item) {
        crew.assembly = Some(AssemblyProgress { item, points: progress });
        debug!(crew = %member.id, item = item_name(item), progress, "assembly progress");
        return Ok(());
    }
    crew.assembly = None;

    ctx.player.resources = ctx.player.resources.checked_sub(&cost).ok_or_else(|| ActionError::InsufficientResources {
        player: ctx.player.id.clone(),
        purpose: format!("assembling a {}", item_name(item)),
    })?;
    match item {
        AssemblyItem::Torpedo => ctx.player.inventory.torpedoes += 1,
        AssemblyItem::Probe => ctx.player.inventory.probes += 1,
    }
    debug!(player = %ctx.player.id, item = item_name(item), "assembled");
    Ok(())
}

/// Integrate: pays the catalog cost to install a pending upgrade. The actor
/// works from the upgrade's host section.
pub fn resolve_integrate(ctx: &mut ActionContext<'_>, member: &CrewMember, upgrade: UpgradeKind) -> Result<()> {
    let Some(slot) = ctx.player.pending_upgrades.iter().position(|u| *u == upgrade) else {
        return Err(ActionError::UpgradeNotPending(upgrade).into());
    };
    actor::require_section(&ctx.player, member, upgrade.host_section(), ActionType::Integrate)?;
    let card = ctx
        .catalog
        .upgrade_for_kind(upgrade)
        .ok_or_else(|| EngineError::invariant(format!("catalog has no card for upgrade {:?}", upgrade)))?;
    ctx.player.resources = ctx.player.resources.checked_sub(&card.cost).ok_or_else(|| ActionError::InsufficientResources {
        player: ctx.player.id.clone(),
        purpose: format!("integrating {}", card.id),
    })?;
    ctx.player.pending_upgrades.remove(slot);
    ctx.player.installed_upgrades.push(upgrade);
    debug!(player = %ctx.player.id, ?upgrade, "upgrade integrated");
    Ok(())
}
