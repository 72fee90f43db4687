//! Reviving unconscious crew.

use tracing::debug;

use crate::board::{ActionType, CrewId, CrewMember, CrewStatus, PlayerAction, ShipSection, REVIVE_THRESHOLD};
use crate::bonus::{effective_bonus, BonusKind};
use crate::error::{ActionError, Result};
use crate::rng::roll_keyed;

use super::actor::{self, ActionContext};

/// Extra revive points while the med lab is fully powered.
pub const FULL_POWER_REVIVE_BONUS: u32 = 2;

/// Revive: adds `d6 + bonus (+2 if the med lab is fully powered)` to the
/// target's progress. At the threshold the target wakes up in the med lab.
pub fn resolve_revive(ctx: &mut ActionContext<'_>, action: &PlayerAction, member: &CrewMember, target: &CrewId) -> Result<()> {
    actor::require_section(&ctx.player, member, ShipSection::MedLab, ActionType::Revive)?;
    actor::require_powered(&ctx.player, ShipSection::MedLab)?;

    let unknown = || ActionError::UnknownCrew { player: ctx.player.id.clone(), crew: target.clone() };
    let patient = ctx.player.member(target).ok_or_else(unknown)?;
    if patient.status != CrewStatus::Unconscious {
        return Err(ActionError::NotUnconscious(target.clone()).into());
    }

    if action.stim {
        actor::consume_stim(&mut ctx.player, ShipSection::MedLab)?;
    }
    let roll = roll_keyed(&ctx.key("revive", member.id.as_str()), 6);
    let full_power = if ctx.player.ship.is_fully_powered(ShipSection::MedLab) {
        FULL_POWER_REVIVE_BONUS
    } else {
        0
    };
    let bonus = effective_bonus(&ctx.player, member, BonusKind::Revive);
    let points = actor::with_stim(roll + bonus + full_power, action.stim);

    let Some(patient) = ctx.player.member_mut(target) else {
        return Ok(());
    };
    patient.revive_progress += points;
    if patient.revive_progress >= REVIVE_THRESHOLD {
        patient.revive_into(ShipSection::MedLab);
        debug!(crew = %target, "revived");
    } else {
        debug!(crew = %target, progress = patient.revive_progress, "revive progress");
    }
    Ok(())
}
