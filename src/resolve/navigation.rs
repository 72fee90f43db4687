//! Ship maneuvers.

use tracing::{debug, info};

use crate::board::{ActionType, CrewMember, ManeuverDirection, PlayerAction, PlayerStatus, ShipSection};
use crate::bonus::{effective_bonus, BonusKind};
use crate::error::{ActionError, EngineError, Result};

use super::actor::{self, ActionContext};

/// Maneuver: spends drive power for thrust `power + bonus`.
///
/// Prograde and retrograde move that many spaces along the ring. Climbing
/// outward needs thrust at least the ring's speed requirement; leaving the
/// outermost ring needs the escape speed and takes the ship out of play.
pub fn resolve_maneuver(
    ctx: &mut ActionContext<'_>,
    action: &PlayerAction,
    member: &CrewMember,
    direction: ManeuverDirection,
    power: u32,
) -> Result<()> {
    actor::require_section(&ctx.player, member, ShipSection::Bridge, ActionType::Maneuver)?;
    actor::require_powered(&ctx.player, ShipSection::Bridge)?;
    actor::require_intact(&ctx.player, ShipSection::Drives)?;
    if power == 0 {
        return Err(ActionError::InvalidPayload("maneuver needs at least 1 power".into()).into());
    }

    let snapshot = ctx.snapshot;
    let board = &snapshot.board;
    let pos = ctx.player.ship.position;
    let ring = board
        .ring(pos.ring)
        .ok_or_else(|| EngineError::invariant(format!("ship of '{}' is on missing ring {}", ctx.player.id, pos.ring)))?;
    if direction == ManeuverDirection::Inward && pos.ring >= board.innermost_ring() {
        return Err(ActionError::InnermostRing.into());
    }

    if action.stim {
        actor::consume_stim(&mut ctx.player, ShipSection::Bridge)?;
    }
    ctx.spend_power(ShipSection::Drives, power)?;
    let thrust = actor::with_stim(power + effective_bonus(&ctx.player, member, BonusKind::Maneuver), action.stim);

    match direction {
        ManeuverDirection::Prograde => {
            ctx.player.ship.position = board.advance_along_ring(pos, i64::from(thrust));
        }
        ManeuverDirection::Retrograde => {
            ctx.player.ship.position = board.advance_along_ring(pos, -i64::from(thrust));
        }
        ManeuverDirection::Inward => {
            ctx.player.ship.position = board.change_ring(pos, pos.ring + 1);
        }
        ManeuverDirection::Outward if pos.ring == 0 => {
            let required = snapshot.settings.escape_speed;
            if thrust < required {
                return Err(ActionError::InsufficientThrust { thrust, required }.into());
            }
            ctx.player.status = PlayerStatus::Escaped;
            info!(player = %ctx.player.id, turn = ctx.turn(), "ship escaped");
        }
        ManeuverDirection::Outward => {
            let required = ring.speed_requirement;
            if thrust < required {
                return Err(ActionError::InsufficientThrust { thrust, required }.into());
            }
            ctx.player.ship.position = board.change_ring(pos, pos.ring - 1);
        }
    }
    ctx.player.ship.speed = thrust;
    debug!(player = %ctx.player.id, ?direction, thrust, ring = ctx.player.ship.position.ring, "maneuver");
    Ok(())
}
