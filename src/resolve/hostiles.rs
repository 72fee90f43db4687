//! Hostile ship behaviour.
//!
//! Each hostile hunts the nearest active ship: it closes one step per turn,
//! fires point blank within one space, and launches its single torpedo from
//! two or three spaces out. A cloaked ship costs the hostile a turn of
//! scanning before it can be engaged.

use tracing::debug;

use crate::board::{Attacker, GameState, ObjectKind, PlayerId, Position, UpgradeKind};
use crate::rng::{entity_key, roll_keyed};

use super::pipeline::commit_player_damage;

pub const HOSTILE_ATTACK_BONUS: u32 = 1;
pub const HOSTILE_TORPEDO_DAMAGE: u32 = 8;

/// The nearest active ship to `from`; ties go to join order.
pub fn nearest_player(state: &GameState, from: Position) -> Option<(PlayerId, u32)> {
    let mut best: Option<(PlayerId, u32)> = None;
    for id in state.active_player_ids() {
        let Some(p) = state.player(&id) else { continue };
        let d = state.board.distance(from, p.ship.position);
        if best.as_ref().map_or(true, |(_, bd)| d < *bd) {
            best = Some((id, d));
        }
    }
    best
}

/// One step toward `to`: change ring first, then move along the shorter arc.
fn step(state: &GameState, from: Position, to: Position) -> Position {
    let board = &state.board;
    if from.ring < to.ring {
        board.change_ring(from, from.ring + 1)
    } else if from.ring > to.ring {
        board.change_ring(from, from.ring - 1)
    } else {
        board.advance_along_ring(from, board.step_toward(from, to))
    }
}

/// Runs every hostile in board order.
pub fn run_hostiles(state: &mut GameState) {
    let hostiles: Vec<_> = state
        .board
        .objects
        .iter()
        .filter(|o| matches!(o.kind, ObjectKind::HostileShip { .. }))
        .map(|o| o.id.clone())
        .collect();

    for id in hostiles {
        let Some(obj) = state.board.object(&id) else { continue };
        let here = obj.position;
        let (scanned, has_torpedo) = match &obj.kind {
            ObjectKind::HostileShip { cloak_scanned, has_torpedo, .. } => (cloak_scanned.clone(), *has_torpedo),
            _ => continue,
        };
        let Some((target, _)) = nearest_player(state, here) else {
            return;
        };
        let Some(victim) = state.player(&target) else { continue };
        let target_pos = victim.ship.position;

        if victim.has_powered_upgrade(UpgradeKind::Cloak) && !scanned.contains(&target) {
            if let Some(ObjectKind::HostileShip { cloak_scanned, .. }) = state.board.object_mut(&id).map(|o| &mut o.kind) {
                cloak_scanned.push(target.clone());
            }
            debug!(hostile = %id, player = %target, "hostile scanning cloaked ship");
            continue;
        }

        let mut pos = here;
        if state.board.distance(pos, target_pos) > 1 {
            pos = step(state, pos, target_pos);
            if let Some(obj) = state.board.object_mut(&id) {
                obj.position = pos;
            }
        }

        let distance = state.board.distance(pos, target_pos);
        if distance <= 1 {
            let key = entity_key("hostile", &state.id, state.current_turn, id.as_str());
            let damage = roll_keyed(&key, 6) + HOSTILE_ATTACK_BONUS;
            debug!(hostile = %id, player = %target, damage, "hostile attack");
            commit_player_damage(state, Attacker::Object(id.clone()), &target, damage, false);
        } else if (2..=3).contains(&distance) && has_torpedo {
            if let Some(ObjectKind::HostileShip { has_torpedo, .. }) = state.board.object_mut(&id).map(|o| &mut o.kind) {
                *has_torpedo = false;
            }
            debug!(hostile = %id, player = %target, "hostile torpedo");
            commit_player_damage(state, Attacker::Object(id.clone()), &target, HOSTILE_TORPEDO_DAMAGE, true);
        }
    }
}
