//! The environment phase: ring damage, hazards, orbital motion, collisions,
//! and hostile ships.

use tracing::{debug, warn};

use crate::board::{GameState, ObjectKind, PlayerState, RingColor, ShipSection, TurnPhase};
use crate::error::Result;

use super::damage::{damage_every_section, damage_object, damage_section, damage_ship};
use super::hostiles::run_hostiles;
use super::pipeline::require_phase;

/// Rotation per turn in degrees, one entry per pair of rings from the outside
/// in. Rings past the table use the last entry.
pub const ROTATION_DEGREES: [u32; 4] = [30, 45, 60, 90];

/// Hull a hostile loses when it rams a ship.
pub const RAM_SELF_DAMAGE: u32 = 3;

/// Spaces ring `index` turns each turn.
pub fn rotation_spaces(index: usize, num_spaces: u32) -> u32 {
    let degrees = ROTATION_DEGREES[(index / 2).min(ROTATION_DEGREES.len() - 1)];
    (degrees * num_spaces + 180) / 360
}

fn ring_damage(player: &mut PlayerState, color: RingColor) {
    let ship = &mut player.ship;
    match color {
        RingColor::Green => return,
        RingColor::Yellow => {}
        RingColor::Orange => {
            let worn: Vec<_> = ship.edges().filter(|&(_, _, n)| n >= 2).map(|(a, b, _)| (a, b)).collect();
            for (a, b) in worn {
                ship.degrade_conduit(a, b);
            }
        }
        RingColor::Red => {
            let links: Vec<_> = ship.edges().map(|(a, b, _)| (a, b)).collect();
            for (a, b) in links {
                ship.degrade_conduit(a, b);
                ship.set_corridor(a, b, false);
            }
        }
    }
    let per_section = match color {
        RingColor::Green => 0,
        RingColor::Yellow => 1,
        RingColor::Orange => 2,
        RingColor::Red => 3,
    };
    damage_every_section(player, per_section);
}

/// Damages every active ship according to the colour of its ring. Nothing
/// happens on the first turn.
pub fn apply_environment_damage(state: &GameState) -> Result<GameState> {
    require_phase(state, TurnPhase::Environment)?;
    let mut next = state.clone();
    if next.current_turn <= 1 {
        return Ok(next);
    }
    let board = &state.board;
    for player in next.players.values_mut().filter(|p| p.is_active()) {
        let Some(ring) = board.ring(player.ship.position.ring) else { continue };
        ring_damage(player, ring.color);
        if ring.color != RingColor::Green {
            debug!(player = %player.id, color = ?ring.color, "ring damage");
        }
    }
    Ok(next)
}

/// Each hazard within one space of an active ship hits it for its intensity
/// and drains one life support.
pub fn apply_hazard_damage(state: &GameState) -> Result<GameState> {
    require_phase(state, TurnPhase::Environment)?;
    let mut next = state.clone();
    let board = &state.board;
    for player in next.players.values_mut().filter(|p| p.is_active()) {
        for obj in &board.objects {
            let ObjectKind::Hazard { intensity } = obj.kind else { continue };
            if board.distance(obj.position, player.ship.position) <= 1 {
                damage_ship(player, intensity);
                player.ship.life_support = player.ship.life_support.saturating_sub(1);
                debug!(player = %player.id, hazard = %obj.id, intensity, "hazard damage");
            }
        }
    }
    Ok(next)
}

fn rotate_rings(state: &mut GameState) {
    let sign = state.settings.rotation.sign();
    for index in 0..state.board.rings.len() {
        let n = state.board.rings[index].num_spaces;
        if n == 0 {
            continue;
        }
        let delta = sign * i64::from(rotation_spaces(index, n));
        let ring = &mut state.board.rings[index];
        ring.rotation_offset = (i64::from(ring.rotation_offset) + delta).rem_euclid(i64::from(n)) as u32;

        let board = &state.board;
        let moved_objects: Vec<_> = board
            .objects
            .iter()
            .map(|o| if o.position.ring == index { board.advance_along_ring(o.position, delta) } else { o.position })
            .collect();
        for (obj, pos) in state.board.objects.iter_mut().zip(moved_objects) {
            obj.position = pos;
        }
        for player in state.players.values_mut() {
            if player.is_active() && player.ship.position.ring == index {
                player.ship.position = state.board.advance_along_ring(player.ship.position, delta);
            }
        }
    }
}

fn apply_infall(state: &mut GameState) {
    let interval = state.settings.infall_interval;
    if interval == 0 || state.current_turn % interval != 0 {
        return;
    }
    let innermost = state.board.innermost_ring();
    let before = state.board.objects.len();
    state.board.objects.retain(|o| o.position.ring < innermost);
    let swallowed = before - state.board.objects.len();
    let board = &state.board;
    let drifted: Vec<_> = board.objects.iter().map(|o| board.change_ring(o.position, o.position.ring + 1)).collect();
    for (obj, pos) in state.board.objects.iter_mut().zip(drifted) {
        obj.position = pos;
    }
    debug!(turn = state.current_turn, swallowed, "objects fell inward");
}

fn resolve_collisions(state: &mut GameState) {
    for pid in state.active_player_ids() {
        let Some(pos) = state.player(&pid).map(|p| p.ship.position) else { continue };
        let colliders: Vec<_> = state
            .board
            .objects
            .iter()
            .filter(|o| o.position == pos && !o.kind.is_hazard())
            .map(|o| (o.id.clone(), o.kind.collision_damage(), matches!(o.kind, ObjectKind::HostileShip { .. })))
            .collect();
        for (oid, damage, ramming) in colliders {
            if let Some(player) = state.player_mut(&pid) {
                let section: ShipSection = player.ship.largest_hull_section();
                damage_section(player, section, damage);
                debug!(player = %pid, object = %oid, damage, section = section.name(), "collision");
            }
            if ramming {
                if let Some(obj) = state.board.object_mut(&oid) {
                    damage_object(obj, RAM_SELF_DAMAGE);
                }
            }
        }
    }

    let objects = &state.board.objects;
    for (i, a) in objects.iter().enumerate() {
        for b in &objects[i + 1..] {
            if a.position == b.position && !a.kind.is_hazard() && !b.kind.is_hazard() {
                warn!(a = %a.id, b = %b.id, ring = a.position.ring, space = a.position.space, "objects share a space; no collision rule applies");
            }
        }
    }
}

/// Rotates the rings, lets objects fall inward, resolves collisions, and
/// runs the hostiles. The phase moves to `Resolution`.
pub fn update_orbits_and_objects(state: &GameState) -> Result<GameState> {
    require_phase(state, TurnPhase::Environment)?;
    let mut next = state.clone();
    rotate_rings(&mut next);
    apply_infall(&mut next);
    resolve_collisions(&mut next);
    run_hostiles(&mut next);
    next.turn_phase = TurnPhase::Resolution;
    Ok(next)
}
