//! The event phase: draw and resolve the top event card.

use tracing::debug;

use crate::board::{EventRuntimeState, GameState, PlayerStatus, Position, SpaceObject, TurnPhase};
use crate::catalog::{Catalog, EventEffect};
use crate::error::{EngineError, Result};
use crate::rng::{entity_key, KeyedRng};

use super::pipeline::require_phase;

/// Resolves the next event card, if any remain, and opens the action phase.
pub fn apply_event_phase(state: &GameState, catalog: &Catalog) -> Result<GameState> {
    require_phase(state, TurnPhase::Event)?;
    let mut next = state.clone();
    let turn = next.current_turn;

    if next.event_runtime.as_ref().is_some_and(|rt| rt.expires_turn < turn) {
        next.event_runtime = None;
    }

    if !next.event_deck.is_empty() {
        let card_id = next.event_deck.remove(0);
        let card = catalog
            .event(&card_id)
            .ok_or_else(|| EngineError::invariant(format!("event deck holds unknown card '{}'", card_id)))?;
        debug!(game = %next.id, turn, event = %card.id, "event drawn");
        resolve_effect(&mut next, &card.id, &card.effect)?;
        next.last_resolved_event = Some(card_id);
    }

    next.turn_phase = TurnPhase::ActionExecution;
    Ok(next)
}

fn resolve_effect(state: &mut GameState, card_id: &str, effect: &EventEffect) -> Result<()> {
    let turn = state.current_turn;
    match effect {
        EventEffect::SpawnObject { object, ring } => {
            let mut rng = KeyedRng::new(&entity_key("spawn", &state.id, turn, card_id));
            let innermost = state.board.innermost_ring();
            let ring = match ring {
                Some(r) => (*r).min(innermost),
                None => rng.index(state.board.rings.len()),
            };
            let spaces = state.board.ring(ring).map_or(0, |r| r.num_spaces) as usize;
            let position = Position::new(ring, rng.index(spaces) as u32);
            state
                .board
                .validate_position(position)
                .map_err(EngineError::Invariant)?;
            let id = state.allocate_object_id();
            debug!(object = %id, kind = object.label(), ring, space = position.space, "object spawned");
            state.board.objects.push(SpaceObject { id, position, kind: object.clone(), loot: None });
        }
        EventEffect::ShieldDrain { amount } => {
            for p in state.players.values_mut().filter(|p| p.is_active()) {
                p.ship.shields = p.ship.shields.saturating_sub(*amount);
            }
        }
        EventEffect::IonStorm { scan_penalty } => {
            state.event_runtime = Some(EventRuntimeState {
                event_id: card_id.to_string(),
                expires_turn: turn,
                scan_penalty: *scan_penalty,
            });
        }
        EventEffect::GravitationalSurge => {
            let innermost = state.board.innermost_ring();
            let board = &state.board;
            for p in state.players.values_mut().filter(|p| p.is_active()) {
                let pos = p.ship.position;
                if pos.ring >= innermost {
                    p.status = PlayerStatus::Wrecked;
                    debug!(player = %p.id, "pulled into the black hole");
                } else {
                    p.ship.position = board.change_ring(pos, pos.ring + 1);
                }
            }
        }
        EventEffect::SupplyDrop { resources } => {
            for p in state.players.values_mut().filter(|p| p.is_active()) {
                p.resources.add(resources);
            }
        }
        EventEffect::Calm => {}
    }
    Ok(())
}
