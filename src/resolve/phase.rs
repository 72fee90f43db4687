//! Turn sequencing.
//!
//! A turn runs `Event -> ActionExecution -> Environment -> Resolution`, then
//! `advance_turn` opens the next turn's event phase. `process_turn` drives the
//! whole cycle in one call.

use tracing::{debug, info};

use crate::board::{
    CaptainType, CrewKind, GameState, GameStatus, PlayerState, PlayerStatus, ShipSection, TurnPhase, UpgradeKind,
};
use crate::bonus::mission_score;
use crate::catalog::Catalog;
use crate::error::{EngineError, Result};
use crate::power;

use super::environment::{apply_environment_damage, apply_hazard_damage, update_orbits_and_objects};
use super::events::apply_event_phase;
use super::pipeline::{apply_player_actions, require_phase};
use super::ActionBatch;

/// Power engineering generates on its own each turn.
pub const AUTO_GENERATE_POWER: u32 = 2;
pub const HOSTILE_KILL_POINTS: u32 = 5;
pub const ESCAPE_POINTS: u32 = 20;

/// Knock-out order when life support runs short: basic crew from the last
/// one created, then officers likewise, then the captain.
fn knock_out_order(player: &PlayerState) -> Vec<usize> {
    let basic = player.crew.iter().enumerate().rev().filter(|(_, m)| m.kind.is_basic());
    let officers = player.crew.iter().enumerate().rev().filter(|(_, m)| matches!(m.kind, CrewKind::Officer(_)));
    basic.chain(officers).map(|(i, _)| i).collect()
}

fn enforce_life_support(player: &mut PlayerState) {
    let supported = player.ship.life_support as usize;
    let mut excess = player.active_member_count().saturating_sub(supported);
    if excess == 0 {
        return;
    }
    debug!(player = %player.id, excess, "life support short");
    for i in knock_out_order(player) {
        if excess == 0 {
            return;
        }
        if player.crew[i].is_active() {
            player.crew[i].knock_out();
            excess -= 1;
        }
    }
    if excess > 0 {
        player.captain.knock_out();
    }
}

/// End-of-turn upkeep: engineering regenerates, captains and recyclers top
/// up life support, and crew beyond what life support covers pass out.
pub fn apply_auto_generate(state: &GameState) -> Result<GameState> {
    require_phase(state, TurnPhase::Resolution)?;
    let mut next = state.clone();
    for player in next.players.values_mut().filter(|p| p.is_active()) {
        if player.ship.hull(ShipSection::Engineering) > 0 {
            power::add(&mut player.ship, ShipSection::Engineering, AUTO_GENERATE_POWER);
        }
        if player.captain_type() == CaptainType::Survivor {
            player.ship.life_support += 1;
        }
        if player.has_powered_upgrade(UpgradeKind::LifeSupportRecycler) {
            player.ship.life_support += 1;
        }
        enforce_life_support(player);
    }
    Ok(next)
}

/// Final score for one player.
pub fn score_player(player: &PlayerState, catalog: &Catalog) -> u32 {
    let missions = mission_score(player.captain_type(), catalog.mission_points(player));
    let escape = if player.status == PlayerStatus::Escaped { ESCAPE_POINTS } else { 0 };
    player.resources.total() + HOSTILE_KILL_POINTS * player.stats.hostiles_destroyed + missions + escape
}

/// Wrecks ships that can no longer fly and ends the game once nobody is left
/// in play.
pub fn apply_game_state_transitions(state: &GameState, catalog: &Catalog) -> Result<GameState> {
    if state.status != GameStatus::InProgress {
        return Err(EngineError::NotInProgress { status: state.status });
    }
    let mut next = state.clone();
    let out_of_time = next.current_turn >= next.settings.max_turns;
    for player in next.players.values_mut().filter(|p| p.is_active()) {
        let reason = if player.ship.total_hull() == 0 {
            Some("hull destroyed")
        } else if player.active_member_count() == 0 {
            Some("no active crew")
        } else if out_of_time {
            Some("out of time")
        } else {
            None
        };
        if let Some(reason) = reason {
            player.status = PlayerStatus::Wrecked;
            info!(player = %player.id, reason, "ship lost");
        }
    }

    if next.players.values().all(|p| !p.is_active()) {
        let escaped = next.players.values().any(|p| p.status == PlayerStatus::Escaped);
        next.status = if escaped { GameStatus::Completed } else { GameStatus::Abandoned };
        for player in next.players.values_mut() {
            player.score = score_player(player, catalog);
        }
        info!(game = %next.id, turn = next.current_turn, status = %next.status, "game ended");
    }
    Ok(next)
}

/// Opens the next turn.
pub fn advance_turn(state: &GameState) -> Result<GameState> {
    require_phase(state, TurnPhase::Resolution)?;
    let mut next = state.clone();
    next.current_turn += 1;
    next.turn_phase = TurnPhase::Event;
    Ok(next)
}

/// Runs a full turn from the event phase. Players taken out of play by the
/// event are dropped from the batch. Stops before advancing if the game ends.
pub fn process_turn(state: &GameState, batch: &ActionBatch, catalog: &Catalog) -> Result<GameState> {
    process_turn_with(state, catalog, |next| {
        let active = next.active_player_ids();
        batch
            .iter()
            .filter(|(id, _)| active.contains(id))
            .map(|(id, actions)| (id.clone(), actions.clone()))
            .collect()
    })
}

/// Like `process_turn`, but the batch is chosen after the event card has
/// resolved, from the state the actions will actually run against.
pub fn process_turn_with<F>(state: &GameState, catalog: &Catalog, choose: F) -> Result<GameState>
where
    F: FnOnce(&GameState) -> ActionBatch,
{
    require_phase(state, TurnPhase::Event)?;
    let next = apply_event_phase(state, catalog)?;
    let batch = choose(&next);
    let next = apply_player_actions(&next, &batch, catalog)?;

    let next = apply_environment_damage(&next)?;
    let next = apply_hazard_damage(&next)?;
    let next = update_orbits_and_objects(&next)?;
    let next = apply_auto_generate(&next)?;
    let next = apply_game_state_transitions(&next, catalog)?;
    if next.status != GameStatus::InProgress {
        return Ok(next);
    }
    advance_turn(&next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{CrewStatus, PlayerId, Resources};
    use crate::resolve::test_support::sample_game;

    fn resolution_game() -> GameState {
        let mut g = sample_game();
        g.turn_phase = TurnPhase::Resolution;
        g
    }

    fn p1(g: &GameState) -> &PlayerState {
        g.player(&PlayerId::from("p1")).unwrap()
    }

    #[test]
    fn auto_generate_adds_engineering_power() {
        let g = resolution_game();
        let next = apply_auto_generate(&g).unwrap();
        assert_eq!(p1(&next).ship.power(ShipSection::Engineering), 10);
    }

    #[test]
    fn short_life_support_knocks_out_basic_crew_first() {
        let mut g = resolution_game();
        // Eight members aboard.
        g.player_mut(&PlayerId::from("p1")).unwrap().ship.life_support = 5;
        let next = apply_auto_generate(&g).unwrap();
        let p = p1(&next);
        assert_eq!(p.active_member_count(), 5);
        let out: Vec<_> = p.crew.iter().filter(|m| m.status == CrewStatus::Unconscious).map(|m| m.id.as_str()).collect();
        assert_eq!(out, vec!["p1-crew-3", "p1-crew-4", "p1-crew-5"]);
        assert!(p.captain.is_active());
    }

    #[test]
    fn out_of_turns_ends_the_game() {
        let mut g = resolution_game();
        g.current_turn = g.settings.max_turns;
        g.player_mut(&PlayerId::from("p2")).unwrap().status = PlayerStatus::Escaped;
        g.player_mut(&PlayerId::from("p2")).unwrap().resources = Resources { fuel: 2, ..Default::default() };
        let next = apply_game_state_transitions(&g, &Catalog::standard()).unwrap();
        assert_eq!(p1(&next).status, PlayerStatus::Wrecked);
        assert_eq!(next.status, GameStatus::Completed);
        // Resources 2, breakout mission 10, escape 20.
        assert_eq!(next.player(&PlayerId::from("p2")).unwrap().score, 32);
    }

    #[test]
    fn nobody_escaping_abandons_the_game() {
        let mut g = resolution_game();
        for p in g.players.values_mut() {
            for s in crate::board::ALL_SECTIONS {
                p.ship.set_hull(s, 0);
            }
        }
        let next = apply_game_state_transitions(&g, &Catalog::standard()).unwrap();
        assert_eq!(next.status, GameStatus::Abandoned);
        assert!(apply_game_state_transitions(&next, &Catalog::standard()).is_err());
    }

    #[test]
    fn advance_opens_next_turn() {
        let g = resolution_game();
        let next = advance_turn(&g).unwrap();
        assert_eq!(next.current_turn, 2);
        assert_eq!(next.turn_phase, TurnPhase::Event);
        assert!(advance_turn(&next).is_err());
    }

    #[test]
    fn process_turn_runs_a_full_cycle() {
        let mut g = sample_game();
        g.turn_phase = TurnPhase::Event;
        let batch: ActionBatch = g.active_player_ids().into_iter().map(|id| (id, Vec::new())).collect();
        let next = process_turn(&g, &batch, &Catalog::standard()).unwrap();
        assert_eq!(next.current_turn, 2);
        assert_eq!(next.turn_phase, TurnPhase::Event);
        assert_eq!(next.event_deck.len(), g.event_deck.len() - 1);
    }

    #[test]
    fn chooser_sees_the_post_event_state() {
        let mut g = sample_game();
        g.turn_phase = TurnPhase::Event;
        g.event_deck = vec!["ev-ion-storm".to_string()];
        let mut seen = 0;
        let next = process_turn_with(&g, &Catalog::standard(), |s| {
            seen = s.scan_penalty();
            s.active_player_ids().into_iter().map(|id| (id, Vec::new())).collect()
        })
        .unwrap();
        assert_eq!(seen, 2);
        assert_eq!(next.current_turn, 2);
    }
}
