//! The action execution phase.
//!
//! A batch holds every active player's actions for the turn. It is validated
//! as a whole, then resolved one action type at a time in `RESOLUTION_ORDER`.
//! Within a type, every player acts against the state as it stood when that
//! type began; changes that reach beyond the acting player are queued and
//! committed once all players have resolved. Any error discards the batch.

use std::collections::BTreeMap;

use tracing::debug;

use crate::board::{
    ActionKind, ActionType, Attacker, CrewMember, GameState, GameStatus, ObjectId, ObjectKind, PlayerAction,
    PlayerId, PlayerState, Resources, Target, TurnPhase, UpgradeKind, RESOLUTION_ORDER,
};
use crate::catalog::Catalog;
use crate::error::{ActionError, EngineError, Result};
use crate::power::{self, RoutingLedger};
use crate::rng::{entity_key, KeyedRng};

use super::actor::{self, ActionContext, SharedEffect};
use super::damage::{damage_object, damage_ship, ObjectDamage};
use super::sensors::roll_loot;
use super::{combat, engineering, fabrication, medical, navigation, sensors, ActionBatch};

/// Errors unless the game is running and in `phase`.
pub(crate) fn require_phase(state: &GameState, phase: TurnPhase) -> Result<()> {
    if state.status != GameStatus::InProgress {
        return Err(EngineError::NotInProgress { status: state.status });
    }
    if state.turn_phase != phase {
        return Err(EngineError::WrongPhase { expected: phase, actual: state.turn_phase });
    }
    Ok(())
}

/// Resolves one turn's batch of player actions.
///
/// On success the phase moves to `Environment`. On any error the input state
/// is left as it was.
pub fn apply_player_actions(state: &GameState, batch: &ActionBatch, catalog: &Catalog) -> Result<GameState> {
    require_phase(state, TurnPhase::ActionExecution)?;
    validate_batch(state, batch)?;

    let mut next = state.clone();
    let mut ledgers: BTreeMap<PlayerId, RoutingLedger> = BTreeMap::new();
    for action_type in RESOLUTION_ORDER {
        resolve_type(&mut next, state, batch, catalog, action_type, &mut ledgers)?;
    }

    let turn = next.current_turn;
    for player in next.players.values_mut() {
        if let Some(ledger) = ledgers.get(&player.id) {
            let coils = player.upgrade_ready(UpgradeKind::PowerCoils, turn);
            let report = power::settle_overloads(&mut player.ship, ledger, coils);
            if report.used_mitigation() {
                player.mark_upgrade_used(UpgradeKind::PowerCoils, turn);
            }
        }
        player.attacked_by.clear();
    }
    next.turn_phase = TurnPhase::Environment;
    Ok(next)
}

/// Checks submissions, actors, targets, and action counts before anything
/// resolves.
pub fn validate_batch(state: &GameState, batch: &ActionBatch) -> Result<()> {
    for id in state.active_player_ids() {
        if !batch.contains_key(&id) {
            return Err(ActionError::MissingSubmission(id).into());
        }
    }
    for (key, actions) in batch {
        let player = match state.player(key) {
            Some(p) if p.is_active() => p,
            _ => return Err(ActionError::UnexpectedSubmission(key.clone()).into()),
        };
        for action in actions {
            if action.player_id != *key {
                return Err(ActionError::PlayerMismatch { key: key.clone(), action_player: action.player_id.clone() }.into());
            }
            actor::acting_member(player, &action.crew_id)?;
            validate_targets(state, player, action)?;
        }
        validate_counts(player, actions)?;
    }
    Ok(())
}

fn validate_targets(state: &GameState, player: &PlayerState, action: &PlayerAction) -> Result<()> {
    if action.stim && matches!(action.kind, ActionKind::Route { .. } | ActionKind::Integrate { .. }) {
        return Err(ActionError::InvalidPayload(format!("a stim pack has no effect on {}", action.action_type())).into());
    }
    match &action.kind {
        ActionKind::Revive { target } => {
            if player.member(target).is_none() {
                return Err(ActionError::UnknownCrew { player: player.id.clone(), crew: target.clone() }.into());
            }
        }
        ActionKind::Scan { target } | ActionKind::Acquire { target } => require_object(state, target)?,
        ActionKind::Attack { target } | ActionKind::Launch { target, .. } | ActionKind::Retaliate { target } => match target {
            Target::Object(id) => require_object(state, id)?,
            Target::Player(id) => {
                if state.player(id).is_none() {
                    return Err(ActionError::UnknownPlayer(id.clone()).into());
                }
            }
        },
        _ => {}
    }
    Ok(())
}

fn require_object(state: &GameState, id: &ObjectId) -> Result<()> {
    if state.board.object(id).is_none() {
        return Err(ActionError::UnknownObject(id.clone()).into());
    }
    Ok(())
}

/// Each member acts once. With a powered Cybernetics or Temporal Shift, one
/// member may act twice.
fn validate_counts(player: &PlayerState, actions: &[PlayerAction]) -> Result<()> {
    let mut counts: BTreeMap<_, u32> = BTreeMap::new();
    for action in actions {
        *counts.entry(&action.crew_id).or_insert(0) += 1;
    }
    let mut extra_available = player.has_powered_upgrade(UpgradeKind::Cybernetics)
        || player.has_powered_upgrade(UpgradeKind::TemporalShift);
    for (crew, count) in counts {
        match count {
            1 => {}
            2 if extra_available => extra_available = false,
            _ => return Err(ActionError::TooManyActions { player: player.id.clone(), crew: crew.clone() }.into()),
        }
    }
    Ok(())
}

/// True if an earlier action type took the actor or the target out of play.
fn fizzled(original: &GameState, ctx: &ActionContext<'_>, action: &PlayerAction) -> bool {
    if !ctx.player.is_active() || !ctx.player.member(&action.crew_id).is_some_and(CrewMember::is_active) {
        return true;
    }
    let target = match &action.kind {
        ActionKind::Scan { target } | ActionKind::Acquire { target } => Some(Target::Object(target.clone())),
        ActionKind::Attack { target } | ActionKind::Launch { target, .. } | ActionKind::Retaliate { target } => {
            Some(target.clone())
        }
        _ => None,
    };
    match target {
        Some(Target::Object(id)) => original.board.object(&id).is_some() && ctx.snapshot.board.object(&id).is_none(),
        Some(Target::Player(id)) => {
            original.player(&id).is_some_and(PlayerState::is_active)
                && !ctx.snapshot.player(&id).is_some_and(PlayerState::is_active)
        }
        None => false,
    }
}

fn resolve_type(
    next: &mut GameState,
    original: &GameState,
    batch: &ActionBatch,
    catalog: &Catalog,
    action_type: ActionType,
    ledgers: &mut BTreeMap<PlayerId, RoutingLedger>,
) -> Result<()> {
    let snapshot = next.clone();
    let mut effects = Vec::new();
    let mut resolved = 0usize;

    for (pid, actions) in batch {
        let Some(player) = snapshot.player(pid) else {
            continue;
        };
        let mut of_type = actions.iter().filter(|a| a.action_type() == action_type).peekable();
        if of_type.peek().is_none() {
            continue;
        }
        let ledger = ledgers.entry(pid.clone()).or_default();
        let mut ctx = ActionContext::new(&snapshot, catalog, player.clone(), ledger);
        for action in of_type {
            if fizzled(original, &ctx, action) {
                debug!(player = %pid, crew = %action.crew_id, %action_type, "action fizzled");
                continue;
            }
            let member = actor::acting_member(&ctx.player, &action.crew_id)?;
            dispatch(&mut ctx, action, &member)?;
            resolved += 1;
        }
        let ActionContext { player, effects: queued, .. } = ctx;
        effects.extend(queued);
        next.players.insert(pid.clone(), player);
    }

    if resolved > 0 {
        debug!(%action_type, resolved, effects = effects.len(), "resolved action batch");
    }
    commit(next, effects, catalog)
}

fn dispatch(ctx: &mut ActionContext<'_>, action: &PlayerAction, member: &CrewMember) -> Result<()> {
    match &action.kind {
        ActionKind::Restore { transfers } => engineering::resolve_restore(ctx, action, member, transfers),
        ActionKind::Route { transfers } => engineering::resolve_route(ctx, member, transfers),
        ActionKind::Revive { target } => medical::resolve_revive(ctx, action, member, target),
        ActionKind::Repair { section, target } => engineering::resolve_repair(ctx, action, member, *section, *target),
        ActionKind::Maneuver { direction, power } => {
            navigation::resolve_maneuver(ctx, action, member, *direction, *power)
        }
        ActionKind::Scan { target } => sensors::resolve_scan(ctx, action, member, target),
        ActionKind::Acquire { target } => sensors::resolve_acquire(ctx, action, member, target),
        ActionKind::Attack { target } => combat::resolve_attack(ctx, action, member, target),
        ActionKind::Launch { item, target } => combat::resolve_launch(ctx, action, member, *item, target),
        ActionKind::Retaliate { target } => combat::resolve_retaliate(ctx, action, member, target),
        ActionKind::Assemble { item } => fabrication::resolve_assemble(ctx, action, member, *item),
        ActionKind::Integrate { upgrade } => fabrication::resolve_integrate(ctx, member, *upgrade),
    }
}

/// Applies queued effects in order. Objects claimed by more than one player
/// stay where they are.
fn commit(state: &mut GameState, effects: Vec<SharedEffect>, catalog: &Catalog) -> Result<()> {
    let mut claims: BTreeMap<ObjectId, Vec<PlayerId>> = BTreeMap::new();
    for effect in &effects {
        if let SharedEffect::Acquire { player, object } = effect {
            let claimants = claims.entry(object.clone()).or_default();
            if !claimants.contains(player) {
                claimants.push(player.clone());
            }
        }
    }

    for effect in effects {
        match effect {
            SharedEffect::DamagePlayer { attacker, target, amount, torpedo } => {
                commit_player_damage(state, attacker, &target, amount, torpedo);
            }
            SharedEffect::DamageObject { attacker, object, amount } => {
                let Some(obj) = state.board.object_mut(&object) else {
                    continue;
                };
                let outcome = damage_object(obj, amount);
                debug!(object = %object, amount, ?outcome, "object hit");
                if matches!(outcome, ObjectDamage::Destroyed { hostile: true }) {
                    if let Some(p) = state.player_mut(&attacker) {
                        p.stats.hostiles_destroyed += 1;
                    }
                }
            }
            SharedEffect::RevealLoot { object, loot } => {
                if let Some(obj) = state.board.object_mut(&object) {
                    obj.loot.get_or_insert(loot);
                }
            }
            SharedEffect::Acquire { player, object } => {
                if claims.get(&object).is_some_and(|c| c.len() > 1) {
                    debug!(object = %object, %player, "contested claim fizzled");
                    continue;
                }
                commit_acquire(state, &player, &object, catalog)?;
            }
        }
    }
    Ok(())
}

/// Damage to a player's ship. A ready Decoys evades a torpedo.
pub(crate) fn commit_player_damage(state: &mut GameState, attacker: Attacker, target: &PlayerId, amount: u32, torpedo: bool) {
    let turn = state.current_turn;
    let Some(victim) = state.player_mut(target) else {
        return;
    };
    if !victim.is_active() {
        return;
    }
    victim.record_attacker(attacker);
    if torpedo && victim.upgrade_ready(UpgradeKind::Decoys, turn) {
        victim.mark_upgrade_used(UpgradeKind::Decoys, turn);
        debug!(player = %target, "decoys evaded a torpedo");
        return;
    }
    let dealt = damage_ship(victim, amount);
    debug!(player = %target, amount, shields = dealt.shield_loss, hull = dealt.hull, "ship hit");
}

fn commit_acquire(state: &mut GameState, player: &PlayerId, object: &ObjectId, catalog: &Catalog) -> Result<()> {
    let Some(obj) = state.board.object(object) else {
        return Ok(());
    };
    let salvage = matches!(
        obj.kind,
        ObjectKind::Debris | ObjectKind::AsteroidCluster { .. } | ObjectKind::WreckedShip
    );
    let station = matches!(obj.kind, ObjectKind::FunctionalStation { .. });
    let loot = match obj.loot {
        Some(loot) => loot,
        None => {
            let mut rng = KeyedRng::new(&entity_key("loot", &state.id, state.current_turn, object.as_str()));
            roll_loot(&obj.kind, &mut rng)
        }
    };

    if salvage {
        state.board.remove_object(object);
        grant_loot(state, player, loot)?;
    } else if station {
        let drawn = if state.upgrade_deck.is_empty() { None } else { Some(state.upgrade_deck.remove(0)) };
        if let Some(ObjectKind::FunctionalStation { visited_by }) = state.board.object_mut(object).map(|o| &mut o.kind) {
            visited_by.push(player.clone());
        }
        grant_loot(state, player, loot)?;
        if let Some(card_id) = drawn {
            let card = catalog
                .upgrade(&card_id)
                .ok_or_else(|| EngineError::invariant(format!("upgrade deck holds unknown card '{}'", card_id)))?;
            let kind = card.kind;
            if let Some(p) = state.player_mut(player) {
                p.pending_upgrades.push(kind);
            }
            debug!(%player, card = %card_id, "drew upgrade at station");
        }
    } else {
        return Ok(());
    }
    debug!(%player, object = %object, "acquired");
    Ok(())
}

/// Adds acquired loot. Merchant captains take one more of whatever the loot
/// holds most of.
fn grant_loot(state: &mut GameState, player: &PlayerId, loot: Resources) -> Result<()> {
    let p = state
        .player_mut(player)
        .ok_or_else(|| EngineError::invariant(format!("acquiring player '{}' is not in the game", player)))?;
    p.resources.add(&loot);
    if p.captain_type() == crate::board::CaptainType::Merchant {
        if let Some(kind) = loot.largest() {
            *p.resources.get_mut(kind) += 1;
        }
    }
    p.stats.objects_acquired += 1;
    Ok(())
}
