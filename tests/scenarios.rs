//! End-to-end rule scenarios.
//!
//! Each test builds a game through the public setup API, drives one phase or
//! turn, and checks the resulting state.

use escape_velocity::board::{
    ActionKind, CaptainType, CrewId, CrewStatus, GameSettings, GameState, GameStatus, LaunchItem, OfficerRole,
    PlayerAction, PlayerId, PlayerStatus, PowerTransfer, ShipSection, Target, TurnPhase, UpgradeKind, ALL_SECTIONS,
};
use escape_velocity::catalog::Catalog;
use escape_velocity::error::{ActionError, EngineError};
use escape_velocity::power;
use escape_velocity::resolve::{apply_game_state_transitions, apply_player_actions, process_turn, ActionBatch};
use escape_velocity::rng::{entity_key, roll_keyed};
use escape_velocity::setup::{self, PlayerInput, STANDARD_RING_SPEEDS};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn p1() -> PlayerId {
    PlayerId::from("p1")
}

fn p2() -> PlayerId {
    PlayerId::from("p2")
}

/// Two players, p1 with a Doctor aboard, started and ready for actions.
fn game_with(id: &str, captain: CaptainType) -> GameState {
    let catalog = Catalog::standard();
    let game = setup::create_new_game(id, 1_000, GameSettings::default(), &STANDARD_RING_SPEEDS, &catalog).unwrap();
    let game = setup::add_player_to_game(&game, PlayerInput::new("p1", captain, &[OfficerRole::Doctor])).unwrap();
    let game = setup::add_player_to_game(&game, PlayerInput::new("p2", CaptainType::Survivor, &[])).unwrap();
    let mut game = setup::start_game(&game, 1_001).unwrap();
    game.turn_phase = TurnPhase::ActionExecution;
    game
}

fn game_with_id(id: &str) -> GameState {
    game_with(id, CaptainType::Explorer)
}

fn game() -> GameState {
    game_with_id("scenario")
}

/// A batch where p1 submits `actions` and everyone else passes.
fn p1_batch(state: &GameState, actions: Vec<PlayerAction>) -> ActionBatch {
    let mut batch: ActionBatch = state.active_player_ids().into_iter().map(|id| (id, Vec::new())).collect();
    batch.insert(p1(), actions);
    batch
}

fn crew(n: usize) -> CrewId {
    CrewId(format!("p1-crew-{}", n))
}

// Crew numbering: 1 pilot, 2 engineer, 3 medic, 4 scientist, 5 tactician,
// then officers in roster order.
const PILOT: usize = 1;
const ENGINEER: usize = 2;
const TACTICIAN: usize = 5;
const DOCTOR: usize = 6;

fn engineer_restore() -> PlayerAction {
    PlayerAction::new(&p1(), &crew(ENGINEER), ActionKind::Restore { transfers: Vec::new() })
}

// ---------------------------------------------------------------------------
// Power
// ---------------------------------------------------------------------------

#[test]
fn restore_from_bridge_moves_one_power() {
    let mut g = game();
    let ship = &mut g.player_mut(&p1()).unwrap().ship;
    let stored = ship.power(ShipSection::Engineering);
    power::spend(ship, ShipSection::Engineering, stored).unwrap();
    assert_eq!(ship.power(ShipSection::Bridge), 6);

    let action = PlayerAction::new(
        &p1(),
        &crew(PILOT),
        ActionKind::Restore { transfers: vec![PowerTransfer::between(ShipSection::Bridge, ShipSection::Engineering, 1)] },
    );
    let next = apply_player_actions(&g, &p1_batch(&g, vec![action]), &Catalog::standard()).unwrap();
    let ship = &next.player(&p1()).unwrap().ship;
    assert_eq!(ship.power(ShipSection::Bridge), 5);
    assert_eq!(ship.power(ShipSection::Engineering), 1);
    assert_eq!(next.turn_phase, TurnPhase::Environment);
}

#[test]
fn overloaded_single_conduit_burns_out() {
    let g = game();
    assert_eq!(g.player(&p1()).unwrap().ship.conduits(ShipSection::Bridge, ShipSection::SciLab), 1);
    let action = PlayerAction::new(
        &p1(),
        &crew(ENGINEER),
        ActionKind::Route { transfers: vec![PowerTransfer::between(ShipSection::Bridge, ShipSection::SciLab, 4)] },
    );
    let next = apply_player_actions(&g, &p1_batch(&g, vec![action]), &Catalog::standard()).unwrap();
    let ship = &next.player(&p1()).unwrap().ship;
    assert_eq!(ship.conduits(ShipSection::Bridge, ShipSection::SciLab), 0);
    assert_eq!(ship.conduits(ShipSection::SciLab, ShipSection::Bridge), 0);
    // The power still arrives.
    assert_eq!(ship.power(ShipSection::SciLab), 8);
}

#[test]
fn splitting_a_route_does_not_dodge_the_overload() {
    let g = game();
    let half = || PowerTransfer::between(ShipSection::Bridge, ShipSection::SciLab, 2);
    let restore = PlayerAction::new(&p1(), &crew(PILOT), ActionKind::Restore { transfers: vec![half()] });
    let route = PlayerAction::new(&p1(), &crew(ENGINEER), ActionKind::Route { transfers: vec![half()] });
    let next = apply_player_actions(&g, &p1_batch(&g, vec![restore, route]), &Catalog::standard()).unwrap();
    assert_eq!(next.player(&p1()).unwrap().ship.conduits(ShipSection::Bridge, ShipSection::SciLab), 0);
}

#[test]
fn power_coils_spare_one_overload_per_turn() {
    // Two single-conduit edges, each pushed past their three-power limit.
    let route = || {
        PlayerAction::new(
            &p1(),
            &crew(ENGINEER),
            ActionKind::Route {
                transfers: vec![
                    PowerTransfer::between(ShipSection::Defense, ShipSection::Bridge, 4),
                    PowerTransfer::between(ShipSection::Bridge, ShipSection::SciLab, 4),
                ],
            },
        )
    };
    let edges = |g: &GameState| {
        let ship = &g.player(&p1()).unwrap().ship;
        (ship.conduits(ShipSection::Bridge, ShipSection::Defense), ship.conduits(ShipSection::Bridge, ShipSection::SciLab))
    };
    let catalog = Catalog::standard();

    let plain = game();
    let next = apply_player_actions(&plain, &p1_batch(&plain, vec![route()]), &catalog).unwrap();
    assert_eq!(edges(&next), (0, 0));

    let mut coiled = game();
    coiled.player_mut(&p1()).unwrap().installed_upgrades.push(UpgradeKind::PowerCoils);
    let next = apply_player_actions(&coiled, &p1_batch(&coiled, vec![route()]), &catalog).unwrap();
    let (defense, scilab) = edges(&next);
    assert_eq!(defense + scilab, 1, "exactly one overloaded edge is spared");
    let p = next.player(&p1()).unwrap();
    assert_eq!(p.upgrade_cooldowns.get(&UpgradeKind::PowerCoils), Some(&coiled.current_turn));
    assert!(!p.upgrade_ready(UpgradeKind::PowerCoils, coiled.current_turn));
}

// ---------------------------------------------------------------------------
// Bonuses and boosts
// ---------------------------------------------------------------------------

#[test]
fn technologist_adds_one_to_basic_crew_restore() {
    let catalog = Catalog::standard();
    let engineering = |captain| {
        let g = game_with("technologist", captain);
        let next = apply_player_actions(&g, &p1_batch(&g, vec![engineer_restore()]), &catalog).unwrap();
        next.player(&p1()).unwrap().ship.power(ShipSection::Engineering)
    };
    // Eight stored; base three, engineer one, technologist one.
    assert_eq!(engineering(CaptainType::Explorer), 8 + 4);
    assert_eq!(engineering(CaptainType::Technologist), 8 + 5);
}

#[test]
fn stim_doubles_and_uses_one_pack() {
    let mut g = game();
    g.player_mut(&p1()).unwrap().member_mut(&crew(DOCTOR)).unwrap().location = Some(ShipSection::Engineering);
    let next = apply_player_actions(&g, &p1_batch(&g, vec![engineer_restore().with_stim()]), &Catalog::standard())
        .unwrap();
    let p = next.player(&p1()).unwrap();
    assert_eq!(p.ship.power(ShipSection::Engineering), 8 + 2 * 4);
    let before = g.player(&p1()).unwrap().member(&crew(DOCTOR)).unwrap().stim_packs;
    assert_eq!(p.member(&crew(DOCTOR)).unwrap().stim_packs, before - 1);
}

#[test]
fn stim_needs_a_doctor_in_the_section() {
    let g = game();
    let err = apply_player_actions(&g, &p1_batch(&g, vec![engineer_restore().with_stim()]), &Catalog::standard())
        .unwrap_err();
    assert!(matches!(err, EngineError::Action(ActionError::NoStimAvailable(ShipSection::Engineering))));
}

#[test]
fn cybernetics_allow_one_second_action() {
    let catalog = Catalog::standard();
    let err = apply_player_actions(&game(), &p1_batch(&game(), vec![engineer_restore(), engineer_restore()]), &catalog)
        .unwrap_err();
    assert!(matches!(err, EngineError::Action(ActionError::TooManyActions { .. })));

    let mut g = game();
    g.player_mut(&p1()).unwrap().installed_upgrades.push(UpgradeKind::Cybernetics);
    let next = apply_player_actions(&g, &p1_batch(&g, vec![engineer_restore(), engineer_restore()]), &catalog).unwrap();
    assert_eq!(next.player(&p1()).unwrap().ship.power(ShipSection::Engineering), 8 + 4 + 4);

    let three = vec![engineer_restore(), engineer_restore(), engineer_restore()];
    let err = apply_player_actions(&g, &p1_batch(&g, three), &catalog).unwrap_err();
    assert!(matches!(err, EngineError::Action(ActionError::TooManyActions { .. })));
}

#[test]
fn cybernetics_need_a_powered_med_lab() {
    let mut g = game();
    let p = g.player_mut(&p1()).unwrap();
    p.installed_upgrades.push(UpgradeKind::Cybernetics);
    let stored = p.ship.power(ShipSection::MedLab);
    power::spend(&mut p.ship, ShipSection::MedLab, stored).unwrap();
    let err = apply_player_actions(&g, &p1_batch(&g, vec![engineer_restore(), engineer_restore()]), &Catalog::standard())
        .unwrap_err();
    assert!(matches!(err, EngineError::Action(ActionError::TooManyActions { .. })));
}

// ---------------------------------------------------------------------------
// Combat
// ---------------------------------------------------------------------------

/// p1's pilot fires a torpedo at p2 sharing its space; returns p2's hull loss.
fn torpedo_hull_loss(mut g: GameState) -> u32 {
    let at = g.player(&p1()).unwrap().ship.position;
    g.player_mut(&p1()).unwrap().inventory.torpedoes = 1;
    g.player_mut(&p2()).unwrap().ship.position = at;
    let before = g.player(&p2()).unwrap().ship.total_hull();
    let launch = PlayerAction::new(
        &p1(),
        &crew(PILOT),
        ActionKind::Launch { item: LaunchItem::Torpedo, target: Target::Player(p2()) },
    );
    let next = apply_player_actions(&g, &p1_batch(&g, vec![launch]), &Catalog::standard()).unwrap();
    let p2 = next.player(&p2()).unwrap();
    assert_eq!(p2.ship.shields, 0);
    before - p2.ship.total_hull()
}

#[test]
fn tactician_in_defense_stops_an_extra_point() {
    // Eight damage: four shields, one from the tactician.
    assert_eq!(torpedo_hull_loss(game()), 3);

    let mut g = game();
    let tactician = CrewId(format!("p2-crew-{}", TACTICIAN));
    g.player_mut(&p2()).unwrap().member_mut(&tactician).unwrap().knock_out();
    assert_eq!(torpedo_hull_loss(g), 4);
}

// ---------------------------------------------------------------------------
// Medical
// ---------------------------------------------------------------------------

/// First game id whose Doctor rolls a six on both of the first two turns.
fn double_six_game() -> GameState {
    let doctor = crew(DOCTOR);
    let id = (0..10_000)
        .map(|n| format!("revive-{}", n))
        .find(|id| {
            (1..=2).all(|turn| roll_keyed(&entity_key("revive", id, turn, doctor.as_str()), 6) == 6)
        })
        .expect("no double six in range");
    game_with_id(&id)
}

#[test]
fn doctor_revives_over_two_turns() {
    let mut g = double_six_game();
    let patient = crew(PILOT);
    g.player_mut(&p1()).unwrap().member_mut(&patient).unwrap().knock_out();
    let revive = || PlayerAction::new(&p1(), &crew(DOCTOR), ActionKind::Revive { target: patient.clone() });
    let catalog = Catalog::standard();

    // 6 rolled, +2 doctor, +2 fully powered med lab.
    let next = apply_player_actions(&g, &p1_batch(&g, vec![revive()]), &catalog).unwrap();
    let member = next.player(&p1()).unwrap().member(&patient).unwrap();
    assert_eq!(member.revive_progress, 10);
    assert_eq!(member.status, CrewStatus::Unconscious);

    let mut later = next.clone();
    later.current_turn += 1;
    later.turn_phase = TurnPhase::ActionExecution;
    let next = apply_player_actions(&later, &p1_batch(&later, vec![revive()]), &catalog).unwrap();
    let member = next.player(&p1()).unwrap().member(&patient).unwrap();
    assert_eq!(member.status, CrewStatus::Active);
    assert_eq!(member.revive_progress, 0);
    assert_eq!(member.location, Some(ShipSection::MedLab));
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

#[test]
fn failed_batch_changes_nothing() {
    let g = game();
    let before = g.clone();
    let good = PlayerAction::new(
        &p1(),
        &crew(PILOT),
        ActionKind::Restore { transfers: vec![PowerTransfer::between(ShipSection::Bridge, ShipSection::Engineering, 1)] },
    );
    // The pilot is awake; the restore above must not survive this.
    let bad = PlayerAction::new(&p1(), &crew(DOCTOR), ActionKind::Revive { target: crew(PILOT) });
    let err = apply_player_actions(&g, &p1_batch(&g, vec![good, bad]), &Catalog::standard()).unwrap_err();
    assert!(matches!(err, EngineError::Action(ActionError::NotUnconscious(_))));
    assert_eq!(g, before);
}

#[test]
fn acting_for_another_player_is_rejected() {
    let g = game();
    let theirs = PlayerAction::new(&p2(), &CrewId::from("p2-crew-1"), ActionKind::Restore { transfers: Vec::new() });
    let err = apply_player_actions(&g, &p1_batch(&g, vec![theirs]), &Catalog::standard()).unwrap_err();
    assert!(matches!(err, EngineError::Action(ActionError::PlayerMismatch { .. })));
}

// ---------------------------------------------------------------------------
// Game end
// ---------------------------------------------------------------------------

fn resolution(mut g: GameState) -> GameState {
    g.turn_phase = TurnPhase::Resolution;
    g
}

#[test]
fn escape_completes_the_game() {
    let mut g = resolution(game());
    g.player_mut(&p1()).unwrap().status = PlayerStatus::Escaped;
    g.player_mut(&p2()).unwrap().status = PlayerStatus::Wrecked;
    let next = apply_game_state_transitions(&g, &Catalog::standard()).unwrap();
    assert_eq!(next.status, GameStatus::Completed);
    assert!(next.player(&p1()).unwrap().score >= 20);
}

#[test]
fn all_wrecked_abandons_the_game() {
    let mut g = resolution(game());
    for p in g.players.values_mut() {
        for s in ALL_SECTIONS {
            p.ship.set_hull(s, 0);
        }
    }
    let next = apply_game_state_transitions(&g, &Catalog::standard()).unwrap();
    assert_eq!(next.status, GameStatus::Abandoned);
    assert!(next.players.values().all(|p| p.status == PlayerStatus::Wrecked));
}

#[test]
fn game_continues_while_anyone_flies() {
    let mut g = resolution(game());
    g.player_mut(&p1()).unwrap().status = PlayerStatus::Escaped;
    let next = apply_game_state_transitions(&g, &Catalog::standard()).unwrap();
    assert_eq!(next.status, GameStatus::InProgress);
}

// ---------------------------------------------------------------------------
// Determinism
// ---------------------------------------------------------------------------

#[test]
fn same_id_and_timestamp_replay_identically() {
    let mut a = game_with_id("replay");
    let mut b = game_with_id("replay");
    assert_eq!(a.event_deck, b.event_deck);
    assert_eq!(a.upgrade_deck, b.upgrade_deck);

    a.turn_phase = TurnPhase::Event;
    b.turn_phase = TurnPhase::Event;
    let catalog = Catalog::standard();
    for _ in 0..3 {
        let batch: ActionBatch = a.active_player_ids().into_iter().map(|id| (id, Vec::new())).collect();
        a = process_turn(&a, &batch, &catalog).unwrap();
        b = process_turn(&b, &batch, &catalog).unwrap();
        assert_eq!(a, b);
    }
}
