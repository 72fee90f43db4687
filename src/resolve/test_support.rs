//! Fixtures shared by the resolver tests.

use crate::board::{CaptainType, GameSettings, GameState, ObjectKind, OfficerRole, PlayerState, Position, SpaceObject, TurnPhase};
use crate::catalog::Catalog;
use crate::setup::{self, PlayerInput, STANDARD_RING_SPEEDS};

/// A Veteran captain with a Doctor and a Chief Engineer.
fn veteran(id: &str) -> PlayerInput {
    PlayerInput::new(id, CaptainType::Veteran, &[OfficerRole::Doctor, OfficerRole::ChiefEngineer])
}

pub(crate) fn sample_player(id: &str) -> PlayerState {
    setup::build_player(&veteran(id), &GameSettings::default())
}

/// Two Veteran players on the default board, started and waiting for actions.
/// Their ships sit at (0, 0) and (0, 12).
pub(crate) fn sample_game() -> GameState {
    let catalog = Catalog::standard();
    let game = setup::create_new_game("test-game", 1, GameSettings::default(), &STANDARD_RING_SPEEDS, &catalog).unwrap();
    let game = setup::add_player_to_game(&game, veteran("p1")).unwrap();
    let game = setup::add_player_to_game(&game, veteran("p2")).unwrap();
    let mut game = setup::start_game(&game, 2).unwrap();
    game.turn_phase = TurnPhase::ActionExecution;
    game
}

pub(crate) fn place_object(game: &mut GameState, kind: ObjectKind, position: Position) -> crate::board::ObjectId {
    let id = game.allocate_object_id();
    game.board.objects.push(SpaceObject { id: id.clone(), position, kind, loot: None });
    id
}
