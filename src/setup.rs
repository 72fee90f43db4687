//! Game lifecycle: creating a game, seating players, and starting play.

use std::collections::BTreeMap;

use tracing::info;

use crate::board::{
    Board, CaptainType, CrewId, CrewKind, CrewMember, GameSettings, GameState, GameStatus, Inventory, OfficerRole,
    OrbitRing, PlayerId, PlayerState, PlayerStats, PlayerStatus, Position, Resources, Ship, TurnPhase,
    ALL_BASIC_ROLES,
};
use crate::catalog::Catalog;
use crate::error::{Result, SetupError};

/// Speed requirements for the default six-ring layout, outermost first.
pub const STANDARD_RING_SPEEDS: [u32; 6] = [6, 5, 4, 3, 2, 1];

/// Officers a player may bring aboard.
pub const MAX_OFFICERS: usize = 2;

/// A player's choices when joining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerInput {
    pub id: PlayerId,
    pub name: String,
    pub captain: CaptainType,
    pub officers: Vec<OfficerRole>,
}

impl PlayerInput {
    pub fn new(id: &str, captain: CaptainType, officers: &[OfficerRole]) -> Self {
        PlayerInput { id: PlayerId::from(id), name: id.to_string(), captain, officers: officers.to_vec() }
    }
}

/// Creates a game in `Setup` with shuffled decks and an empty board.
pub fn create_new_game(
    id: &str,
    created_at: u64,
    settings: GameSettings,
    ring_speeds: &[u32],
    catalog: &Catalog,
) -> Result<GameState> {
    if settings.ring_layout.is_empty() {
        return Err(SetupError::InvalidRingLayout("at least one ring is required".into()).into());
    }
    if let Some(i) = settings.ring_layout.iter().position(|r| r.num_spaces == 0) {
        return Err(SetupError::InvalidRingLayout(format!("ring {} has no spaces", i)).into());
    }
    if ring_speeds.len() != settings.ring_layout.len() {
        return Err(SetupError::RingSpeedMismatch { expected: settings.ring_layout.len(), actual: ring_speeds.len() }.into());
    }

    let rings = settings
        .ring_layout
        .iter()
        .zip(ring_speeds)
        .enumerate()
        .map(|(index, (layout, &speed))| OrbitRing {
            index,
            rotation_offset: 0,
            num_spaces: layout.num_spaces,
            speed_requirement: speed,
            color: layout.color,
        })
        .collect();

    let state = GameState {
        id: id.to_string(),
        status: GameStatus::Setup,
        current_turn: 0,
        turn_phase: TurnPhase::Event,
        board: Board { rings, objects: Vec::new() },
        players: BTreeMap::new(),
        player_order: Vec::new(),
        event_deck: catalog.build_event_deck(&settings.expansions, id, created_at),
        upgrade_deck: catalog.build_upgrade_deck(&settings.expansions, id, created_at),
        created_at,
        started_at: None,
        settings,
        last_resolved_event: None,
        event_runtime: None,
        next_object_seq: 0,
    };
    info!(game = id, rings = state.board.rings.len(), events = state.event_deck.len(), "game created");
    Ok(state)
}

/// Builds a fresh player: all five basic crew, the chosen officers, and the
/// captain, with crew ids numbered in that order.
pub(crate) fn build_player(input: &PlayerInput, settings: &GameSettings) -> PlayerState {
    let kinds = ALL_BASIC_ROLES
        .iter()
        .map(|&r| CrewKind::Basic(r))
        .chain(input.officers.iter().map(|&o| CrewKind::Officer(o)));
    let crew = kinds
        .enumerate()
        .map(|(n, kind)| CrewMember::new(CrewId(format!("{}-crew-{}", input.id, n + 1)), kind))
        .collect();
    let captain = CrewMember::new(CrewId(format!("{}-captain", input.id)), CrewKind::Captain(input.captain));

    PlayerState {
        id: input.id.clone(),
        name: input.name.clone(),
        status: PlayerStatus::Active,
        ship: Ship::new(Position::new(0, 0), settings.starting_shields, settings.starting_life_support),
        crew,
        captain,
        resources: Resources::default(),
        inventory: Inventory::default(),
        installed_upgrades: Vec::new(),
        pending_upgrades: Vec::new(),
        upgrade_cooldowns: BTreeMap::new(),
        scan_cache: BTreeMap::new(),
        probe_cache: BTreeMap::new(),
        attacked_by: Vec::new(),
        stats: PlayerStats::default(),
        score: 0,
    }
}

/// Seats a player. Only allowed during setup.
pub fn add_player_to_game(state: &GameState, input: PlayerInput) -> Result<GameState> {
    if state.status != GameStatus::Setup {
        return Err(SetupError::WrongStatus { status: state.status }.into());
    }
    if state.players.contains_key(&input.id) {
        return Err(SetupError::DuplicatePlayer(input.id).into());
    }
    if state.players.len() >= state.settings.max_players {
        return Err(SetupError::GameFull { max: state.settings.max_players }.into());
    }
    if input.officers.len() > MAX_OFFICERS {
        return Err(SetupError::InvalidRoster {
            player: input.id,
            reason: format!("at most {} officers may be chosen", MAX_OFFICERS),
        }
        .into());
    }
    if input.officers.iter().enumerate().any(|(i, o)| input.officers[..i].contains(o)) {
        return Err(SetupError::InvalidRoster { player: input.id, reason: "officers must be distinct".into() }.into());
    }

    let mut next = state.clone();
    let player = build_player(&input, &next.settings);
    info!(game = %next.id, player = %player.id, captain = ?input.captain, "player joined");
    next.player_order.push(player.id.clone());
    next.players.insert(player.id.clone(), player);
    Ok(next)
}

/// Starts the game: ships are spread evenly around the outer ring in join
/// order and turn 1 begins in the event phase.
pub fn start_game(state: &GameState, started_at: u64) -> Result<GameState> {
    if state.status != GameStatus::Setup {
        return Err(SetupError::WrongStatus { status: state.status }.into());
    }
    let count = state.player_order.len();
    if count == 0 {
        return Err(SetupError::NoPlayers.into());
    }
    let spaces = state.board.rings.first().map_or(0, |r| r.num_spaces);
    if spaces % count as u32 != 0 {
        return Err(SetupError::IndivisibleOuterRing { spaces, players: count }.into());
    }

    let mut next = state.clone();
    let step = spaces / count as u32;
    for (i, id) in state.player_order.iter().enumerate() {
        if let Some(p) = next.players.get_mut(id) {
            p.ship.position = Position::new(0, i as u32 * step);
        }
    }
    next.status = GameStatus::InProgress;
    next.current_turn = 1;
    next.turn_phase = TurnPhase::Event;
    next.started_at = Some(started_at);
    info!(game = %next.id, players = count, "game started");
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::RingLayout;
    use crate::error::EngineError;

    fn new_game() -> GameState {
        create_new_game("g1", 1_000, GameSettings::default(), &STANDARD_RING_SPEEDS, &Catalog::standard()).unwrap()
    }

    #[test]
    fn new_game_is_in_setup() {
        let g = new_game();
        assert_eq!(g.status, GameStatus::Setup);
        assert_eq!(g.current_turn, 0);
        assert_eq!(g.board.rings.len(), 6);
        assert_eq!(g.board.rings[0].speed_requirement, 6);
        assert!(!g.event_deck.is_empty());
        assert!(!g.upgrade_deck.is_empty());
    }

    #[test]
    fn ring_speed_count_must_match() {
        let err = create_new_game("g", 0, GameSettings::default(), &[1, 2], &Catalog::standard()).unwrap_err();
        assert!(matches!(err, EngineError::Setup(SetupError::RingSpeedMismatch { expected: 6, actual: 2 })));
    }

    #[test]
    fn crew_ids_follow_join_roster() {
        let g = new_game();
        let g = add_player_to_game(&g, PlayerInput::new("p1", CaptainType::Explorer, &[OfficerRole::Doctor])).unwrap();
        let p = g.player(&PlayerId::from("p1")).unwrap();
        assert_eq!(p.crew.len(), 6);
        assert_eq!(p.crew[0].id, CrewId::from("p1-crew-1"));
        assert_eq!(p.crew[5].kind, CrewKind::Officer(OfficerRole::Doctor));
        assert_eq!(p.captain.id, CrewId::from("p1-captain"));
        assert_eq!(p.ship.shields, 4);
    }

    #[test]
    fn roster_rules() {
        let g = new_game();
        let dup = PlayerInput::new("p1", CaptainType::Veteran, &[OfficerRole::Doctor, OfficerRole::Doctor]);
        assert!(add_player_to_game(&g, dup).is_err());
        let many = PlayerInput::new(
            "p1",
            CaptainType::Veteran,
            &[OfficerRole::Doctor, OfficerRole::AcePilot, OfficerRole::FirstOfficer],
        );
        assert!(add_player_to_game(&g, many).is_err());
        let g = add_player_to_game(&g, PlayerInput::new("p1", CaptainType::Veteran, &[])).unwrap();
        let err = add_player_to_game(&g, PlayerInput::new("p1", CaptainType::Veteran, &[])).unwrap_err();
        assert!(matches!(err, EngineError::Setup(SetupError::DuplicatePlayer(_))));
    }

    #[test]
    fn start_spreads_ships() {
        let mut g = new_game();
        for id in ["a", "b", "c"] {
            g = add_player_to_game(&g, PlayerInput::new(id, CaptainType::Survivor, &[])).unwrap();
        }
        let g = start_game(&g, 5).unwrap();
        assert_eq!(g.status, GameStatus::InProgress);
        assert_eq!(g.current_turn, 1);
        let spaces: Vec<u32> = g.player_order.iter().map(|id| g.players[id].ship.position.space).collect();
        assert_eq!(spaces, vec![0, 8, 16]);
        assert!(add_player_to_game(&g, PlayerInput::new("d", CaptainType::Survivor, &[])).is_err());
    }

    #[test]
    fn start_needs_divisible_outer_ring() {
        let mut settings = GameSettings::default();
        settings.ring_layout[0] = RingLayout { num_spaces: 25, ..settings.ring_layout[0] };
        let g = create_new_game("g", 0, settings, &STANDARD_RING_SPEEDS, &Catalog::standard()).unwrap();
        let g = add_player_to_game(&g, PlayerInput::new("a", CaptainType::Veteran, &[])).unwrap();
        let g = add_player_to_game(&g, PlayerInput::new("b", CaptainType::Veteran, &[])).unwrap();
        let err = start_game(&g, 0).unwrap_err();
        assert!(matches!(err, EngineError::Setup(SetupError::IndivisibleOuterRing { spaces: 25, players: 2 })));
        assert!(matches!(start_game(&new_game(), 0), Err(EngineError::Setup(SetupError::NoPlayers))));
    }
}
