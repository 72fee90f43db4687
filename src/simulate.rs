//! Batch simulation of bot games.
//!
//! Plays complete games with every seat driven by `bot::bot_actions`, one game
//! per worker on a rayon pool, and reports a `GameSummary` for each.

use std::io::Write;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::board::{CaptainType, GameSettings, GameState, GameStatus, OfficerRole, PlayerId, PlayerStatus};
use crate::bot::bot_actions;
use crate::catalog::Catalog;
use crate::error::{EngineError, Result};
use crate::resolve::{process_turn_with, ActionBatch};
use crate::setup::{self, PlayerInput, MAX_OFFICERS, STANDARD_RING_SPEEDS};

const CAPTAINS: [CaptainType; 6] = [
    CaptainType::Veteran,
    CaptainType::Explorer,
    CaptainType::Merchant,
    CaptainType::Imperialist,
    CaptainType::Technologist,
    CaptainType::Survivor,
];

const OFFICERS: [OfficerRole; 6] = [
    OfficerRole::AcePilot,
    OfficerRole::ChiefEngineer,
    OfficerRole::Doctor,
    OfficerRole::SeniorScientist,
    OfficerRole::MasterTactician,
    OfficerRole::FirstOfficer,
];

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Seats per game; must divide the outer ring.
    pub players: usize,
    /// Turn limit passed to each game's settings.
    pub max_turns: u32,
    /// Worker threads. One plays the games in order on the calling thread.
    pub threads: usize,
    /// Seed for rosters and game keys (0 = use entropy).
    pub seed: u64,
    /// Suppress per-game progress logs.
    pub quiet: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            num_games: 10,
            players: 4,
            max_turns: GameSettings::default().max_turns,
            threads: 4,
            seed: 0,
            quiet: false,
        }
    }
}

/// One seat's result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSummary {
    pub player: PlayerId,
    pub captain: CaptainType,
    pub status: PlayerStatus,
    pub score: u32,
}

/// The outcome of one simulated game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub index: usize,
    pub game_id: String,
    pub created_at: u64,
    pub status: GameStatus,
    pub turns: u32,
    pub seats: Vec<SeatSummary>,
}

impl GameSummary {
    fn from_state(index: usize, state: &GameState) -> Self {
        let seats = state
            .player_order
            .iter()
            .filter_map(|id| state.player(id))
            .map(|p| SeatSummary {
                player: p.id.clone(),
                captain: p.captain_type(),
                status: p.status,
                score: p.score,
            })
            .collect();
        GameSummary {
            index,
            game_id: state.id.clone(),
            created_at: state.created_at,
            status: state.status,
            turns: state.current_turn,
            seats,
        }
    }
}

fn rng_for(config: &SimulationConfig, index: usize) -> SmallRng {
    if config.seed != 0 {
        SmallRng::seed_from_u64(config.seed.wrapping_add(index as u64))
    } else {
        SmallRng::from_entropy()
    }
}

fn random_roster(id: &str, rng: &mut SmallRng) -> PlayerInput {
    let captain = CAPTAINS.choose(rng).copied().unwrap_or(CaptainType::Veteran);
    let officers: Vec<OfficerRole> = OFFICERS.choose_multiple(rng, MAX_OFFICERS).copied().collect();
    PlayerInput::new(id, captain, &officers)
}

/// Sets up a game with random rosters.
pub fn new_game(config: &SimulationConfig, index: usize, rng: &mut SmallRng, catalog: &Catalog) -> Result<GameState> {
    let settings = GameSettings { max_turns: config.max_turns, ..GameSettings::default() };
    let created_at = rng.gen_range(1..u64::from(u32::MAX));
    let id = format!("sim-{}", index);
    let mut state = setup::create_new_game(&id, created_at, settings, &STANDARD_RING_SPEEDS, catalog)?;
    for seat in 0..config.players {
        let roster = random_roster(&format!("bot{}", seat + 1), rng);
        state = setup::add_player_to_game(&state, roster)?;
    }
    setup::start_game(&state, created_at + 1)
}

fn bot_batch(state: &GameState) -> ActionBatch {
    state
        .active_player_ids()
        .into_iter()
        .map(|id| {
            let actions = bot_actions(state, &id);
            (id, actions)
        })
        .collect()
}

/// Plays one game to the end.
pub fn play_game(config: &SimulationConfig, index: usize, rng: &mut SmallRng, catalog: &Catalog) -> Result<GameSummary> {
    let mut state = new_game(config, index, rng, catalog)?;
    while state.status == GameStatus::InProgress {
        if state.current_turn > state.settings.max_turns {
            return Err(EngineError::invariant(format!("game '{}' ran past its turn limit", state.id)));
        }
        state = process_turn_with(&state, catalog, bot_batch)?;
    }
    Ok(GameSummary::from_state(index, &state))
}

fn play_logged(config: &SimulationConfig, index: usize, catalog: &Catalog) -> Option<GameSummary> {
    let start = Instant::now();
    let mut rng = rng_for(config, index);
    match play_game(config, index, &mut rng, catalog) {
        Ok(summary) => {
            if !config.quiet {
                let escaped = summary.seats.iter().filter(|s| s.status == PlayerStatus::Escaped).count();
                info!(
                    game = index + 1,
                    of = config.num_games,
                    status = %summary.status,
                    turns = summary.turns,
                    escaped,
                    secs = start.elapsed().as_secs_f64(),
                    "game finished"
                );
            }
            Some(summary)
        }
        Err(e) => {
            warn!(game = index, error = %e, "game aborted");
            None
        }
    }
}

/// Plays every game and returns the summaries ordered by game index. Games
/// that fail are logged and left out.
pub fn run_simulations(config: &SimulationConfig) -> Vec<GameSummary> {
    let mut games = Vec::with_capacity(config.num_games);
    run_simulations_with_callback(config, |g| games.push(g));
    games.sort_by_key(|g| g.index);
    games
}

/// Runs the simulation, handing each finished game to `on_game` as it
/// completes. With more than one thread, completion order is unspecified.
pub fn run_simulations_with_callback<F>(config: &SimulationConfig, on_game: F)
where
    F: FnMut(GameSummary) + Send,
{
    if config.threads > 1 {
        run_parallel(config, on_game);
    } else {
        run_sequential(config, on_game);
    }
}

fn run_sequential<F>(config: &SimulationConfig, mut on_game: F)
where
    F: FnMut(GameSummary),
{
    let catalog = Catalog::standard();
    for i in 0..config.num_games {
        if let Some(summary) = play_logged(config, i, &catalog) {
            on_game(summary);
        }
    }
}

fn run_parallel<F>(config: &SimulationConfig, mut on_game: F)
where
    F: FnMut(GameSummary) + Send,
{
    use rayon::prelude::*;
    use std::sync::mpsc;

    let pool = match rayon::ThreadPoolBuilder::new().num_threads(config.threads).build() {
        Ok(pool) => pool,
        Err(e) => {
            warn!(error = %e, "thread pool unavailable, playing sequentially");
            return run_sequential(config, on_game);
        }
    };
    let catalog = Catalog::standard();
    let (tx, rx) = mpsc::channel::<GameSummary>();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            pool.install(|| {
                (0..config.num_games).into_par_iter().for_each_with(tx, |tx, i| {
                    if let Some(summary) = play_logged(config, i, &catalog) {
                        if let Err(e) = tx.send(summary) {
                            warn!(game = i, error = %e, "collector gone, summary dropped");
                        }
                    }
                });
            });
        });
        for summary in rx {
            on_game(summary);
        }
    });
}

/// Writes one JSON object per line.
pub fn write_jsonl<W: Write>(games: &[GameSummary], out: &mut W) -> std::io::Result<()> {
    for game in games {
        serde_json::to_writer(&mut *out, game)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Prints aggregate results to stderr.
pub fn print_summary(games: &[GameSummary]) {
    let total = games.len();
    let completed = games.iter().filter(|g| g.status == GameStatus::Completed).count();
    let turns: u32 = games.iter().map(|g| g.turns).sum();
    let seats: Vec<&SeatSummary> = games.iter().flat_map(|g| &g.seats).collect();
    let escaped = seats.iter().filter(|s| s.status == PlayerStatus::Escaped).count();

    eprintln!("=== Simulation Summary ===");
    eprintln!("Games: {}", total);
    eprintln!("Avg turns/game: {:.1}", f64::from(turns) / total.max(1) as f64);
    eprintln!("Completed: {}  Abandoned: {}", completed, total - completed);
    eprintln!(
        "Escape rate: {:.1}% of {} ships",
        100.0 * escaped as f64 / seats.len().max(1) as f64,
        seats.len()
    );
    eprintln!("Avg score by captain:");
    for captain in CAPTAINS {
        let scores: Vec<u32> = seats.iter().filter(|s| s.captain == captain).map(|s| s.score).collect();
        if scores.is_empty() {
            continue;
        }
        let avg = f64::from(scores.iter().sum::<u32>()) / scores.len() as f64;
        eprintln!("  {:>12}: {:.1} over {} seats", format!("{:?}", captain), avg, scores.len());
    }
}
