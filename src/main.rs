//! Escape Velocity session engine.
//!
//! Reads commands from stdin, one per line, and writes one response line per
//! command to stdout. Logs go to stderr, filtered by `RUST_LOG`.

use std::io::{self, BufRead, Write};

use tracing_subscriber::EnvFilter;

use escape_velocity::engine::Engine;
use escape_velocity::protocol::parser::{parse_command, Command};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run<W: Write>(out: &mut W) -> io::Result<()> {
    let stdin = io::stdin();
    let mut engine = Engine::new();

    for line in stdin.lock().lines() {
        let line = line?;
        let Some(cmd) = parse_command(&line) else {
            continue;
        };

        match cmd {
            Command::IsReady => engine.handle_isready(out)?,
            Command::SetOption { name, value } => engine.set_option(name, value),
            Command::NewGame { id, created_at } => {
                let result = engine.new_game(&id, created_at);
                engine.reply(out, "newgame", result)?;
            }
            Command::AddPlayer { id, captain, officers } => {
                let result = engine.add_player(&id, captain, &officers);
                engine.reply(out, "addplayer", result)?;
            }
            Command::Start { started_at } => {
                let result = engine.start(started_at);
                engine.reply(out, "start", result)?;
            }
            Command::Actions { json } => {
                let result = engine.play_actions(&json);
                engine.reply(out, "actions", result)?;
            }
            Command::BotTurn => {
                let result = engine.play_bot_turn();
                engine.reply(out, "botturn", result)?;
            }
            Command::Load { json } => {
                let result = engine.load(&json);
                engine.reply(out, "load", result)?;
            }
            Command::State => engine.handle_state(out)?,
            Command::Quit => break,
        }
    }
    Ok(())
}

fn main() {
    init_tracing();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    if let Err(e) = run(&mut out) {
        tracing::error!(error = %e, "session i/o failed");
        std::process::exit(1);
    }
}
