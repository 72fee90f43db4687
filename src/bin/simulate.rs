//! Bot game simulation CLI.
//!
//! Plays games with bots in every seat and writes one JSON summary per game.
//!
//! Usage:
//!   cargo run --release --bin simulate -- [OPTIONS]
//!
//! Options:
//!   --games N       Number of games to play (default: 10)
//!   --players N     Seats per game (default: 4)
//!   --max-turns N   Turn limit per game (default: 20)
//!   --threads N     Number of parallel threads (default: 4)
//!   --seed N        Random seed, 0 for entropy (default: 0)
//!   --output FILE   Output file path (default: stdout)
//!   --quiet         Suppress progress and summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::process;
use std::str::FromStr;
use std::time::Instant;

use tracing_subscriber::EnvFilter;

use escape_velocity::simulate::{self, SimulationConfig};

fn parse_value<T: FromStr>(flag: &str, value: Option<&String>) -> T {
    match value.map(|v| v.parse()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("invalid {} value", flag);
            print_usage();
            process::exit(1);
        }
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();

    let args: Vec<String> = env::args().collect();
    let mut config = SimulationConfig::default();
    let mut output_path: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--games" => {
                i += 1;
                config.num_games = parse_value(flag, args.get(i));
            }
            "--players" => {
                i += 1;
                config.players = parse_value(flag, args.get(i));
            }
            "--max-turns" => {
                i += 1;
                config.max_turns = parse_value(flag, args.get(i));
            }
            "--threads" => {
                i += 1;
                config.threads = parse_value(flag, args.get(i));
            }
            "--seed" => {
                i += 1;
                config.seed = parse_value(flag, args.get(i));
            }
            "--output" => {
                i += 1;
                output_path = Some(parse_value(flag, args.get(i)));
            }
            "--quiet" => config.quiet = true,
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let start = Instant::now();
    let games = simulate::run_simulations(&config);
    if !config.quiet {
        eprintln!("Completed {} games in {:.1}s", games.len(), start.elapsed().as_secs_f64());
        simulate::print_summary(&games);
    }

    let written = match &output_path {
        Some(path) => File::create(path).and_then(|f| simulate::write_jsonl(&games, &mut BufWriter::new(f))),
        None => simulate::write_jsonl(&games, &mut BufWriter::new(io::stdout().lock())),
    };
    if let Err(e) = written {
        eprintln!("failed to write output: {}", e);
        process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Usage: simulate [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N        Number of games to play (default: 10)");
    eprintln!("  --players N      Seats per game (default: 4)");
    eprintln!("  --max-turns N    Turn limit per game (default: 20)");
    eprintln!("  --threads N      Number of parallel threads (default: 4)");
    eprintln!("  --seed N         Random seed, 0 for entropy (default: 0)");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress progress and summary output");
    eprintln!("  --help           Show this help");
}
