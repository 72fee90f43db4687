//! Session command parser.
//!
//! Turns one line of input into a `Command` the session loop can dispatch on.

use tracing::warn;

use crate::board::{CaptainType, OfficerRole};

/// A parsed session command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Synchronization ping; the engine replies `readyok`.
    IsReady,

    /// Set a session option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Create a game: `newgame <id> <created_at>`.
    NewGame { id: String, created_at: u64 },

    /// Seat a player: `addplayer <id> <captain> [officer...]`.
    AddPlayer { id: String, captain: CaptainType, officers: Vec<OfficerRole> },

    /// Start the game: `start <started_at>`.
    Start { started_at: u64 },

    /// Play one turn with the given action batch, as JSON.
    Actions { json: String },

    /// Play one turn with bots in every seat.
    BotTurn,

    /// Print the current state as JSON.
    State,

    /// Replace the current state with a JSON snapshot.
    Load { json: String },

    /// Terminate the session.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines and unknown commands. Malformed arguments
/// for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let first = *tokens.first()?;

    match first {
        "isready" => Some(Command::IsReady),
        "quit" => Some(Command::Quit),
        "botturn" => Some(Command::BotTurn),
        "state" => Some(Command::State),

        "setoption" => parse_setoption(&tokens),
        "newgame" => parse_newgame(&tokens),
        "addplayer" => parse_addplayer(&tokens),
        "start" => parse_start(&tokens),
        "actions" => rest_of_line(trimmed, "actions").map(|json| Command::Actions { json }),
        "load" => rest_of_line(trimmed, "load").map(|json| Command::Load { json }),

        other => {
            warn!(command = other, "unknown command");
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 || tokens[1] != "name" {
        warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let (name, value) = match tokens.iter().position(|&t| t == "value") {
        Some(vi) => {
            let name_parts = &tokens[2..vi];
            if name_parts.is_empty() {
                warn!("malformed setoption: empty name");
                return None;
            }
            let value_parts = &tokens[vi + 1..];
            let value = (!value_parts.is_empty()).then(|| value_parts.join(" "));
            (name_parts.join(" "), value)
        }
        None => (tokens[2..].join(" "), None),
    };

    Some(Command::SetOption { name, value })
}

fn parse_number(command: &str, token: Option<&&str>) -> Option<u64> {
    let Some(raw) = token else {
        warn!(command, "missing timestamp");
        return None;
    };
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(command, value = *raw, "invalid timestamp");
            None
        }
    }
}

/// Parses `newgame <id> <created_at>`.
fn parse_newgame(tokens: &[&str]) -> Option<Command> {
    let Some(id) = tokens.get(1) else {
        warn!("malformed newgame: expected 'newgame <id> <created_at>'");
        return None;
    };
    let created_at = parse_number("newgame", tokens.get(2))?;
    Some(Command::NewGame { id: id.to_string(), created_at })
}

/// Parses `addplayer <id> <captain> [officer...]`.
fn parse_addplayer(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 {
        warn!("malformed addplayer: expected 'addplayer <id> <captain> [officer...]'");
        return None;
    }
    let Some(captain) = CaptainType::from_name(tokens[2]) else {
        warn!(captain = tokens[2], "unknown captain type");
        return None;
    };
    let mut officers = Vec::new();
    for name in &tokens[3..] {
        match OfficerRole::from_name(name) {
            Some(role) => officers.push(role),
            None => {
                warn!(officer = *name, "unknown officer role");
                return None;
            }
        }
    }
    Some(Command::AddPlayer { id: tokens[1].to_string(), captain, officers })
}

/// Parses `start <started_at>`.
fn parse_start(tokens: &[&str]) -> Option<Command> {
    let started_at = parse_number("start", tokens.get(1))?;
    Some(Command::Start { started_at })
}

/// Everything after the keyword, which may contain spaces.
fn rest_of_line(line: &str, keyword: &str) -> Option<String> {
    let rest = line.strip_prefix(keyword).unwrap_or("").trim();
    if rest.is_empty() {
        warn!(command = keyword, "missing JSON payload");
        return None;
    }
    Some(rest.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_commands() {
        assert_eq!(parse_command("isready"), Some(Command::IsReady));
        assert_eq!(parse_command("quit"), Some(Command::Quit));
        assert_eq!(parse_command("  botturn "), Some(Command::BotTurn));
        assert_eq!(parse_command("state"), Some(Command::State));
    }

    #[test]
    fn empty_and_unknown_lines() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command(" \t"), None);
        assert_eq!(parse_command("warp 9"), None);
    }

    #[test]
    fn setoption_forms() {
        assert_eq!(
            parse_command("setoption name MaxTurns value 12"),
            Some(Command::SetOption { name: "MaxTurns".into(), value: Some("12".into()) })
        );
        assert_eq!(
            parse_command("setoption name Pretty"),
            Some(Command::SetOption { name: "Pretty".into(), value: None })
        );
        assert_eq!(parse_command("setoption"), None);
        assert_eq!(parse_command("setoption name value 3"), None);
    }

    #[test]
    fn newgame_needs_id_and_timestamp() {
        assert_eq!(
            parse_command("newgame g1 1700000000"),
            Some(Command::NewGame { id: "g1".into(), created_at: 1_700_000_000 })
        );
        assert_eq!(parse_command("newgame g1"), None);
        assert_eq!(parse_command("newgame g1 soon"), None);
    }

    #[test]
    fn addplayer_with_officers() {
        assert_eq!(
            parse_command("addplayer p1 merchant doctor ace_pilot"),
            Some(Command::AddPlayer {
                id: "p1".into(),
                captain: CaptainType::Merchant,
                officers: vec![OfficerRole::Doctor, OfficerRole::AcePilot],
            })
        );
        assert_eq!(parse_command("addplayer p1 admiral"), None);
        assert_eq!(parse_command("addplayer p1 veteran janitor"), None);
    }

    #[test]
    fn json_payload_keeps_spaces() {
        assert_eq!(
            parse_command(r#"actions {"p1": [], "p2": []}"#),
            Some(Command::Actions { json: r#"{"p1": [], "p2": []}"#.into() })
        );
        assert_eq!(parse_command("actions"), None);
        assert_eq!(parse_command("start 5"), Some(Command::Start { started_at: 5 }));
    }
}
