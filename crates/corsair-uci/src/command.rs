//! UCI command parsing.

use std::time::Duration;

use corsair_core::{ChessPosition, Game, Grid};
use corsair_engine::config::MAX_HASH_MB;
use corsair_engine::search::negamax::MAX_PLY;

use crate::error::UciError;

/// Parameters for the `go` command.
///
/// All fields are optional; a bare `go` searches to the configured depth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    /// White's remaining time.
    pub wtime: Option<Duration>,
    /// Black's remaining time.
    pub btime: Option<Duration>,
    /// White's increment per move.
    pub winc: Option<Duration>,
    /// Black's increment per move.
    pub binc: Option<Duration>,
    /// Moves until next time control.
    pub movestogo: Option<u32>,
    /// Search to this depth only.
    pub depth: Option<i32>,
    /// Search for exactly this duration.
    pub movetime: Option<Duration>,
}

/// An option set through `setoption name <id> value <x>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UciOption {
    /// Transposition table size in megabytes.
    Hash(usize),
    /// Default depth cap for `go` without `depth`.
    MaxDepth(i32),
}

/// A parsed UCI command.
#[derive(Debug)]
pub enum Command {
    /// `uci` -- identify the engine.
    Uci,
    /// `isready` -- synchronization ping.
    IsReady,
    /// `ucinewgame` -- reset engine state.
    UciNewGame,
    /// `position` -- set up a board position with optional moves applied.
    Position(ChessPosition),
    /// `go` -- search the current position.
    Go(GoParams),
    /// `setoption` -- change an engine option.
    SetOption(UciOption),
    /// `grid <cells> [movetime N] [depth N]` -- best cell for a connect-five board.
    Grid {
        grid: Grid,
        movetime: Option<Duration>,
        depth: Option<i32>,
    },
    /// `quit` -- exit the engine.
    Quit,
    /// Unrecognized command (ignored, as the UCI protocol requires).
    Unknown(String),
}

/// Parse a single line of UCI input into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(Command::Unknown(String::new()));
    }

    match tokens[0] {
        "uci" => Ok(Command::Uci),
        "isready" => Ok(Command::IsReady),
        "ucinewgame" => Ok(Command::UciNewGame),
        "quit" => Ok(Command::Quit),
        "position" => parse_position(&tokens[1..]),
        "go" => parse_go(&tokens[1..]),
        "setoption" => parse_setoption(&tokens[1..]),
        "grid" => parse_grid(&tokens[1..]),
        _ => Ok(Command::Unknown(tokens[0].to_string())),
    }
}

/// Parse the `position` command arguments.
///
/// Supports:
/// - `position startpos [moves e2e4 d7d5 ...]`
/// - `position fen <fen-string> [moves e2e4 d7d5 ...]`
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    let Some(&keyword) = tokens.first() else {
        return Err(UciError::MalformedPosition);
    };

    let (mut pos, rest) = match keyword {
        "startpos" => (ChessPosition::startpos(), &tokens[1..]),
        "fen" => {
            // FEN is 6 space-separated fields
            if tokens.len() < 7 {
                return Err(UciError::InvalidFen {
                    fen: tokens[1..].join(" "),
                    reason: "expected six fields".to_string(),
                });
            }
            let fen = tokens[1..7].join(" ");
            let pos = ChessPosition::from_fen(&fen).map_err(|e| UciError::InvalidFen {
                fen: fen.clone(),
                reason: e.to_string(),
            })?;
            (pos, &tokens[7..])
        }
        _ => return Err(UciError::MalformedPosition),
    };

    // Apply moves if present: "moves e2e4 d7d5 ..."
    if rest.first() == Some(&"moves") {
        for uci_str in &rest[1..] {
            let mv = pos.parse_move(uci_str).map_err(|_| UciError::InvalidMove {
                uci_move: uci_str.to_string(),
            })?;
            pos.apply(&mv);
        }
    }

    Ok(Command::Position(pos))
}

/// Parse the `go` command arguments.
///
/// Supports: wtime, btime, winc, binc, movestogo, depth, movetime.
/// Unknown tokens are silently skipped.
fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut params = GoParams::default();

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "wtime" => {
                params.wtime = Some(parse_millis(tokens.get(i + 1), "wtime")?);
                i += 2;
            }
            "btime" => {
                params.btime = Some(parse_millis(tokens.get(i + 1), "btime")?);
                i += 2;
            }
            "winc" => {
                params.winc = Some(parse_millis(tokens.get(i + 1), "winc")?);
                i += 2;
            }
            "binc" => {
                params.binc = Some(parse_millis(tokens.get(i + 1), "binc")?);
                i += 2;
            }
            "movestogo" => {
                params.movestogo = Some(parse_int(tokens.get(i + 1), "movestogo")?);
                i += 2;
            }
            "depth" => {
                params.depth = Some(parse_int(tokens.get(i + 1), "depth")?);
                i += 2;
            }
            "movetime" => {
                params.movetime = Some(parse_millis(tokens.get(i + 1), "movetime")?);
                i += 2;
            }
            _ => {
                // Unknown token -- skip per UCI convention
                i += 1;
            }
        }
    }

    Ok(Command::Go(params))
}

/// Parse `setoption name <id> value <x>`.
fn parse_setoption(tokens: &[&str]) -> Result<Command, UciError> {
    let name_at = tokens.iter().position(|&t| t == "name");
    let value_at = tokens.iter().position(|&t| t == "value");
    let (Some(name_at), Some(value_at)) = (name_at, value_at) else {
        return Err(UciError::InvalidOption {
            name: tokens.join(" "),
            value: String::new(),
        });
    };

    let name = tokens.get(name_at + 1..value_at).unwrap_or_default().join(" ");
    let value = tokens.get(value_at + 1..).unwrap_or_default().join(" ");
    let invalid = || UciError::InvalidOption {
        name: name.clone(),
        value: value.clone(),
    };

    let option = match name.to_ascii_lowercase().as_str() {
        "hash" => match value.parse::<usize>() {
            Ok(mb) if (1..=MAX_HASH_MB).contains(&mb) => UciOption::Hash(mb),
            _ => return Err(invalid()),
        },
        "maxdepth" => match value.parse::<i32>() {
            Ok(depth) if (1..MAX_PLY as i32).contains(&depth) => UciOption::MaxDepth(depth),
            _ => return Err(invalid()),
        },
        _ => return Err(invalid()),
    };
    Ok(Command::SetOption(option))
}

/// Parse `grid <cells> [movetime N] [depth N]`.
fn parse_grid(tokens: &[&str]) -> Result<Command, UciError> {
    let Some(cells) = tokens.first() else {
        return Err(UciError::InvalidGrid {
            reason: "missing cells".to_string(),
        });
    };
    let grid: Grid = cells.parse().map_err(|e: corsair_core::PositionError| UciError::InvalidGrid {
        reason: e.to_string(),
    })?;

    let mut movetime = None;
    let mut depth = None;
    let mut i = 1;
    while i < tokens.len() {
        match tokens[i] {
            "movetime" => {
                movetime = Some(parse_millis(tokens.get(i + 1), "movetime")?);
                i += 2;
            }
            "depth" => {
                depth = Some(parse_int(tokens.get(i + 1), "depth")?);
                i += 2;
            }
            _ => i += 1,
        }
    }

    Ok(Command::Grid {
        grid,
        movetime,
        depth,
    })
}

/// Parse a millisecond value from a token.
fn parse_millis(token: Option<&&str>, param: &str) -> Result<Duration, UciError> {
    parse_int::<u64>(token, param).map(Duration::from_millis)
}

/// Parse an integer value from a token.
fn parse_int<T: std::str::FromStr>(token: Option<&&str>, param: &str) -> Result<T, UciError> {
    let value = token.ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use corsair_core::Side;

    #[test]
    fn parse_simple_commands() {
        assert!(matches!(parse_command("uci").unwrap(), Command::Uci));
        assert!(matches!(parse_command("isready").unwrap(), Command::IsReady));
        assert!(matches!(parse_command("quit").unwrap(), Command::Quit));
        assert!(matches!(parse_command("ucinewgame").unwrap(), Command::UciNewGame));
    }

    #[test]
    fn parse_position_startpos_with_moves() {
        let cmd = parse_command("position startpos moves e2e4 e7e5").unwrap();
        match cmd {
            Command::Position(pos) => {
                assert_eq!(pos.side_to_move(), Side::First);
                assert!(pos.parse_move("g1f3").is_ok());
                assert!(pos.parse_move("e2e4").is_err());
            }
            other => panic!("expected Position, got {other:?}"),
        }
    }

    #[test]
    fn parse_position_fen() {
        let cmd = parse_command(
            "position fen rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        )
        .unwrap();
        match cmd {
            Command::Position(pos) => assert_eq!(pos.side_to_move(), Side::Second),
            other => panic!("expected Position, got {other:?}"),
        }
    }

    #[test]
    fn repeated_moves_reach_a_claimable_draw() {
        let cmd = parse_command(
            "position startpos moves g1f3 g8f6 f3g1 f6g8 g1f3 g8f6 f3g1 f6g8",
        )
        .unwrap();
        match cmd {
            Command::Position(pos) => assert!(pos.can_claim_draw()),
            other => panic!("expected Position, got {other:?}"),
        }
    }

    #[test]
    fn parse_position_errors() {
        assert!(matches!(parse_command("position"), Err(UciError::MalformedPosition)));
        assert!(matches!(parse_command("position sideways"), Err(UciError::MalformedPosition)));
        assert!(matches!(
            parse_command("position fen invalid"),
            Err(UciError::InvalidFen { .. })
        ));
        assert!(matches!(
            parse_command("position startpos moves e2e5"),
            Err(UciError::InvalidMove { .. })
        ));
    }

    #[test]
    fn parse_go_depth() {
        match parse_command("go depth 6").unwrap() {
            Command::Go(params) => assert_eq!(params.depth, Some(6)),
            other => panic!("expected Go, got {other:?}"),
        }
    }

    #[test]
    fn parse_go_bare_defaults() {
        match parse_command("go").unwrap() {
            Command::Go(params) => assert_eq!(params, GoParams::default()),
            other => panic!("expected Go, got {other:?}"),
        }
    }

    #[test]
    fn parse_go_clock() {
        let cmd = parse_command("go wtime 300000 btime 290000 winc 2000 binc 1000 movestogo 20").unwrap();
        match cmd {
            Command::Go(params) => {
                assert_eq!(params.wtime, Some(Duration::from_millis(300_000)));
                assert_eq!(params.btime, Some(Duration::from_millis(290_000)));
                assert_eq!(params.winc, Some(Duration::from_millis(2000)));
                assert_eq!(params.binc, Some(Duration::from_millis(1000)));
                assert_eq!(params.movestogo, Some(20));
            }
            other => panic!("expected Go, got {other:?}"),
        }
    }

    #[test]
    fn parse_go_movetime_and_unknown_tokens() {
        match parse_command("go infinite movetime 5000 ponder").unwrap() {
            Command::Go(params) => assert_eq!(params.movetime, Some(Duration::from_millis(5000))),
            other => panic!("expected Go, got {other:?}"),
        }
    }

    #[test]
    fn parse_go_errors() {
        assert!(matches!(parse_command("go wtime"), Err(UciError::MissingGoValue { .. })));
        assert!(matches!(parse_command("go depth abc"), Err(UciError::InvalidGoValue { .. })));
    }

    #[test]
    fn parse_setoption() {
        assert!(matches!(
            parse_command("setoption name Hash value 64").unwrap(),
            Command::SetOption(UciOption::Hash(64))
        ));
        assert!(matches!(
            parse_command("setoption name MaxDepth value 9").unwrap(),
            Command::SetOption(UciOption::MaxDepth(9))
        ));
        assert!(matches!(
            parse_command("setoption name Hash value 0"),
            Err(UciError::InvalidOption { .. })
        ));
        assert!(matches!(
            parse_command("setoption name Hash value 65536").unwrap(),
            Command::SetOption(UciOption::Hash(65_536))
        ));
        assert!(matches!(
            parse_command("setoption name Hash value 65537"),
            Err(UciError::InvalidOption { .. })
        ));
        assert!(matches!(
            parse_command("setoption name MaxDepth value 128"),
            Err(UciError::InvalidOption { .. })
        ));
        assert!(matches!(
            parse_command("setoption name Threads value 4"),
            Err(UciError::InvalidOption { .. })
        ));
        assert!(matches!(
            parse_command("setoption Hash 4"),
            Err(UciError::InvalidOption { .. })
        ));
    }

    #[test]
    fn parse_grid_command() {
        let cells = ".".repeat(225);
        match parse_command(&format!("grid {cells} movetime 250 depth 3")).unwrap() {
            Command::Grid {
                grid,
                movetime,
                depth,
            } => {
                assert_eq!(grid.to_string(), cells);
                assert_eq!(movetime, Some(Duration::from_millis(250)));
                assert_eq!(depth, Some(3));
            }
            other => panic!("expected Grid, got {other:?}"),
        }
    }

    #[test]
    fn parse_grid_errors() {
        assert!(matches!(parse_command("grid"), Err(UciError::InvalidGrid { .. })));
        assert!(matches!(parse_command("grid ...."), Err(UciError::InvalidGrid { .. })));
    }

    #[test]
    fn parse_unknown_and_empty() {
        assert!(matches!(parse_command("foobar").unwrap(), Command::Unknown(_)));
        assert!(matches!(parse_command("stop").unwrap(), Command::Unknown(_)));
        assert!(matches!(parse_command("").unwrap(), Command::Unknown(_)));
    }
}
