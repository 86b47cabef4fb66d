//! Synchronous UCI engine: one command at a time, searches run to completion.

use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use corsair_core::{ChessMove, ChessPosition, Game};
use corsair_engine::config::{DEFAULT_HASH_MB, MAX_HASH_MB};
use corsair_engine::search::negamax::{MAX_PLY, mate_distance};
use corsair_engine::{ChessEvaluator, SearchConfig, SearchLimits, Searcher, budget_from_go};

use crate::command::{Command, GoParams, UciOption, parse_command};
use crate::error::UciError;

/// Budget for `grid` without `movetime`.
const DEFAULT_GRID_MOVETIME: Duration = Duration::from_millis(1000);

/// The UCI engine, holding the current position and the chess searcher.
pub struct UciEngine {
    position: ChessPosition,
    searcher: Searcher<ChessPosition>,
}

impl UciEngine {
    /// Create a new engine with the starting position.
    pub fn new() -> Self {
        Self {
            position: ChessPosition::startpos(),
            searcher: Searcher::new(SearchConfig::default()),
        }
    }

    /// Run the UCI loop on stdin/stdout until `quit` or input closes.
    pub fn run(mut self) -> Result<(), UciError> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), &mut stdout.lock())
    }

    /// Run the UCI loop over any line reader and writer.
    pub fn run_with<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<(), UciError> {
        for line in input.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            debug!(cmd = %trimmed, "received UCI command");

            match parse_command(trimmed) {
                Ok(Command::Quit) => break,
                Ok(cmd) => self.handle(cmd, out)?,
                Err(e) => warn!(error = %e, "UCI parse error"),
            }
            out.flush()?;
        }

        info!("corsair shutting down");
        Ok(())
    }

    fn handle<W: Write>(&mut self, cmd: Command, out: &mut W) -> Result<(), UciError> {
        match cmd {
            Command::Uci => self.handle_uci(out)?,
            Command::IsReady => writeln!(out, "readyok")?,
            Command::UciNewGame => self.position = ChessPosition::startpos(),
            Command::Position(pos) => self.position = pos,
            Command::Go(params) => self.handle_go(&params, out)?,
            Command::SetOption(option) => self.handle_setoption(option),
            Command::Grid {
                grid,
                movetime,
                depth,
            } => handle_grid(&grid.to_string(), movetime, depth, out)?,
            Command::Quit | Command::Unknown(_) => {}
        }
        Ok(())
    }

    fn handle_uci<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let config = self.searcher.config();
        writeln!(out, "id name corsair")?;
        writeln!(out, "id author corsair developers")?;
        writeln!(
            out,
            "option name Hash type spin default {DEFAULT_HASH_MB} min 1 max {MAX_HASH_MB}"
        )?;
        writeln!(
            out,
            "option name MaxDepth type spin default {} min 1 max {}",
            config.max_depth,
            MAX_PLY - 1
        )?;
        writeln!(out, "uciok")
    }

    fn handle_setoption(&mut self, option: UciOption) {
        match option {
            UciOption::Hash(mb) => self.searcher.resize_tt(mb),
            UciOption::MaxDepth(depth) => self.searcher.set_max_depth(depth),
        }
        debug!(?option, "option set");
    }

    fn handle_go<W: Write>(&mut self, params: &GoParams, out: &mut W) -> Result<(), UciError> {
        let side = self.position.side_to_move();
        let limits = SearchLimits {
            time_budget: budget_from_go(
                params.wtime,
                params.btime,
                params.winc,
                params.binc,
                params.movestogo,
                params.movetime,
                side,
            ),
            max_depth: params.depth,
        };

        let start = Instant::now();
        let mut write_result = Ok(());
        let result = self.searcher.search(
            &mut self.position,
            &ChessEvaluator,
            &limits,
            |depth, score, nodes, pv| {
                if write_result.is_ok() {
                    write_result = write_info(&mut *out, depth, score, nodes, start.elapsed(), pv);
                }
            },
        );
        write_result?;

        match result.best_move {
            Some(mv) => writeln!(out, "bestmove {mv}")?,
            None => writeln!(out, "bestmove 0000")?,
        }
        Ok(())
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// `info depth D score cp S|mate N nodes N nps N time T pv ...`
fn write_info<W: Write>(
    out: &mut W,
    depth: i32,
    score: i32,
    nodes: u64,
    elapsed: Duration,
    pv: &[ChessMove],
) -> io::Result<()> {
    let elapsed_ms = elapsed.as_millis().max(1);
    let nps = (nodes as u128 * 1000) / elapsed_ms;
    let pv_str = pv.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ");
    writeln!(
        out,
        "info depth {depth} score {} nodes {nodes} nps {nps} time {elapsed_ms} pv {pv_str}",
        format_score(score)
    )
}

/// UCI score: `mate N` in full moves (negative when getting mated), else `cp S`.
fn format_score(score: i32) -> String {
    match mate_distance(score) {
        Some(plies) => {
            let moves = (plies + 1) / 2;
            format!("mate {}", if score > 0 { moves } else { -moves })
        }
        None => format!("cp {score}"),
    }
}

fn handle_grid<W: Write>(
    cells: &str,
    movetime: Option<Duration>,
    depth: Option<i32>,
    out: &mut W,
) -> io::Result<()> {
    let millis = movetime.unwrap_or(DEFAULT_GRID_MOVETIME).as_millis() as u64;
    let report = match depth {
        Some(depth) => corsair_engine::get_best_cell_with_depth(cells, millis, depth),
        None => corsair_engine::get_best_cell(cells, millis),
    };

    if report.depth_reached > 0 {
        writeln!(
            out,
            "info depth {} score {}",
            report.depth_reached,
            format_score(report.eval_score)
        )?;
    }
    match (report.row, report.col) {
        (Some(row), Some(col)) => writeln!(out, "bestcell {row} {col}"),
        _ => writeln!(out, "bestcell none"),
    }
}
