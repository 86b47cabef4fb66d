//! Time management: convert clock parameters to a per-move budget.

use std::time::Duration;

use corsair_core::Side;

/// Reserved for I/O and bookkeeping on every move.
const OVERHEAD_MS: f64 = 10.0;

/// Expected moves left when the GUI does not say.
const DEFAULT_MOVES_TO_GO: f64 = 30.0;

/// Share of the increment spent on top of the base allotment.
const INCREMENT_SHARE: f64 = 0.75;

/// Most of the remaining clock one move may use.
const MAX_SHARE_OF_REMAINING: f64 = 0.25;

/// Per-move budget from the remaining clock and increment.
///
/// | Term             | Value                                    |
/// |------------------|------------------------------------------|
/// | usable           | `remaining - 10 ms`                      |
/// | base             | `usable / moves_to_go` (default 30)      |
/// | budget           | `base + increment * 0.75`                |
/// | cap              | `usable * 0.25`                          |
///
/// Never below 1 ms.
pub fn compute_budget(remaining: Duration, increment: Duration, moves_to_go: Option<u32>) -> Duration {
    let remaining_ms = remaining.as_millis() as f64;
    if remaining_ms < OVERHEAD_MS {
        return Duration::from_millis(1);
    }

    let usable = (remaining_ms - OVERHEAD_MS).max(1.0);
    let mtg = moves_to_go.map_or(DEFAULT_MOVES_TO_GO, |x| f64::from(x.max(1)));
    let inc_ms = increment.as_millis() as f64;

    let budget = usable / mtg + inc_ms * INCREMENT_SHARE;
    let budget = budget.min(usable * MAX_SHARE_OF_REMAINING).max(1.0);

    Duration::from_millis(budget as u64)
}

/// Budget for a UCI `go` command; `None` searches without a clock.
///
/// Priority order:
/// 1. `movetime`
/// 2. the side to move's clock, through [`compute_budget`]
/// 3. unlimited (`depth`-only or bare `go`)
pub fn budget_from_go(
    wtime: Option<Duration>,
    btime: Option<Duration>,
    winc: Option<Duration>,
    binc: Option<Duration>,
    movestogo: Option<u32>,
    movetime: Option<Duration>,
    side: Side,
) -> Option<Duration> {
    if movetime.is_some() {
        return movetime;
    }

    let (remaining, increment) = match side {
        Side::First => (wtime, winc),
        Side::Second => (btime, binc),
    };
    remaining.map(|rem| compute_budget(rem, increment.unwrap_or(Duration::ZERO), movestogo))
}
