//! Search configuration and per-call limits.

use std::time::Duration;

/// Default transposition table size in megabytes.
pub const DEFAULT_HASH_MB: usize = 16;

/// Largest transposition table the engine will allocate, in megabytes.
pub const MAX_HASH_MB: usize = 65_536;

/// Default half-width of the aspiration window, in centipawns.
pub const DEFAULT_ASPIRATION_WINDOW: i32 = 50;

/// Default iterative-deepening depth cap.
pub const DEFAULT_MAX_DEPTH: i32 = 64;

/// Settings that outlive a single search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Transposition table size in megabytes.
    pub hash_mb: usize,
    /// Aspiration window half-width around the previous iteration's score.
    pub aspiration_window: i32,
    /// Deepest iteration started when the call sets no depth of its own.
    pub max_depth: i32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            hash_mb: DEFAULT_HASH_MB,
            aspiration_window: DEFAULT_ASPIRATION_WINDOW,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Limits for one top-level search call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    /// Wall-clock budget; `None` searches until the depth cap.
    pub time_budget: Option<Duration>,
    /// Depth cap for this call; `None` falls back to [`SearchConfig::max_depth`].
    pub max_depth: Option<i32>,
}

impl SearchLimits {
    /// No time budget, configured depth cap.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Search exactly up to `depth`, ignoring the clock.
    pub fn depth(depth: i32) -> Self {
        Self {
            time_budget: None,
            max_depth: Some(depth),
        }
    }

    /// Search for at most `millis` milliseconds.
    pub fn millis(millis: u64) -> Self {
        Self {
            time_budget: Some(Duration::from_millis(millis)),
            max_depth: None,
        }
    }

    /// Also cap the depth at `depth`.
    pub fn with_depth(mut self, depth: i32) -> Self {
        self.max_depth = Some(depth);
        self
    }
}
