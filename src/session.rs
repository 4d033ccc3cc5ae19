//! Immutable per-run result records
//!
//! A `SessionResult` is produced exactly once when a session reaches a
//! terminal state (player defeated) or is aborted (window closed, stop
//! requested). The simulations guard creation with an idempotency flag; the
//! achievement tracker additionally refuses to record the same `session_id`
//! twice, so the "game over" and "window closed" paths can both fire safely.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::stats::GameId;
use crate::tuning;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Mint a process-unique session identifier.
pub fn next_session_id() -> u64 {
    NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed)
}

/// Final statistics of one mini-game run, immutable after creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub game: GameId,
    /// Idempotency key; a result is recorded at most once
    pub session_id: u64,
    pub score: u64,
    /// Primary completion metric: rows cleared or hostiles destroyed
    pub cleared: u64,
    /// Threat level / difficulty reached
    pub level: u32,
    /// Wall-clock seconds the session ran
    pub duration: f64,
    /// Secondary metric: armor or lives remaining (0 where inapplicable)
    pub armor: u32,
    /// True when the user quit rather than playing to defeat
    pub aborted: bool,
}

impl SessionResult {
    /// Result for a session stopped before any final-state snapshot existed.
    ///
    /// Every field carries a sensible default so no partial record ever
    /// reaches the statistics: zero score, level 1, and the variant's
    /// configured secondary-metric default (full armor for shooters).
    pub fn aborted_default(game: GameId, session_id: u64, duration: f64) -> Self {
        Self {
            game,
            session_id,
            score: 0,
            cleared: 0,
            level: 1,
            duration: duration.max(0.0),
            armor: tuning::default_armor(game),
            aborted: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique() {
        let a = next_session_id();
        let b = next_session_id();
        assert_ne!(a, b);
    }

    #[test]
    fn aborted_default_is_fully_populated() {
        let result = SessionResult::aborted_default(GameId::Combat3d, 7, 12.5);
        assert!(result.aborted);
        assert_eq!(result.score, 0);
        assert_eq!(result.level, 1);
        assert_eq!(result.armor, 3); // shooter default: full armor
        assert!((result.duration - 12.5).abs() < f64::EPSILON);

        let board = SessionResult::aborted_default(GameId::FallingBlock, 8, -1.0);
        assert_eq!(board.armor, 0);
        assert_eq!(board.duration, 0.0); // negative clock drift clamped
    }
}
