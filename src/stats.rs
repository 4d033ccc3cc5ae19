//! Per-game identifiers and cumulative statistics
//!
//! One `GameStats` record per mini-game accumulates for the lifetime of the
//! installation. Records are created lazily on the first recorded session and
//! mutated only by the achievement tracker.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::session::SessionResult;

/// Identifier for each mini-game variant
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GameId {
    /// Falling-block puzzle (board-based)
    FallingBlock,
    /// Invader-style shooter with sweeping hostiles
    TopDownShooter,
    /// Arena combat simulator (runs on a background thread)
    #[serde(rename = "combat_3d")]
    Combat3d,
    /// Classic wave shooter, episode I
    WaveShooterEp1,
    /// Classic wave shooter, episode II
    WaveShooterEp2,
}

impl GameId {
    pub const ALL: [GameId; 5] = [
        GameId::FallingBlock,
        GameId::TopDownShooter,
        GameId::Combat3d,
        GameId::WaveShooterEp1,
        GameId::WaveShooterEp2,
    ];

    /// Stable storage key, matching the serde rename
    pub fn key(&self) -> &'static str {
        match self {
            GameId::FallingBlock => "falling_block",
            GameId::TopDownShooter => "top_down_shooter",
            GameId::Combat3d => "combat_3d",
            GameId::WaveShooterEp1 => "wave_shooter_ep1",
            GameId::WaveShooterEp2 => "wave_shooter_ep2",
        }
    }

    /// Display title for launcher panels
    pub fn title(&self) -> &'static str {
        match self {
            GameId::FallingBlock => "Train Yard Simulation",
            GameId::TopDownShooter => "Orbital Defense Protocol",
            GameId::Combat3d => "Holographic Combat Chamber",
            GameId::WaveShooterEp1 => "Wave Assault - Episode I",
            GameId::WaveShooterEp2 => "Wave Assault - Episode II",
        }
    }
}

/// Cumulative statistics for one mini-game
///
/// `cleared` counts the game's primary completion metric: rows cleared for the
/// falling-block game, hostiles destroyed for the shooters. The two meanings
/// share nothing beyond "the number achievement thresholds compare against".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameStats {
    pub sessions: u32,
    pub best_score: u64,
    pub total_cleared: u64,
    pub highest_level: u32,
    /// Best secondary metric (armor/lives remaining) over all sessions
    pub best_armor: u32,
    /// Total elapsed play time in seconds
    pub total_time: f64,
    pub last_score: u64,
    pub last_cleared: u64,
    pub last_level: u32,
    pub last_armor: u32,
    pub last_aborted: bool,
    /// Unix timestamp (seconds) of the most recent session
    pub last_played: Option<f64>,
    /// Ids of achievements already earned; membership is what matters
    pub unlocked: BTreeSet<String>,
}

impl Default for GameStats {
    fn default() -> Self {
        Self {
            sessions: 0,
            best_score: 0,
            total_cleared: 0,
            highest_level: 1,
            best_armor: 0,
            total_time: 0.0,
            last_score: 0,
            last_cleared: 0,
            last_level: 1,
            last_armor: 0,
            last_aborted: false,
            last_played: None,
            unlocked: BTreeSet::new(),
        }
    }
}

impl GameStats {
    /// Fold one finished session into the cumulative record.
    ///
    /// Maxima (`best_score`, `highest_level`, `best_armor`) and running totals
    /// never decrease; `last_*` fields are overwritten wholesale.
    pub fn absorb(&mut self, result: &SessionResult, now: f64) {
        self.sessions += 1;
        self.best_score = self.best_score.max(result.score);
        self.total_cleared += result.cleared;
        self.highest_level = self.highest_level.max(result.level);
        self.best_armor = self.best_armor.max(result.armor);
        self.total_time += result.duration;
        self.last_score = result.score;
        self.last_cleared = result.cleared;
        self.last_level = result.level;
        self.last_armor = result.armor;
        self.last_aborted = result.aborted;
        self.last_played = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionResult;

    fn result(score: u64, cleared: u64, level: u32) -> SessionResult {
        SessionResult {
            game: GameId::WaveShooterEp1,
            session_id: 1,
            score,
            cleared,
            level,
            duration: 30.0,
            armor: 2,
            aborted: false,
        }
    }

    #[test]
    fn absorb_tracks_maxima_and_totals() {
        let mut stats = GameStats::default();
        stats.absorb(&result(500, 10, 3), 1_000.0);
        stats.absorb(&result(200, 5, 2), 2_000.0);

        assert_eq!(stats.sessions, 2);
        assert_eq!(stats.best_score, 500);
        assert_eq!(stats.total_cleared, 15);
        assert_eq!(stats.highest_level, 3);
        assert_eq!(stats.last_score, 200);
        assert_eq!(stats.last_level, 2);
        assert_eq!(stats.last_played, Some(2_000.0));
        assert!((stats.total_time - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let stats: GameStats = serde_json::from_str(r#"{"sessions": 4, "best_score": 900}"#)
            .expect("partial record should deserialize");
        assert_eq!(stats.sessions, 4);
        assert_eq!(stats.best_score, 900);
        assert_eq!(stats.highest_level, 1);
        assert!(stats.unlocked.is_empty());
    }

    proptest::proptest! {
        #[test]
        fn maxima_and_totals_never_decrease(
            sessions in proptest::collection::vec(
                (0u64..100_000, 0u64..500, 1u32..20, 0u32..4, proptest::bool::ANY),
                1..40,
            ),
        ) {
            let mut stats = GameStats::default();
            for (i, (score, cleared, level, armor, aborted)) in sessions.into_iter().enumerate() {
                let before = stats.clone();
                stats.absorb(
                    &SessionResult {
                        game: GameId::Combat3d,
                        session_id: i as u64,
                        score,
                        cleared,
                        level,
                        duration: 1.0,
                        armor,
                        aborted,
                    },
                    i as f64,
                );
                proptest::prop_assert!(stats.best_score >= before.best_score);
                proptest::prop_assert!(stats.total_cleared >= before.total_cleared);
                proptest::prop_assert!(stats.highest_level >= before.highest_level);
                proptest::prop_assert!(stats.best_armor >= before.best_armor);
                proptest::prop_assert!(stats.total_time >= before.total_time);
                proptest::prop_assert_eq!(stats.sessions, before.sessions + 1);
            }
        }
    }

    #[test]
    fn game_id_round_trips_as_json_key() {
        for game in GameId::ALL {
            let json = serde_json::to_string(&game).unwrap();
            assert_eq!(json, format!("\"{}\"", game.key()));
            let back: GameId = serde_json::from_str(&json).unwrap();
            assert_eq!(back, game);
        }
    }
}
