//! Achievement catalog and unlock tracking
//!
//! The catalog is static data; unlock rules are values of [`Condition`], so
//! adding a game or a row never adds control flow. The tracker owns the
//! stats map and persists it best-effort after every recorded session.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::persistence::{StatsMap, StatsStore};
use crate::session::SessionResult;
use crate::stats::{GameId, GameStats};

/// Unlock predicate evaluated against the stats updated by the session
/// being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// The most recent session ran to its natural end.
    Completed,
    BestScore(u64),
    TotalCleared(u64),
    HighestLevel(u32),
    /// Best armor over all sessions reaches the threshold and the most
    /// recent session ended un-aborted.
    ArmorIntact(u32),
}

impl Condition {
    fn holds(&self, stats: &GameStats) -> bool {
        match *self {
            Condition::Completed => stats.sessions > 0 && !stats.last_aborted,
            Condition::BestScore(threshold) => stats.best_score >= threshold,
            Condition::TotalCleared(threshold) => stats.total_cleared >= threshold,
            Condition::HighestLevel(threshold) => stats.highest_level >= threshold,
            Condition::ArmorIntact(threshold) => {
                !stats.last_aborted && stats.best_armor >= threshold
            }
        }
    }
}

pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub game: GameId,
    pub condition: Condition,
}

pub static CATALOG: [Achievement; 19] = [
    Achievement {
        id: "block_first_shift",
        name: "First Shift",
        description: "Finish a yard session",
        game: GameId::FallingBlock,
        condition: Condition::Completed,
    },
    Achievement {
        id: "block_score_5000",
        name: "Dispatcher",
        description: "Score 5,000 in a single session",
        game: GameId::FallingBlock,
        condition: Condition::BestScore(5000),
    },
    Achievement {
        id: "block_lines_100",
        name: "Yard Master",
        description: "Clear 100 lines in total",
        game: GameId::FallingBlock,
        condition: Condition::TotalCleared(100),
    },
    Achievement {
        id: "block_level_5",
        name: "Express Service",
        description: "Reach level 5",
        game: GameId::FallingBlock,
        condition: Condition::HighestLevel(5),
    },
    Achievement {
        id: "invaders_first_stand",
        name: "First Stand",
        description: "Survive to the end of a defense",
        game: GameId::TopDownShooter,
        condition: Condition::Completed,
    },
    Achievement {
        id: "invaders_score_2000",
        name: "Gunner",
        description: "Score 2,000 in a single defense",
        game: GameId::TopDownShooter,
        condition: Condition::BestScore(2000),
    },
    Achievement {
        id: "invaders_kills_25",
        name: "Exterminator",
        description: "Destroy 25 invaders in total",
        game: GameId::TopDownShooter,
        condition: Condition::TotalCleared(25),
    },
    Achievement {
        id: "invaders_untouched",
        name: "Untouchable",
        description: "Finish a defense with full armor",
        game: GameId::TopDownShooter,
        condition: Condition::ArmorIntact(3),
    },
    Achievement {
        id: "combat_first_sortie",
        name: "First Sortie",
        description: "Finish an arena session",
        game: GameId::Combat3d,
        condition: Condition::Completed,
    },
    Achievement {
        id: "combat_score_3000",
        name: "Slayer",
        description: "Score 3,000 in a single sortie",
        game: GameId::Combat3d,
        condition: Condition::BestScore(3000),
    },
    Achievement {
        id: "combat_kills_50",
        name: "Knee-Deep",
        description: "Destroy 50 hostiles in total",
        game: GameId::Combat3d,
        condition: Condition::TotalCleared(50),
    },
    Achievement {
        id: "combat_level_4",
        name: "Veteran",
        description: "Reach threat level 4",
        game: GameId::Combat3d,
        condition: Condition::HighestLevel(4),
    },
    Achievement {
        id: "combat_untouched",
        name: "Iron Hide",
        description: "Finish a sortie with full armor",
        game: GameId::Combat3d,
        condition: Condition::ArmorIntact(3),
    },
    Achievement {
        id: "wave1_first_wave",
        name: "Beachhead",
        description: "Finish an episode 1 wave",
        game: GameId::WaveShooterEp1,
        condition: Condition::Completed,
    },
    Achievement {
        id: "wave1_score_2500",
        name: "Wave Breaker",
        description: "Score 2,500 in a single episode 1 run",
        game: GameId::WaveShooterEp1,
        condition: Condition::BestScore(2500),
    },
    Achievement {
        id: "wave1_kills_40",
        name: "Thinned Ranks",
        description: "Destroy 40 hostiles in total in episode 1",
        game: GameId::WaveShooterEp1,
        condition: Condition::TotalCleared(40),
    },
    Achievement {
        id: "wave2_first_wave",
        name: "Second Front",
        description: "Finish an episode 2 wave",
        game: GameId::WaveShooterEp2,
        condition: Condition::Completed,
    },
    Achievement {
        id: "wave2_score_2500",
        name: "Tide Turner",
        description: "Score 2,500 in a single episode 2 run",
        game: GameId::WaveShooterEp2,
        condition: Condition::BestScore(2500),
    },
    Achievement {
        id: "wave2_untouched",
        name: "Unbroken Line",
        description: "Finish an episode 2 wave with full armor",
        game: GameId::WaveShooterEp2,
        condition: Condition::ArmorIntact(3),
    },
];

/// Rows belonging to one game, in catalog order
pub fn catalog_for(game: GameId) -> impl Iterator<Item = &'static Achievement> {
    CATALOG.iter().filter(move |a| a.game == game)
}

/// Owns the per-game statistics and decides unlocks.
///
/// Sessions are keyed by their `session_id`; recording the same session
/// twice is a silent no-op so callers can hand the same result to multiple
/// UI paths without double counting.
pub struct AchievementTracker {
    store: Box<dyn StatsStore>,
    stats: StatsMap,
    recorded: HashSet<u64>,
}

impl AchievementTracker {
    pub fn new(store: Box<dyn StatsStore>) -> Self {
        let stats = store.load();
        Self {
            store,
            stats,
            recorded: HashSet::new(),
        }
    }

    pub fn stats(&self, game: GameId) -> Option<&GameStats> {
        self.stats.get(&game)
    }

    /// Every catalog row for `game` with its earned flag.
    pub fn achievements(&self, game: GameId) -> Vec<(&'static Achievement, bool)> {
        let unlocked = self.stats.get(&game).map(|s| &s.unlocked);
        catalog_for(game)
            .map(|a| (a, unlocked.is_some_and(|set| set.contains(a.id))))
            .collect()
    }

    /// Fold a finished session into the stats and return the achievements
    /// newly unlocked by it.
    pub fn record_session(&mut self, result: &SessionResult) -> Vec<&'static Achievement> {
        if !self.recorded.insert(result.session_id) {
            log::debug!("session {} already recorded, ignoring", result.session_id);
            return Vec::new();
        }
        let entry = self.stats.entry(result.game).or_default();
        entry.absorb(result, unix_now());

        let mut newly_unlocked = Vec::new();
        for achievement in catalog_for(result.game) {
            if entry.unlocked.contains(achievement.id) {
                continue;
            }
            if achievement.condition.holds(entry) {
                entry.unlocked.insert(achievement.id.to_owned());
                log::info!("achievement unlocked: {} ({})", achievement.name, achievement.id);
                newly_unlocked.push(achievement);
            }
        }
        self.store.save(&self.stats);
        newly_unlocked
    }
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
