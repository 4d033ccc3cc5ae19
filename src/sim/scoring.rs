//! Score, combo, and threat-level policy
//!
//! Deterministic mapping from game events to score and difficulty changes.
//! All variants share the same shape: a multiplicative combo bonus stacked on
//! an additive level bonus, with per-variant constants from `tuning`.

use crate::tuning::{ComboDecay, Tuning};

/// Simultaneous line-clear bonuses for the falling-block game, indexed by
/// cleared-row count minus one. Intentionally a lookup table, not a formula:
/// the ratios reward batching and are not arithmetic.
pub const LINE_CLEAR_TABLE: [u64; 4] = [100, 300, 700, 1500];

/// Score awarded for clearing `rows` rows at once, scaled by the level in
/// effect after the clear.
pub fn line_clear_score(rows: usize, level: u32) -> u64 {
    debug_assert!((1..=4).contains(&rows));
    let base = LINE_CLEAR_TABLE[rows.clamp(1, 4) - 1];
    base * u64::from(level.max(1))
}

/// Score for destroying a hostile: its bounty plus the level/combo bonus.
pub fn kill_score(bounty: u64, scale: u64, level: u32, combo: u32) -> u64 {
    bounty + scale * u64::from(level) * u64::from(combo)
}

/// Threat level as a function of cumulative kills this session.
pub fn threat_level(cleared: u64, kills_per_level: u32) -> u32 {
    1 + (cleared / u64::from(kills_per_level.max(1))) as u32
}

/// Seconds until the next hostile spawn at the given threat level, floored at
/// the variant's minimum. This is the primary difficulty ramp.
pub fn spawn_interval(tuning: &Tuning, level: u32) -> f32 {
    let reduced = tuning.spawn_interval - tuning.spawn_step * (level.saturating_sub(1)) as f32;
    reduced.max(tuning.min_spawn_interval)
}

/// Kill-streak multiplier
///
/// Baseline is 1. Each kill inside the live window extends the streak; player
/// damage kills the streak immediately; an expired window decays it back to
/// baseline on the next observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combo {
    value: u32,
    /// Elapsed-time deadline after which the streak is dead. NEG_INFINITY
    /// means no live streak.
    deadline: f32,
}

impl Default for Combo {
    fn default() -> Self {
        Self {
            value: 1,
            deadline: f32::NEG_INFINITY,
        }
    }
}

impl Combo {
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Register a kill at `elapsed` seconds; returns the multiplier to score
    /// this kill with.
    pub fn register_kill(&mut self, elapsed: f32, decay: ComboDecay) -> u32 {
        let streak_alive = elapsed <= self.deadline;
        self.value = if streak_alive { self.value + 1 } else { 1 };
        self.deadline = match decay {
            ComboDecay::Window(window) => elapsed + window,
            ComboDecay::OnDamage => f32::INFINITY,
        };
        self.value
    }

    /// Player took damage: the streak dies, the multiplier returns to
    /// baseline immediately.
    pub fn register_damage(&mut self) {
        self.value = 1;
        self.deadline = f32::NEG_INFINITY;
    }

    /// Observe the clock; decays an expired streak back to baseline.
    pub fn observe(&mut self, elapsed: f32) {
        if elapsed > self.deadline {
            self.value = 1;
        }
    }
}
