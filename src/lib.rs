//! Arcade Lab - the launcher's built-in mini-game core
//!
//! Core modules:
//! - `sim`: Deterministic fixed-tick shooter simulation (three arena variants)
//! - `board`: Falling-block puzzle variant
//! - `tuning`: Data-driven balance tables, one per variant
//! - `session`: Session results and identity
//! - `achievements`: Static catalog, per-game stats, unlock tracking
//! - `persistence`: Best-effort JSON storage for the stats map
//! - `runtime`: Background-thread driver for the arena combat variant

pub mod achievements;
pub mod board;
pub mod persistence;
pub mod runtime;
pub mod session;
pub mod sim;
pub mod stats;
pub mod tuning;

pub use achievements::{Achievement, AchievementTracker, Condition};
pub use board::{BoardSim, BoardStatus};
pub use runtime::CombatRuntime;
pub use session::SessionResult;
pub use sim::{HudSnapshot, InputState, ShooterSim, TickStatus};
pub use stats::{GameId, GameStats};

/// Engine timing constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest step a single tick will integrate; callers passing more are
    /// clamped rather than allowed to tunnel through collisions
    pub const MAX_TICK_DT: f32 = 0.25;
    /// Minimum interval between HUD snapshot publications, seconds
    pub const SNAPSHOT_INTERVAL: f32 = 0.1;
}
