//! Deterministic shooter simulation
//!
//! The four arena variants share one state machine; per-variant behavior
//! lives entirely in the [`crate::tuning`] tables.

pub mod collision;
pub mod scoring;
pub mod state;
pub mod tick;

pub use scoring::Combo;
pub use state::{Hostile, HudSnapshot, InputState, Player, Projectile, ShooterSim};
pub use tick::TickStatus;
