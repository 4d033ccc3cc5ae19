//! Entities and session state for the shooter variants
//!
//! A `ShooterSim` owns all of its entities exclusively; nothing here is
//! shared across threads. The combat runtime copies `HudSnapshot` values out
//! instead of exposing the live containers.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::scoring::Combo;
use crate::session::{self, SessionResult};
use crate::stats::GameId;
use crate::tuning::{Arena, Tuning};

/// The player entity; exactly one exists while the session runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    /// Armor for the combat variant, lives/shields for the 2-D ones
    pub armor: u32,
}

/// A hostile entity
#[derive(Debug, Clone, PartialEq)]
pub struct Hostile {
    pub pos: Vec2,
    /// Collision radius (circle arenas) or half extent (band arenas)
    pub size: f32,
    /// Movement speed; direction depends on the variant's motion mode
    pub speed: f32,
    pub health: f32,
    pub attack: u32,
    pub bounty: u64,
    /// Sweep direction for invader-style motion, +1 or -1
    pub sweep_dir: f32,
    /// Index into the variant's archetype table, for palette lookup upstream
    pub archetype: usize,
}

/// A projectile in flight
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    pub age: f32,
    /// Hostile return fire damages the player instead of hostiles
    pub from_hostile: bool,
}

/// Snapshot of currently-pressed inputs for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub forward: bool,
    pub back: bool,
    pub fire: bool,
    /// Cooperative stop/abort request, observed once per tick
    pub stop: bool,
}

/// Scalar HUD state, cheap to copy across the runtime's thread boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HudSnapshot {
    pub game: GameId,
    pub score: u64,
    pub cleared: u64,
    pub level: u32,
    pub combo: u32,
    pub armor: u32,
    pub elapsed: f32,
    pub shots_fired: u32,
    pub hostiles_active: usize,
}

/// One shooter session: entities plus scalar progress state
///
/// Mutated only by its own `tick` and input methods; render layers read the
/// public entity collections or take a [`HudSnapshot`].
#[derive(Debug, Clone)]
pub struct ShooterSim {
    pub(super) tuning: &'static Tuning,
    pub player: Player,
    pub hostiles: Vec<Hostile>,
    pub projectiles: Vec<Projectile>,

    pub(super) score: u64,
    pub(super) cleared: u64,
    pub(super) level: u32,
    pub(super) combo: Combo,
    pub(super) elapsed: f32,
    pub(super) fire_cooldown: f32,
    pub(super) spawn_timer: f32,
    pub(super) shots_fired: u32,
    pub(super) hostiles_spawned: u32,
    pub(super) running: bool,

    pub(super) rng: Pcg32,
    session_id: u64,
    result: Option<SessionResult>,
}

impl ShooterSim {
    /// Create a session for a shooter variant. Returns `None` for
    /// [`GameId::FallingBlock`], which is driven by `board::BoardSim`.
    pub fn new(game: GameId, seed: u64) -> Option<Self> {
        let tuning = Tuning::for_game(game)?;
        let player_pos = match tuning.arena {
            Arena::Circle { .. } => Vec2::ZERO,
            Arena::Band {
                width,
                defense_line,
                ..
            } => Vec2::new(width / 2.0, defense_line),
        };
        log::info!("starting {:?} session (seed {seed})", game);
        Some(Self {
            tuning,
            player: Player {
                pos: player_pos,
                armor: tuning.max_armor,
            },
            hostiles: Vec::new(),
            projectiles: Vec::new(),
            score: 0,
            cleared: 0,
            level: 1,
            combo: Combo::default(),
            elapsed: 0.0,
            fire_cooldown: 0.0,
            spawn_timer: tuning.spawn_interval,
            shots_fired: 0,
            hostiles_spawned: 0,
            running: true,
            rng: Pcg32::seed_from_u64(seed),
            session_id: session::next_session_id(),
            result: None,
        })
    }

    pub fn game(&self) -> GameId {
        self.tuning.game
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn tuning(&self) -> &'static Tuning {
        self.tuning
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn cleared(&self) -> u64 {
        self.cleared
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn combo(&self) -> u32 {
        self.combo.value()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn shots_fired(&self) -> u32 {
        self.shots_fired
    }

    pub fn hostiles_spawned(&self) -> u32 {
        self.hostiles_spawned
    }

    /// Scalar state for HUDs and the cross-thread snapshot channel.
    pub fn snapshot(&self) -> HudSnapshot {
        HudSnapshot {
            game: self.tuning.game,
            score: self.score,
            cleared: self.cleared,
            level: self.level,
            combo: self.combo.value(),
            armor: self.player.armor,
            elapsed: self.elapsed,
            shots_fired: self.shots_fired,
            hostiles_active: self.hostiles.len(),
        }
    }

    /// Freeze the session into its one-and-only result record.
    ///
    /// Safe to call from both the game-over and window-closed paths; repeat
    /// calls return the already-frozen result unchanged.
    pub fn finish(&mut self, aborted: bool) -> SessionResult {
        if let Some(result) = &self.result {
            return result.clone();
        }
        self.running = false;
        let result = SessionResult {
            game: self.tuning.game,
            session_id: self.session_id,
            score: self.score,
            cleared: self.cleared,
            level: self.level,
            duration: f64::from(self.elapsed),
            armor: self.player.armor,
            aborted,
        };
        log::info!(
            "{:?} session over: score {} cleared {} level {} aborted {}",
            result.game,
            result.score,
            result.cleared,
            result.level,
            result.aborted
        );
        self.result = Some(result.clone());
        result
    }

    /// Spawn one hostile at the arena periphery (circle) or top edge (band),
    /// with per-spawn jitter on size and speed.
    pub(super) fn spawn_hostile(&mut self) {
        let t = self.tuning;
        let idx = self.rng.random_range(0..t.archetypes.len());
        let archetype = &t.archetypes[idx];
        let size = self.rng.random_range(t.size_jitter.0..=t.size_jitter.1);
        let jitter = if t.speed_jitter.1 > t.speed_jitter.0 {
            self.rng.random_range(t.speed_jitter.0..t.speed_jitter.1)
        } else {
            0.0
        };
        let speed = archetype.speed + jitter + t.speed_per_level * (self.level - 1) as f32;

        let pos = match t.arena {
            Arena::Circle { radius } => {
                let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
                let distance = self.rng.random_range(radius * 0.33..radius * 0.87);
                Vec2::new(angle.cos(), angle.sin()) * distance
            }
            Arena::Band { width, margin, .. } => {
                let x = self.rng.random_range(margin..width - margin);
                Vec2::new(x, -size * 2.0)
            }
        };

        self.hostiles.push(Hostile {
            pos,
            size,
            speed,
            health: archetype.health,
            attack: archetype.attack,
            bounty: archetype.bounty,
            sweep_dir: 1.0,
            archetype: idx,
        });
        self.hostiles_spawned += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_defaults() {
        let sim = ShooterSim::new(GameId::WaveShooterEp1, 42).unwrap();
        assert!(sim.is_running());
        assert_eq!(sim.score(), 0);
        assert_eq!(sim.level(), 1);
        assert_eq!(sim.combo(), 1);
        assert_eq!(sim.player.armor, 3);
        assert!(sim.hostiles.is_empty());
    }

    #[test]
    fn falling_block_has_no_shooter_sim() {
        assert!(ShooterSim::new(GameId::FallingBlock, 1).is_none());
    }

    #[test]
    fn finish_is_idempotent() {
        let mut sim = ShooterSim::new(GameId::Combat3d, 7).unwrap();
        let first = sim.finish(true);
        // A later "natural" finish must not overwrite the frozen record.
        let second = sim.finish(false);
        assert_eq!(first, second);
        assert!(second.aborted);
        assert!(!sim.is_running());
    }

    #[test]
    fn spawns_respect_arena_shape() {
        let mut sim = ShooterSim::new(GameId::Combat3d, 3).unwrap();
        for _ in 0..16 {
            sim.spawn_hostile();
        }
        for hostile in &sim.hostiles {
            assert!(hostile.pos.length() <= 30.0);
        }

        let mut sim = ShooterSim::new(GameId::WaveShooterEp1, 3).unwrap();
        for _ in 0..16 {
            sim.spawn_hostile();
        }
        for hostile in &sim.hostiles {
            assert!(hostile.pos.y < 0.0, "band spawns enter from above");
            assert!(hostile.pos.x >= 36.0 && hostile.pos.x <= 604.0);
        }
        assert_eq!(sim.hostiles_spawned(), 16);
    }

    #[test]
    fn identical_seeds_spawn_identically() {
        let mut a = ShooterSim::new(GameId::TopDownShooter, 99).unwrap();
        let mut b = ShooterSim::new(GameId::TopDownShooter, 99).unwrap();
        for _ in 0..8 {
            a.spawn_hostile();
            b.spawn_hostile();
        }
        assert_eq!(a.hostiles, b.hostiles);
    }
}
