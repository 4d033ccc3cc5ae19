//! Data-driven game balance
//!
//! All numeric tuning for the shooter variants lives here so that the engine
//! in `sim` stays generic; a new variant is a new `Tuning` table, not new
//! control flow. The falling-block game has its own, much smaller table.

use glam::Vec2;

use crate::stats::GameId;

/// Playfield shape and bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arena {
    /// Circular arena centered on the origin (combat variant)
    Circle { radius: f32 },
    /// Horizontal band: the player moves along x within `[margin, width - margin]`,
    /// hostiles descend toward `defense_line`
    Band {
        width: f32,
        margin: f32,
        defense_line: f32,
    },
}

/// How hostiles move once spawned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostileMotion {
    /// Steer toward the player's current position every tick
    Homing,
    /// Constant per-spawn downward speed
    Descent,
    /// Horizontal sweep, reversing and stepping down at arena edges
    Sweep,
}

/// When an unbroken kill streak lapses back to baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComboDecay {
    /// Fixed window in seconds since the last kill
    Window(f32),
    /// Streak survives until the player takes damage
    OnDamage,
}

/// One hostile archetype; spawns pick uniformly from the variant's table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Archetype {
    pub name: &'static str,
    pub health: f32,
    pub speed: f32,
    /// Armor removed on contact with the player
    pub attack: u32,
    /// Base score for destroying this archetype
    pub bounty: u64,
}

/// Return-fire behavior for variants whose hostiles shoot back
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostileFire {
    /// Shots per second across the whole formation at level 1
    pub base_rate: f32,
    pub rate_per_level: f32,
    pub max_rate: f32,
    pub projectile_speed: f32,
}

/// Complete balance table for one shooter variant
#[derive(Debug, Clone, PartialEq)]
pub struct Tuning {
    pub game: GameId,
    pub arena: Arena,
    pub player_speed: f32,
    /// Half extents of the player hit box (band arenas)
    pub player_half: Vec2,
    /// Contact distance for hostile-vs-player hits (circle arenas)
    pub contact_radius: f32,
    pub max_armor: u32,

    pub fire_cooldown: f32,
    pub projectile_speed: f32,
    pub projectile_damage: f32,
    pub projectile_lifetime: f32,
    /// Half extents of a projectile (band) or its radius in x (circle)
    pub projectile_half: Vec2,
    /// Unit direction projectiles leave the player in
    pub fire_dir: Vec2,
    /// Random angular jitter applied to `fire_dir`, radians
    pub fire_spread: f32,

    pub hostile_motion: HostileMotion,
    pub archetypes: &'static [Archetype],
    /// Per-spawn hostile radius band (collision and render size)
    pub size_jitter: (f32, f32),
    /// Additive per-spawn speed jitter on top of the archetype speed
    pub speed_jitter: (f32, f32),
    /// Extra hostile speed per threat level
    pub speed_per_level: f32,
    /// Downward step taken when a sweeping formation reverses at an edge
    pub descent_step: f32,
    pub hostile_fire: Option<HostileFire>,

    pub spawn_interval: f32,
    /// Seconds shaved off the spawn interval per threat level
    pub spawn_step: f32,
    pub min_spawn_interval: f32,
    pub max_hostiles: usize,

    /// Kills required to raise the threat level by one
    pub kills_per_level: u32,
    /// Kill score is `bounty + score_scale * level * combo`
    pub score_scale: u64,
    pub combo_decay: ComboDecay,
}

static COMBAT_ARCHETYPES: [Archetype; 4] = [
    Archetype {
        name: "Imp",
        health: 40.0,
        speed: 12.0,
        attack: 1,
        bounty: 80,
    },
    Archetype {
        name: "Possessed Soldier",
        health: 60.0,
        speed: 9.0,
        attack: 1,
        bounty: 120,
    },
    Archetype {
        name: "Hell Knight",
        health: 180.0,
        speed: 7.5,
        attack: 2,
        bounty: 260,
    },
    Archetype {
        name: "Revenant",
        health: 110.0,
        speed: 10.5,
        attack: 2,
        bounty: 220,
    },
];

static SWEEPER_ARCHETYPES: [Archetype; 1] = [Archetype {
    name: "Invader",
    health: 1.0,
    speed: 80.0,
    attack: 3,
    bounty: 50,
}];

const WAVE_ARCHETYPES: [Archetype; 1] = [Archetype {
    name: "Hellspawn",
    health: 1.0,
    speed: 63.0,
    attack: 1,
    bounty: 120,
}];

static COMBAT_3D: Tuning = Tuning {
    game: GameId::Combat3d,
    arena: Arena::Circle { radius: 30.0 },
    player_speed: 18.0,
    player_half: Vec2::new(0.9, 0.9),
    contact_radius: 1.8,
    max_armor: 3,
    fire_cooldown: 0.45,
    projectile_speed: 68.0,
    projectile_damage: 28.0,
    projectile_lifetime: 4.0,
    projectile_half: Vec2::new(0.4, 0.4),
    fire_dir: Vec2::new(0.0, 1.0),
    fire_spread: 0.12,
    hostile_motion: HostileMotion::Homing,
    archetypes: &COMBAT_ARCHETYPES,
    size_jitter: (1.4, 2.6),
    speed_jitter: (0.0, 0.0),
    speed_per_level: 0.0,
    descent_step: 0.0,
    hostile_fire: None,
    spawn_interval: 2.5,
    spawn_step: 0.26,
    min_spawn_interval: 0.6,
    max_hostiles: 8,
    kills_per_level: 6,
    score_scale: 15,
    combo_decay: ComboDecay::OnDamage,
};

static TOP_DOWN: Tuning = Tuning {
    game: GameId::TopDownShooter,
    arena: Arena::Band {
        width: 640.0,
        margin: 40.0,
        defense_line: 440.0,
    },
    player_speed: 466.0,
    player_half: Vec2::new(30.0, 16.0),
    contact_radius: 0.0,
    max_armor: 3,
    fire_cooldown: 0.12,
    projectile_speed: 533.0,
    projectile_damage: 1.0,
    projectile_lifetime: 2.0,
    projectile_half: Vec2::new(4.0, 8.0),
    fire_dir: Vec2::new(0.0, -1.0),
    fire_spread: 0.0,
    hostile_motion: HostileMotion::Sweep,
    archetypes: &SWEEPER_ARCHETYPES,
    size_jitter: (15.0, 20.0),
    speed_jitter: (0.0, 12.0),
    speed_per_level: 11.0,
    descent_step: 24.0,
    hostile_fire: Some(HostileFire {
        base_rate: 2.0,
        rate_per_level: 0.33,
        max_rate: 6.0,
        projectile_speed: 320.0,
    }),
    spawn_interval: 1.3,
    spawn_step: 0.1,
    min_spawn_interval: 0.4,
    max_hostiles: 32,
    kills_per_level: 8,
    score_scale: 20,
    combo_decay: ComboDecay::Window(2.0),
};

static WAVE_EP1: Tuning = wave_episode(GameId::WaveShooterEp1);
// Episode II shares Episode I's balance; only the identity (and, upstream,
// the palette) differs.
static WAVE_EP2: Tuning = wave_episode(GameId::WaveShooterEp2);

const fn wave_episode(game: GameId) -> Tuning {
    Tuning {
        game,
        arena: Arena::Band {
            width: 640.0,
            margin: 36.0,
            defense_line: 360.0,
        },
        player_speed: 333.0,
        player_half: Vec2::new(24.0, 18.0),
        contact_radius: 0.0,
        max_armor: 3,
        fire_cooldown: 0.32,
        projectile_speed: 533.0,
        projectile_damage: 1.0,
        projectile_lifetime: 1.5,
        projectile_half: Vec2::new(3.0, 9.0),
        fire_dir: Vec2::new(0.0, -1.0),
        fire_spread: 0.0,
        hostile_motion: HostileMotion::Descent,
        archetypes: &WAVE_ARCHETYPES,
        size_jitter: (12.0, 24.0),
        speed_jitter: (0.0, 30.0),
        speed_per_level: 6.0,
        descent_step: 0.0,
        hostile_fire: None,
        spawn_interval: 1.1,
        spawn_step: 0.075,
        min_spawn_interval: 0.32,
        max_hostiles: 24,
        kills_per_level: 8,
        score_scale: 10,
        combo_decay: ComboDecay::Window(2.2),
    }
}

impl Tuning {
    /// Balance table for a shooter variant; `None` for the falling-block game,
    /// which is driven by [`BoardTuning`] instead.
    pub fn for_game(game: GameId) -> Option<&'static Tuning> {
        match game {
            GameId::FallingBlock => None,
            GameId::TopDownShooter => Some(&TOP_DOWN),
            GameId::Combat3d => Some(&COMBAT_3D),
            GameId::WaveShooterEp1 => Some(&WAVE_EP1),
            GameId::WaveShooterEp2 => Some(&WAVE_EP2),
        }
    }
}

/// Secondary-metric value reported when a session ends before any snapshot
/// exists: full armor for the shooters, zero for the board game.
pub fn default_armor(game: GameId) -> u32 {
    match Tuning::for_game(game) {
        Some(t) => t.max_armor,
        None => 0,
    }
}

/// Balance for the falling-block variant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoardTuning {
    pub cols: usize,
    pub rows: usize,
    /// Gravity interval at level 1, milliseconds
    pub base_drop_ms: u32,
    /// Milliseconds removed from the gravity interval per level
    pub level_drop_delta_ms: u32,
    pub min_drop_ms: u32,
    pub lines_per_level: u32,
    pub lock_bonus: u64,
    pub soft_drop_bonus: u64,
    /// Per cell of hard-drop distance
    pub hard_drop_bonus: u64,
}

pub static BOARD: BoardTuning = BoardTuning {
    cols: 10,
    rows: 20,
    base_drop_ms: 900,
    level_drop_delta_ms: 60,
    min_drop_ms: 120,
    lines_per_level: 8,
    lock_bonus: 10,
    soft_drop_bonus: 1,
    hard_drop_bonus: 2,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_shooter_has_a_table() {
        for game in GameId::ALL {
            match game {
                GameId::FallingBlock => assert!(Tuning::for_game(game).is_none()),
                _ => {
                    let t = Tuning::for_game(game).expect("shooter tuning");
                    assert!(t.min_spawn_interval > 0.0);
                    assert!(t.min_spawn_interval <= t.spawn_interval);
                    assert!(!t.archetypes.is_empty());
                    assert!(t.max_armor > 0);
                }
            }
        }
    }

    #[test]
    fn episode_two_shares_episode_one_balance() {
        let ep1 = Tuning::for_game(GameId::WaveShooterEp1).unwrap();
        let ep2 = Tuning::for_game(GameId::WaveShooterEp2).unwrap();
        assert_eq!(ep2.game, GameId::WaveShooterEp2);
        assert_eq!(ep1.spawn_interval, ep2.spawn_interval);
        assert_eq!(ep1.score_scale, ep2.score_scale);
        assert_eq!(ep1.arena, ep2.arena);
    }

    #[test]
    fn default_armor_per_variant() {
        assert_eq!(default_armor(GameId::FallingBlock), 0);
        assert_eq!(default_armor(GameId::Combat3d), 3);
    }
}
