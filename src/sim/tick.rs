//! Fixed-tick advance for the shooter variants
//!
//! One generic loop covers homing, descent, and sweep hostiles; everything
//! variant-specific comes from the `Tuning` table. Order inside a tick
//! matters: scoring effects land before the terminal check so a kill in the
//! dying tick still counts.

use glam::Vec2;
use rand::Rng;

use super::collision::{aabbs_overlap, circles_overlap, inside_band, inside_circle};
use super::scoring;
use super::state::{InputState, Projectile, ShooterSim};
use crate::consts::MAX_TICK_DT;
use crate::tuning::{Arena, HostileMotion};

/// Outcome of advancing the simulation by one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    Running,
    /// Terminal: the final state is frozen and further ticks are no-ops
    Over,
}

impl ShooterSim {
    /// Advance the session by `dt` seconds of input-driven simulation.
    ///
    /// Termination (armor exhausted) is evaluated once, after all state
    /// mutation; an externally requested stop is observed at the top of the
    /// tick and freezes the state as aborted.
    pub fn tick(&mut self, input: &InputState, dt: f32) -> TickStatus {
        if !self.running {
            return TickStatus::Over;
        }
        if input.stop {
            self.finish(true);
            return TickStatus::Over;
        }

        let dt = dt.clamp(0.0, MAX_TICK_DT);
        self.elapsed += dt;
        self.combo.observe(self.elapsed);

        self.update_player(input, dt);
        self.update_fire(input);
        self.update_projectiles(dt);
        self.update_hostiles(dt);
        self.resolve_projectile_hits();
        self.resolve_player_contacts();
        self.update_hostile_fire(dt);
        self.update_spawning(dt);

        if self.player.armor == 0 {
            self.finish(false);
            return TickStatus::Over;
        }
        TickStatus::Running
    }

    fn update_player(&mut self, input: &InputState, dt: f32) {
        let t = self.tuning;
        if self.fire_cooldown > 0.0 {
            self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);
        }

        let mut dir = Vec2::new(
            (input.right as i8 - input.left as i8) as f32,
            (input.forward as i8 - input.back as i8) as f32,
        );
        if matches!(t.arena, Arena::Band { .. }) {
            // Band variants strafe only; vertical input is ignored.
            dir.y = 0.0;
        }
        if dir == Vec2::ZERO {
            return;
        }

        let candidate = self.player.pos + dir.normalize() * t.player_speed * dt;
        let allowed = match t.arena {
            Arena::Circle { radius } => inside_circle(candidate, radius),
            Arena::Band { width, margin, .. } => inside_band(candidate.x, margin, width),
        };
        // Containment is checked before committing; an out-of-bounds
        // candidate leaves the position untouched.
        if allowed {
            self.player.pos = candidate;
        }
    }

    fn update_fire(&mut self, input: &InputState) {
        let t = self.tuning;
        if !input.fire || self.fire_cooldown > 0.0 {
            return;
        }
        let dir = if t.fire_spread > 0.0 {
            let jitter = self.rng.random_range(-t.fire_spread..=t.fire_spread);
            Vec2::from_angle(jitter).rotate(t.fire_dir)
        } else {
            t.fire_dir
        };
        self.projectiles.push(Projectile {
            pos: self.player.pos + t.fire_dir * t.player_half.y,
            vel: dir * t.projectile_speed,
            damage: t.projectile_damage,
            age: 0.0,
            from_hostile: false,
        });
        self.shots_fired += 1;
        self.fire_cooldown = t.fire_cooldown;
    }

    fn update_projectiles(&mut self, dt: f32) {
        let t = self.tuning;
        for projectile in &mut self.projectiles {
            projectile.pos += projectile.vel * dt;
            projectile.age += dt;
        }
        self.projectiles.retain(|p| {
            if p.age > t.projectile_lifetime {
                return false;
            }
            match t.arena {
                Arena::Circle { radius } => p.pos.length_squared() <= (radius * 1.2).powi(2),
                Arena::Band { defense_line, .. } => {
                    p.pos.y > -60.0 && p.pos.y < defense_line + 60.0
                }
            }
        });
    }

    fn update_hostiles(&mut self, dt: f32) {
        let t = self.tuning;
        match t.hostile_motion {
            HostileMotion::Homing => {
                let target = self.player.pos;
                for hostile in &mut self.hostiles {
                    let dir = (target - hostile.pos).normalize_or_zero();
                    hostile.pos += dir * hostile.speed * dt;
                }
            }
            HostileMotion::Descent => {
                for hostile in &mut self.hostiles {
                    hostile.pos.y += hostile.speed * dt;
                }
            }
            HostileMotion::Sweep => {
                let Arena::Band { width, margin, .. } = t.arena else {
                    return;
                };
                for hostile in &mut self.hostiles {
                    hostile.pos.x += hostile.sweep_dir * hostile.speed * dt;
                    if hostile.pos.x - hostile.size < margin {
                        hostile.pos.x = margin + hostile.size;
                        hostile.sweep_dir = 1.0;
                        hostile.pos.y += t.descent_step;
                    } else if hostile.pos.x + hostile.size > width - margin {
                        hostile.pos.x = width - margin - hostile.size;
                        hostile.sweep_dir = -1.0;
                        hostile.pos.y += t.descent_step;
                    }
                }
            }
        }
    }

    /// Resolve player projectiles against hostiles: the first hostile in
    /// iteration order takes the hit, and exactly one projectile and one
    /// hostile are consumed per collision pair.
    fn resolve_projectile_hits(&mut self) {
        let t = self.tuning;
        let circular = matches!(t.arena, Arena::Circle { .. });
        let mut i = 0;
        while i < self.projectiles.len() {
            if self.projectiles[i].from_hostile {
                i += 1;
                continue;
            }
            let pos = self.projectiles[i].pos;
            let damage = self.projectiles[i].damage;
            let hit = self.hostiles.iter().position(|h| {
                if circular {
                    circles_overlap(pos, t.projectile_half.x, h.pos, h.size)
                } else {
                    aabbs_overlap(pos, t.projectile_half, h.pos, Vec2::splat(h.size))
                }
            });
            match hit {
                Some(idx) => {
                    self.projectiles.swap_remove(i);
                    self.hostiles[idx].health -= damage;
                    if self.hostiles[idx].health <= 0.0 {
                        let bounty = self.hostiles[idx].bounty;
                        self.hostiles.swap_remove(idx);
                        self.register_kill(bounty);
                    }
                    // swap_remove moved a new projectile into slot i
                }
                None => i += 1,
            }
        }
    }

    fn register_kill(&mut self, bounty: u64) {
        let t = self.tuning;
        self.cleared += 1;
        self.level = scoring::threat_level(self.cleared, t.kills_per_level);
        let combo = self.combo.register_kill(self.elapsed, t.combo_decay);
        self.score += scoring::kill_score(bounty, t.score_scale, self.level, combo);
    }

    fn resolve_player_contacts(&mut self) {
        let t = self.tuning;
        let player_pos = self.player.pos;

        let mut damage_taken = 0u32;
        self.hostiles.retain(|h| {
            let strikes = match t.arena {
                Arena::Circle { .. } => {
                    circles_overlap(h.pos, h.size, player_pos, t.contact_radius)
                }
                Arena::Band { defense_line, .. } => h.pos.y + h.size >= defense_line,
            };
            if strikes {
                damage_taken += h.attack;
            }
            !strikes
        });

        // Hostile return fire against the player's hit box.
        let player_half = t.player_half;
        self.projectiles.retain(|p| {
            if !p.from_hostile {
                return true;
            }
            let hits = aabbs_overlap(p.pos, t.projectile_half, player_pos, player_half);
            if hits {
                damage_taken += (p.damage as u32).max(1);
            }
            !hits
        });

        if damage_taken > 0 {
            self.player.armor = self.player.armor.saturating_sub(damage_taken);
            self.combo.register_damage();
        }
    }

    fn update_hostile_fire(&mut self, dt: f32) {
        let Some(hf) = &self.tuning.hostile_fire else {
            return;
        };
        if self.hostiles.is_empty() {
            return;
        }
        let rate = (hf.base_rate + hf.rate_per_level * (self.level - 1) as f32).min(hf.max_rate);
        if self.rng.random::<f32>() < rate * dt {
            let idx = self.rng.random_range(0..self.hostiles.len());
            let shooter = &self.hostiles[idx];
            self.projectiles.push(Projectile {
                pos: shooter.pos + Vec2::new(0.0, shooter.size),
                vel: Vec2::new(0.0, hf.projectile_speed),
                damage: 1.0,
                age: 0.0,
                from_hostile: true,
            });
        }
    }

    fn update_spawning(&mut self, dt: f32) {
        self.spawn_timer -= dt;
        if self.spawn_timer > 0.0 {
            return;
        }
        if self.hostiles.len() < self.tuning.max_hostiles {
            self.spawn_hostile();
        }
        self.spawn_timer = scoring::spawn_interval(self.tuning, self.level);
    }
}
