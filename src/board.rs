//! Falling-block variant
//!
//! A 10x20 well with seven tetromino shapes. Gravity runs on a level-scaled
//! interval; line clears pay out of a fixed table multiplied by the level
//! reached after the clear.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::session::{self, SessionResult};
use crate::sim::scoring;
use crate::stats::GameId;
use crate::tuning::{BoardTuning, BOARD};

/// Cell offsets for one rotation state, relative to the piece origin
type Rotation = &'static [(i8, i8)];

pub struct PieceShape {
    pub name: &'static str,
    pub rotations: &'static [Rotation],
}

pub static PIECES: [PieceShape; 7] = [
    PieceShape {
        name: "Cube",
        rotations: &[&[(0, 0), (1, 0), (0, 1), (1, 1)]],
    },
    PieceShape {
        name: "Line",
        rotations: &[
            &[(-1, 0), (0, 0), (1, 0), (2, 0)],
            &[(0, -1), (0, 0), (0, 1), (0, 2)],
        ],
    },
    PieceShape {
        name: "L",
        rotations: &[
            &[(0, -1), (0, 0), (0, 1), (1, 1)],
            &[(-1, 0), (0, 0), (1, 0), (-1, 1)],
            &[(0, -1), (1, -1), (0, 0), (0, 1)],
            &[(1, 0), (-1, 0), (0, 0), (1, -1)],
        ],
    },
    PieceShape {
        name: "J",
        rotations: &[
            &[(0, -1), (0, 0), (0, 1), (-1, 1)],
            &[(-1, 0), (-1, -1), (0, 0), (1, 0)],
            &[(0, -1), (1, -1), (0, 0), (0, 1)],
            &[(-1, 0), (0, 0), (1, 0), (1, 1)],
        ],
    },
    PieceShape {
        name: "T",
        rotations: &[
            &[(0, 0), (1, 0), (0, 1), (-1, 0)],
            &[(0, -1), (0, 0), (0, 1), (1, 0)],
            &[(0, 0), (1, 0), (0, -1), (-1, 0)],
            &[(0, -1), (0, 0), (0, 1), (-1, 0)],
        ],
    },
    PieceShape {
        name: "S",
        rotations: &[
            &[(0, 0), (1, 0), (0, 1), (-1, 1)],
            &[(0, -1), (0, 0), (1, 0), (1, 1)],
        ],
    },
    PieceShape {
        name: "Z",
        rotations: &[
            &[(0, 0), (-1, 0), (0, 1), (1, 1)],
            &[(1, -1), (1, 0), (0, 0), (0, 1)],
        ],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: usize,
    pub rotation: usize,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        PIECES[self.kind].rotations[self.rotation]
            .iter()
            .map(|&(dx, dy)| (self.x + i32::from(dx), self.y + i32::from(dy)))
    }
}

/// Outcome of advancing the board by one gravity-or-command step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardStatus {
    Running,
    Over,
}

/// One falling-block session.
///
/// Gravity is driven by [`BoardSim::advance`]; player commands are the
/// explicit `shift`, `rotate`, `soft_drop`, and `hard_drop` calls. All of
/// them are no-ops once the session has ended.
pub struct BoardSim {
    tuning: &'static BoardTuning,
    /// Row-major, row 0 is the top; a cell holds the piece kind that filled it
    grid: Vec<Vec<Option<u8>>>,
    current: Piece,
    next: Piece,
    score: u64,
    lines: u64,
    level: u32,
    elapsed: f32,
    gravity_timer: f32,
    running: bool,
    rng: Pcg32,
    session_id: u64,
    result: Option<SessionResult>,
}

impl BoardSim {
    pub fn new(seed: u64) -> Self {
        let tuning = &BOARD;
        let mut rng = Pcg32::seed_from_u64(seed);
        let current = spawn_piece(&mut rng, tuning);
        let next = spawn_piece(&mut rng, tuning);
        Self {
            tuning,
            grid: vec![vec![None; tuning.cols]; tuning.rows],
            current,
            next,
            score: 0,
            lines: 0,
            level: 1,
            elapsed: 0.0,
            gravity_timer: 0.0,
            running: true,
            rng,
            session_id: session::next_session_id(),
            result: None,
        }
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current(&self) -> &Piece {
        &self.current
    }

    pub fn next(&self) -> &Piece {
        &self.next
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<u8> {
        self.grid[y][x]
    }

    /// Gravity interval at the current level, seconds
    pub fn drop_interval(&self) -> f32 {
        let t = self.tuning;
        let reduced = t
            .base_drop_ms
            .saturating_sub(t.level_drop_delta_ms * (self.level - 1));
        reduced.max(t.min_drop_ms) as f32 / 1000.0
    }

    /// Advance wall time; applies as many gravity steps as `dt` covers.
    pub fn advance(&mut self, dt: f32) -> BoardStatus {
        if !self.running {
            return BoardStatus::Over;
        }
        self.elapsed += dt;
        self.gravity_timer += dt;
        while self.running && self.gravity_timer >= self.drop_interval() {
            self.gravity_timer -= self.drop_interval();
            self.step();
        }
        if self.running {
            BoardStatus::Running
        } else {
            BoardStatus::Over
        }
    }

    /// Move the active piece horizontally if the target cells are free.
    pub fn shift(&mut self, dx: i32) {
        if !self.running {
            return;
        }
        let mut moved = self.current;
        moved.x += dx;
        if self.fits(&moved) {
            self.current = moved;
        }
    }

    /// Rotate clockwise; blocked rotations leave the piece unchanged.
    pub fn rotate(&mut self) {
        if !self.running {
            return;
        }
        let mut rotated = self.current;
        rotated.rotation = (rotated.rotation + 1) % PIECES[rotated.kind].rotations.len();
        if self.fits(&rotated) {
            self.current = clamp_to_well(rotated, self.tuning);
        }
    }

    /// Drop one row under player control, worth a small bonus per cell.
    pub fn soft_drop(&mut self) {
        if !self.running {
            return;
        }
        let mut dropped = self.current;
        dropped.y += 1;
        if self.fits(&dropped) {
            self.current = dropped;
            self.score += self.tuning.soft_drop_bonus;
        } else {
            self.step();
        }
    }

    /// Drop to the resting position and lock immediately.
    pub fn hard_drop(&mut self) {
        if !self.running {
            return;
        }
        let mut distance = 0u64;
        loop {
            let mut dropped = self.current;
            dropped.y += 1;
            if !self.fits(&dropped) {
                break;
            }
            self.current = dropped;
            distance += 1;
        }
        self.score += self.tuning.hard_drop_bonus * distance;
        self.step();
    }

    /// Freeze the session and build its result. Idempotent: repeated calls
    /// return the result captured by the first.
    pub fn finish(&mut self, aborted: bool) -> SessionResult {
        if let Some(result) = &self.result {
            return result.clone();
        }
        self.running = false;
        let result = SessionResult {
            game: GameId::FallingBlock,
            session_id: self.session_id,
            score: self.score,
            cleared: self.lines,
            level: self.level,
            duration: f64::from(self.elapsed.max(0.0)),
            armor: 0,
            aborted,
        };
        log::info!(
            "board session {} over: score={} lines={} level={} aborted={}",
            self.session_id,
            result.score,
            result.cleared,
            result.level,
            aborted
        );
        self.result = Some(result.clone());
        result
    }

    /// One gravity step: descend, or lock + clear + respawn.
    fn step(&mut self) {
        let mut dropped = self.current;
        dropped.y += 1;
        if self.fits(&dropped) {
            self.current = dropped;
            return;
        }
        self.lock_current();
        self.clear_lines();
        self.current = self.next;
        self.next = spawn_piece(&mut self.rng, self.tuning);
        let respawned = self.current;
        if !self.fits(&respawned) {
            // Topped out: the fresh piece has nowhere to spawn.
            self.finish(false);
        }
    }

    fn lock_current(&mut self) {
        let kind = self.current.kind as u8;
        let cells: Vec<_> = self.current.cells().collect();
        for (x, y) in cells {
            if (0..self.tuning.cols as i32).contains(&x) && (0..self.tuning.rows as i32).contains(&y)
            {
                self.grid[y as usize][x as usize] = Some(kind);
            }
        }
        self.score += self.tuning.lock_bonus;
    }

    fn clear_lines(&mut self) {
        let t = self.tuning;
        self.grid.retain(|row| row.iter().any(Option::is_none));
        let cleared = t.rows - self.grid.len();
        if cleared == 0 {
            return;
        }
        for _ in 0..cleared {
            self.grid.insert(0, vec![None; t.cols]);
        }
        self.lines += cleared as u64;
        // Level first, then payout: a clear that crosses a level boundary
        // pays at the new level.
        self.level = 1 + (self.lines / u64::from(t.lines_per_level)) as u32;
        self.score += scoring::line_clear_score(cleared, self.level);
    }

    /// Whether every cell of `piece` is inside the well and unoccupied.
    /// Cells above the top edge are allowed; pieces spawn partially hidden.
    fn fits(&self, piece: &Piece) -> bool {
        for (x, y) in piece.cells() {
            if x < 0 || x >= self.tuning.cols as i32 || y >= self.tuning.rows as i32 {
                return false;
            }
            if y >= 0 && self.grid[y as usize][x as usize].is_some() {
                return false;
            }
        }
        true
    }
}

fn spawn_piece(rng: &mut Pcg32, tuning: &BoardTuning) -> Piece {
    let piece = Piece {
        kind: rng.random_range(0..PIECES.len()),
        rotation: 0,
        x: tuning.cols as i32 / 2 - 2,
        y: 0,
    };
    clamp_to_well(piece, tuning)
}

/// Shift a piece back inside the well horizontally after spawn or rotation.
fn clamp_to_well(mut piece: Piece, tuning: &BoardTuning) -> Piece {
    let coords = PIECES[piece.kind].rotations[piece.rotation];
    let min_x = coords.iter().map(|&(x, _)| i32::from(x)).min().unwrap_or(0);
    let max_x = coords.iter().map(|&(x, _)| i32::from(x)).max().unwrap_or(0);
    if piece.x + min_x < 0 {
        piece.x -= piece.x + min_x;
    }
    if piece.x + max_x >= tuning.cols as i32 {
        piece.x -= piece.x + max_x - (tuning.cols as i32 - 1);
    }
    piece
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: usize = 1;

    fn sim() -> BoardSim {
        BoardSim::new(7)
    }

    /// Pin the active piece to a known shape and position.
    fn set_piece(sim: &mut BoardSim, kind: usize, rotation: usize, x: i32, y: i32) {
        sim.current = Piece {
            kind,
            rotation,
            x,
            y,
        };
    }

    #[test]
    fn spawned_pieces_fit_the_well() {
        for seed in 0..32 {
            let sim = BoardSim::new(seed);
            assert!(sim.fits(sim.current()), "seed {seed}");
            for (x, _) in sim.current().cells() {
                assert!((0..10).contains(&x));
            }
        }
    }

    #[test]
    fn identical_seeds_give_identical_piece_sequences() {
        let a = BoardSim::new(99);
        let b = BoardSim::new(99);
        assert_eq!(a.current(), b.current());
        assert_eq!(a.next(), b.next());
    }

    #[test]
    fn gravity_interval_shrinks_with_level_to_a_floor() {
        let mut sim = sim();
        assert_eq!(sim.drop_interval(), 0.9);
        sim.level = 5;
        assert_eq!(sim.drop_interval(), 0.66);
        sim.level = 100;
        assert_eq!(sim.drop_interval(), 0.12);
    }

    #[test]
    fn advance_applies_gravity_steps() {
        let mut sim = sim();
        let y = sim.current().y;
        sim.advance(0.91);
        assert_eq!(sim.current().y, y + 1);
    }

    #[test]
    fn shift_is_blocked_at_the_wall() {
        let mut sim = sim();
        set_piece(&mut sim, 0, 0, 0, 5);
        sim.shift(-1);
        assert_eq!(sim.current().x, 0);
        sim.shift(1);
        assert_eq!(sim.current().x, 1);
    }

    #[test]
    fn blocked_rotation_leaves_the_piece_unchanged() {
        let mut sim = sim();
        // Vertical line hugging the floor; the horizontal rotation would
        // collide with filled neighbors.
        for x in 0..10 {
            if x != 4 {
                sim.grid[16][x] = Some(0);
            }
        }
        set_piece(&mut sim, LINE, 1, 4, 16);
        sim.rotate();
        assert_eq!(sim.current().rotation, 1);
    }

    #[test]
    fn soft_drop_scores_per_cell() {
        let mut sim = sim();
        set_piece(&mut sim, 0, 0, 4, 0);
        sim.soft_drop();
        assert_eq!(sim.score(), 1);
    }

    #[test]
    fn hard_drop_locks_and_pays_distance() {
        let mut sim = sim();
        set_piece(&mut sim, 0, 0, 4, 0);
        sim.hard_drop();
        // Cube resting on the floor occupies rows 18 and 19.
        assert_eq!(sim.cell(4, 18), Some(0));
        assert_eq!(sim.cell(5, 19), Some(0));
        // 18 cells of travel plus the lock bonus.
        assert_eq!(sim.score(), 18 * 2 + 10);
    }

    #[test]
    fn single_line_clear_pays_from_the_table() {
        let mut sim = sim();
        for x in 1..10 {
            sim.grid[19][x] = Some(0);
        }
        // Vertical line dropped into the remaining gap at column 0.
        set_piece(&mut sim, LINE, 1, 0, 0);
        sim.hard_drop();
        assert_eq!(sim.lines(), 1);
        assert_eq!(sim.level(), 1);
        // Rows above the cleared one stay put.
        assert_eq!(sim.cell(0, 19), Some(LINE as u8));
        assert!(sim.score() >= 100, "table payout included, got {}", sim.score());
    }

    #[test]
    fn quad_clear_pays_the_top_of_the_table() {
        let mut sim = sim();
        for y in 16..20 {
            for x in 1..10 {
                sim.grid[y][x] = Some(0);
            }
        }
        set_piece(&mut sim, LINE, 1, 0, 14);
        sim.hard_drop();
        assert_eq!(sim.lines(), 4);
        // 3 cells of hard drop + lock + 1500 * level 1
        assert_eq!(sim.score(), 3 * 2 + 10 + 1500);
        assert!(sim.grid[16..20].iter().all(|row| row[1].is_none()));
    }

    #[test]
    fn level_follows_cleared_lines() {
        let mut sim = sim();
        sim.lines = 7;
        for x in 1..10 {
            sim.grid[19][x] = Some(0);
        }
        set_piece(&mut sim, LINE, 1, 0, 0);
        sim.hard_drop();
        assert_eq!(sim.lines(), 8);
        assert_eq!(sim.level(), 2);
    }

    #[test]
    fn topping_out_ends_the_session() {
        let mut sim = sim();
        // Fill everything below the top row, leaving column 0 open so the
        // lock produces no clears, and let the respawn collide.
        for y in 1..20 {
            for x in 1..10 {
                sim.grid[y][x] = Some(0);
            }
        }
        set_piece(&mut sim, 0, 0, 4, 0);
        sim.hard_drop();
        assert!(!sim.is_running());
        let result = sim.finish(false);
        assert_eq!(result.game, GameId::FallingBlock);
        assert_eq!(result.armor, 0);
        assert!(!result.aborted);
    }

    #[test]
    fn finish_is_idempotent() {
        let mut sim = sim();
        let first = sim.finish(true);
        sim.score = 999_999;
        let second = sim.finish(false);
        assert_eq!(first, second);
    }

    #[test]
    fn commands_are_noops_after_finish() {
        let mut sim = sim();
        sim.finish(true);
        let piece = *sim.current();
        sim.shift(1);
        sim.rotate();
        sim.soft_drop();
        sim.hard_drop();
        assert_eq!(*sim.current(), piece);
        assert_eq!(sim.advance(5.0), BoardStatus::Over);
    }
}
