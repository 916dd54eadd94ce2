//! A toy stacking game standing in for the real engine.
//!
//! The well is a single column of rows. Every fall step either settles a
//! block on top or clears a row; each fourth clear earns an attack. The
//! game ends when the stack reaches [`WELL_HEIGHT`].

use badge_core::{Duration, FrameBuffer, Instant};
use badge_versus::{GameEngine, GameState, Move};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Rows in the well. Doubles as the number of lit rows on the display.
pub const WELL_HEIGHT: u8 = 8;

const CLEARS_PER_ATTACK: u32 = 4;

pub struct ToyEngine {
    rng: SmallRng,
    state: GameState,
    height: u8,
    cleared: u32,
    score: u16,
    attacks: u8,
    fall_every: Duration,
}

impl ToyEngine {
    pub fn new(fall_every: Duration) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(0),
            state: GameState::Waiting,
            height: 0,
            cleared: 0,
            score: 0,
            attacks: 0,
            fall_every,
        }
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    fn raise(&mut self, rows: u8) {
        self.height = self.height.saturating_add(rows);
        if self.height >= WELL_HEIGHT {
            self.height = WELL_HEIGHT;
            self.state = GameState::GameOver;
        }
    }

    fn step(&mut self) {
        // a third of the pieces settle, the rest complete a row
        if self.rng.gen_ratio(1, 3) {
            self.raise(1);
            return;
        }
        self.cleared += 1;
        self.score = self.score.saturating_add(10);
        if self.cleared % CLEARS_PER_ATTACK == 0 {
            self.attacks = self.attacks.saturating_add(1);
        }
    }
}

impl GameEngine for ToyEngine {
    fn reset(&mut self, seed: u32) {
        *self = Self {
            rng: SmallRng::seed_from_u64(seed as u64),
            ..Self::new(self.fall_every)
        };
    }

    fn state(&self) -> GameState {
        self.state
    }

    fn start_playing(&mut self) {
        if self.state == GameState::Waiting {
            self.state = GameState::Playing;
        }
    }

    fn apply_move(&mut self, mv: Move) {
        if self.state != GameState::Playing {
            return;
        }
        if mv == Move::Drop {
            self.step();
        }
    }

    fn fall_if_due(&mut self, now: Instant, last_fall: Instant) -> bool {
        if self.state != GameState::Playing || !now.has_elapsed(last_fall, self.fall_every) {
            return false;
        }
        self.step();
        true
    }

    fn enemy_attack(&mut self, lines: u8) {
        if self.state == GameState::Playing {
            self.raise(lines);
        }
    }

    fn force_over(&mut self) {
        self.state = GameState::GameOver;
    }

    fn score(&self) -> u16 {
        self.score
    }

    fn take_attack(&mut self) -> Option<u8> {
        if self.attacks == 0 {
            return None;
        }
        Some(core::mem::take(&mut self.attacks))
    }

    fn draw(&self, frame: &mut FrameBuffer) {
        let column = (1u16 << self.height).wrapping_sub(1) as u8;
        frame.fill(column);
    }
}
