//! The game played over the link
//!
//! Game rules live outside the runtime. The versus application only needs
//! the small surface below from whatever engine it drives.

use badge_core::{Button, FrameBuffer, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Waiting,
    Playing,
    GameOver,
}

/// Player input in game coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
    Drop,
}

impl Move {
    /// The badge is held rotated a quarter turn while playing, so buttons
    /// map to moves rotated accordingly.
    pub const fn from_rotated(button: Button) -> Option<Move> {
        match button {
            Button::Left => Some(Move::Up),
            Button::Right => Some(Move::Down),
            Button::Down => Some(Move::Left),
            Button::Up => Some(Move::Right),
            Button::Ok => Some(Move::Drop),
            _ => None,
        }
    }
}

pub trait GameEngine {
    /// Start over in `Waiting` with a fresh random seed
    fn reset(&mut self, seed: u32);

    fn state(&self) -> GameState;

    fn start_playing(&mut self);

    fn apply_move(&mut self, mv: Move);

    /// Let the piece fall one step if enough time has passed since
    /// `last_fall`. Returns whether it fell.
    fn fall_if_due(&mut self, now: Instant, last_fall: Instant) -> bool;

    /// Add `lines` of garbage sent by the peer
    fn enemy_attack(&mut self, lines: u8);

    /// End the game now
    fn force_over(&mut self);

    fn score(&self) -> u16;

    /// Lines cleared since the last call that should be sent to the peer
    fn take_attack(&mut self) -> Option<u8>;

    fn draw(&self, frame: &mut FrameBuffer);
}
