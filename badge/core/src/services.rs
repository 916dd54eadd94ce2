//! External collaborators
//!
//! The runtime never touches hardware or persistence directly. Everything
//! it needs from the outside world goes through the traits in this module,
//! handed to callbacks as a borrowed [`Services`] bundle.

use core::fmt;

use crate::{Username, DISPLAY_WIDTH};

/// One packed frame for the LED matrix, one byte per column
pub type FrameBuffer = [u8; DISPLAY_WIDTH];

/// Display surface
pub trait Display {
    /// Show a full frame until replaced
    fn show_frame(&mut self, frame: &FrameBuffer);

    /// Start scrolling text in a loop
    fn scroll_text(&mut self, text: &str);

    /// True once the current scroll animation has completed at least once
    fn scroll_completed(&self) -> bool;
}

/// Number of per-game best-score slots kept in storage
pub const MAX_SCORE_SLOTS: usize = 8;

/// Identifies a game or activity for scoring and best-score bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivityKind(pub u8);

impl ActivityKind {
    /// The two-player block stacking game
    pub const STACKER: ActivityKind = ActivityKind(1);
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Activity({})", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ActivityKind {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Activity({})", self.0);
    }
}

/// In-memory mirror of persisted state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NvMirror {
    pub username: Username,
    pub best_scores: [u16; MAX_SCORE_SLOTS],
}

impl NvMirror {
    pub fn best_score(&self, kind: ActivityKind) -> Option<u16> {
        self.best_scores.get(kind.0 as usize).copied()
    }

    /// Keep `score` if it beats the stored best; returns whether it changed
    pub fn record_score(&mut self, kind: ActivityKind, score: u16) -> bool {
        match self.best_scores.get_mut(kind.0 as usize) {
            Some(best) if score > *best => {
                *best = score;
                true
            }
            _ => false,
        }
    }
}

/// Non-volatile storage. The runtime only edits the mirror and marks it
/// dirty; flushing is the storage layer's business.
pub trait Storage {
    fn mirror(&self) -> &NvMirror;
    fn mirror_mut(&mut self) -> &mut NvMirror;
    fn mark_dirty(&mut self);
}

/// Single-badge outcome record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleActivity {
    pub kind: ActivityKind,
    pub data: [u8; 8],
}

impl SingleActivity {
    /// Outcome carrying a little-endian score in the first two data bytes
    pub fn score(kind: ActivityKind, score: u16) -> Self {
        let mut data = [0u8; 8];
        data[..2].copy_from_slice(&score.to_le_bytes());
        Self { kind, data }
    }
}

/// Two-badge outcome record, reported once per completed match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoPartyActivity {
    pub kind: ActivityKind,
    pub my_score: u16,
    pub other_score: u16,
    pub other_user: Username,
    pub nonce: u16,
}

/// Scoring collaborator.
///
/// Both calls return whether the record was accepted, but the runtime treats
/// them as fire-and-forget: a rejected record is dropped, never retried.
pub trait Scoring {
    fn report_single(&mut self, activity: SingleActivity) -> bool;
    fn report_two_party(&mut self, activity: TwoPartyActivity) -> bool;
}

/// Random number source, used for gameplay and nonce generation
pub trait RandomSource {
    fn next_u32(&mut self) -> u32;

    fn next_u16(&mut self) -> u16 {
        self.next_u32() as u16
    }
}

/// Outgoing packet path available to applications.
///
/// `send` is a best-effort attempt: `false` means the packet was not taken
/// and the caller decides whether to try again later.
pub trait PacketSink {
    fn send(&mut self, packet: &[u8]) -> bool;
}

/// Borrowed collaborator bundle handed to application callbacks
pub struct Services<'a> {
    pub display: &'a mut dyn Display,
    pub storage: &'a mut dyn Storage,
    pub scoring: &'a mut dyn Scoring,
    pub random: &'a mut dyn RandomSource,
}

impl<'a> Services<'a> {
    pub fn new(
        display: &'a mut dyn Display,
        storage: &'a mut dyn Storage,
        scoring: &'a mut dyn Scoring,
        random: &'a mut dyn RandomSource,
    ) -> Self {
        Self {
            display,
            storage,
            scoring,
            random,
        }
    }

    /// Reborrow for a nested call
    pub fn reborrow(&mut self) -> Services<'_> {
        Services {
            display: &mut *self.display,
            storage: &mut *self.storage,
            scoring: &mut *self.scoring,
            random: &mut *self.random,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_score_keeps_best() {
        let mut mirror = NvMirror::default();
        assert!(mirror.record_score(ActivityKind::STACKER, 12));
        assert!(!mirror.record_score(ActivityKind::STACKER, 7));
        assert_eq!(mirror.best_score(ActivityKind::STACKER), Some(12));
    }

    #[test]
    fn test_record_score_out_of_range() {
        let mut mirror = NvMirror::default();
        assert!(!mirror.record_score(ActivityKind(200), 5));
        assert_eq!(mirror.best_score(ActivityKind(200)), None);
    }

    #[test]
    fn test_single_activity_score_bytes() {
        let activity = SingleActivity::score(ActivityKind::STACKER, 0x1234);
        assert_eq!(&activity.data[..2], &[0x34, 0x12]);
    }
}
