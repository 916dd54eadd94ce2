//! Versus packet codec
//!
//! All fields little-endian, no padding:
//!
//! | packet        | layout                                          |
//! |---------------|-------------------------------------------------|
//! | attack        | `[type][count]`                                 |
//! | start, abort  | `[type]`                                        |
//! | game over/ack | `[type][score:2][username:16][nonce:2]`         |

use core::fmt;

use heapless::Vec;

use badge_core::{Username, USERNAME_LEN};

/// Encoded size of a game-over or acknowledgment packet
pub const REPORT_PACKET_LEN: usize = 1 + 2 + USERNAME_LEN + 2;

pub const ATTACK_PACKET_LEN: usize = 2;

/// Owned encoded packet
pub type PacketBuf = Vec<u8, REPORT_PACKET_LEN>;

/// Type tag, the first byte of every versus packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VersusKind {
    Attack = 1,
    Start = 2,
    GameOver = 3,
    GameOverAck = 4,
    Abort = 5,
}

impl VersusKind {
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(VersusKind::Attack),
            2 => Some(VersusKind::Start),
            3 => Some(VersusKind::GameOver),
            4 => Some(VersusKind::GameOverAck),
            5 => Some(VersusKind::Abort),
            _ => None,
        }
    }

    /// Exact encoded length of packets of this kind
    pub const fn packet_len(self) -> usize {
        match self {
            VersusKind::Attack => ATTACK_PACKET_LEN,
            VersusKind::Start | VersusKind::Abort => 1,
            VersusKind::GameOver | VersusKind::GameOverAck => REPORT_PACKET_LEN,
        }
    }
}

impl fmt::Display for VersusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VersusKind::Attack => "attack",
            VersusKind::Start => "start",
            VersusKind::GameOver => "game-over",
            VersusKind::GameOverAck => "game-over-ack",
            VersusKind::Abort => "abort",
        };
        f.write_str(name)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for VersusKind {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=u8}", *self as u8);
    }
}

/// Score, identity and correlation nonce of one side of a finished game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub score: u16,
    pub username: Username,
    pub nonce: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersusPacket {
    Attack { count: u8 },
    Start,
    GameOver(Report),
    GameOverAck(Report),
    Abort,
}

/// Why a received packet was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    Empty,
    UnknownType(u8),
    Length {
        kind: VersusKind,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Empty => write!(f, "Empty packet"),
            DecodeError::UnknownType(tag) => write!(f, "Unknown versus packet type {}", tag),
            DecodeError::Length {
                kind,
                expected,
                actual,
            } => write!(f, "{} packet of {} bytes, expected {}", kind, actual, expected),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

#[cfg(feature = "defmt")]
impl defmt::Format for DecodeError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            DecodeError::Empty => defmt::write!(fmt, "Empty"),
            DecodeError::UnknownType(tag) => defmt::write!(fmt, "UnknownType({})", tag),
            DecodeError::Length { kind, actual, .. } => {
                defmt::write!(fmt, "Length({}, {})", kind, actual)
            }
        }
    }
}

impl VersusPacket {
    pub const fn kind(&self) -> VersusKind {
        match self {
            VersusPacket::Attack { .. } => VersusKind::Attack,
            VersusPacket::Start => VersusKind::Start,
            VersusPacket::GameOver(_) => VersusKind::GameOver,
            VersusPacket::GameOverAck(_) => VersusKind::GameOverAck,
            VersusPacket::Abort => VersusKind::Abort,
        }
    }

    /// Parse a packet, checking its length against the size its type
    /// requires before reading any field.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let tag = *bytes.first().ok_or(DecodeError::Empty)?;
        let kind = VersusKind::from_tag(tag).ok_or(DecodeError::UnknownType(tag))?;
        if bytes.len() != kind.packet_len() {
            return Err(DecodeError::Length {
                kind,
                expected: kind.packet_len(),
                actual: bytes.len(),
            });
        }

        Ok(match kind {
            VersusKind::Attack => VersusPacket::Attack { count: bytes[1] },
            VersusKind::Start => VersusPacket::Start,
            VersusKind::Abort => VersusPacket::Abort,
            VersusKind::GameOver => VersusPacket::GameOver(decode_report(&bytes[1..])),
            VersusKind::GameOverAck => VersusPacket::GameOverAck(decode_report(&bytes[1..])),
        })
    }

    pub fn encode(&self) -> PacketBuf {
        let mut buf = PacketBuf::new();
        // the largest packet is exactly the buffer capacity
        let _ = buf.push(self.kind() as u8);
        match self {
            VersusPacket::Attack { count } => {
                let _ = buf.push(*count);
            }
            VersusPacket::GameOver(report) | VersusPacket::GameOverAck(report) => {
                let _ = buf.extend_from_slice(&report.score.to_le_bytes());
                let _ = buf.extend_from_slice(report.username.as_bytes());
                let _ = buf.extend_from_slice(&report.nonce.to_le_bytes());
            }
            VersusPacket::Start | VersusPacket::Abort => {}
        }
        buf
    }
}

/// `body` is exactly score, username and nonce
fn decode_report(body: &[u8]) -> Report {
    let mut username = [0u8; USERNAME_LEN];
    username.copy_from_slice(&body[2..2 + USERNAME_LEN]);
    Report {
        score: u16::from_le_bytes([body[0], body[1]]),
        username: Username::from_bytes(username),
        nonce: u16::from_le_bytes([body[2 + USERNAME_LEN], body[3 + USERNAME_LEN]]),
    }
}
