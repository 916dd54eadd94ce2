//! IR frame codec
//!
//! Every frame starts with a two-byte header, `[ttl][type]`, followed by a
//! payload whose size depends on the type. Show and test frames carry a
//! fixed NUL-padded message; game frames carry one point-to-point packet.

use core::fmt;

use heapless::Vec;

use badge_core::{BadgeError, BadgeResult, Message, MESSAGE_LEN};

pub const FRAME_HEADER_LEN: usize = 2;

/// Largest game payload that fits in one frame
pub const MAX_GAME_PAYLOAD: usize = 30;

pub const MAX_FRAME_LEN: usize = FRAME_HEADER_LEN + MAX_GAME_PAYLOAD;

/// Owned copy of an encoded frame
pub type FrameBuf = Vec<u8, MAX_FRAME_LEN>;

/// Type tag of an IR frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketType {
    /// Point-to-point game traffic
    Game = 1,
    /// Announcement to scroll on the receiver's display
    Show = 2,
    /// Hardware self-test pattern
    Test = 3,
}

impl PacketType {
    pub const ALL: [PacketType; 3] = [PacketType::Game, PacketType::Show, PacketType::Test];

    pub const fn tag(self) -> u8 {
        self as u8
    }

    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(PacketType::Game),
            2 => Some(PacketType::Show),
            3 => Some(PacketType::Test),
            _ => None,
        }
    }

    /// Valid payload sizes for this type
    const fn payload_len(self) -> (usize, usize) {
        match self {
            PacketType::Game => (1, MAX_GAME_PAYLOAD),
            PacketType::Show | PacketType::Test => (MESSAGE_LEN, MESSAGE_LEN),
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketType::Game => write!(f, "game"),
            PacketType::Show => write!(f, "show"),
            PacketType::Test => write!(f, "test"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PacketType {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            PacketType::Game => defmt::write!(fmt, "game"),
            PacketType::Show => defmt::write!(fmt, "show"),
            PacketType::Test => defmt::write!(fmt, "test"),
        }
    }
}

/// Why a received frame was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Shorter than the header
    Truncated,
    /// Type byte names no known packet type
    UnknownType(u8),
    /// Payload size is wrong for the type
    Length { kind: PacketType, actual: usize },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Truncated => write!(f, "Frame shorter than header"),
            FrameError::UnknownType(tag) => write!(f, "Unknown packet type {}", tag),
            FrameError::Length { kind, actual } => {
                write!(f, "Bad {} payload length {}", kind, actual)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FrameError {}

#[cfg(feature = "defmt")]
impl defmt::Format for FrameError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            FrameError::Truncated => defmt::write!(fmt, "Truncated"),
            FrameError::UnknownType(tag) => defmt::write!(fmt, "UnknownType({})", tag),
            FrameError::Length { kind, actual } => {
                defmt::write!(fmt, "Length({}, {})", kind, actual)
            }
        }
    }
}

/// A decoded frame borrowing its payload from the receive buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrFrame<'a> {
    pub ttl: u8,
    pub kind: PacketType,
    pub payload: &'a [u8],
}

impl<'a> IrFrame<'a> {
    pub const fn new(ttl: u8, kind: PacketType, payload: &'a [u8]) -> Self {
        Self { ttl, kind, payload }
    }

    /// Parse and length-check a received frame
    pub fn decode(bytes: &'a [u8]) -> Result<Self, FrameError> {
        let (header, payload) = match bytes {
            [ttl, tag, payload @ ..] => ((*ttl, *tag), payload),
            _ => return Err(FrameError::Truncated),
        };
        let kind = PacketType::from_tag(header.1).ok_or(FrameError::UnknownType(header.1))?;

        let (min, max) = kind.payload_len();
        if payload.len() < min || payload.len() > max {
            return Err(FrameError::Length {
                kind,
                actual: payload.len(),
            });
        }
        Ok(Self {
            ttl: header.0,
            kind,
            payload,
        })
    }

    /// Message carried by a show or test frame
    pub fn message(&self) -> Option<Message> {
        match self.kind {
            PacketType::Show | PacketType::Test => {
                let bytes: [u8; MESSAGE_LEN] = self.payload.try_into().ok()?;
                Some(Message::from_bytes(bytes))
            }
            PacketType::Game => None,
        }
    }

    pub fn encode(&self) -> BadgeResult<FrameBuf> {
        let mut buf = FrameBuf::new();
        buf.push(self.ttl).map_err(|_| BadgeError::BufferTooSmall)?;
        buf.push(self.kind.tag())
            .map_err(|_| BadgeError::BufferTooSmall)?;
        buf.extend_from_slice(self.payload)
            .map_err(|_| BadgeError::BufferTooSmall)?;
        Ok(buf)
    }
}

/// Frame announcing `message` to whoever receives it
pub fn show_frame(ttl: u8, message: &Message) -> FrameBuf {
    message_frame(ttl, PacketType::Show, message)
}

/// Frame carrying the self-test pattern
pub fn test_frame(ttl: u8, message: &Message) -> FrameBuf {
    message_frame(ttl, PacketType::Test, message)
}

fn message_frame(ttl: u8, kind: PacketType, message: &Message) -> FrameBuf {
    let mut buf = FrameBuf::new();
    // header plus a message is well below the frame capacity
    let _ = buf.push(ttl);
    let _ = buf.push(kind.tag());
    let _ = buf.extend_from_slice(message.as_bytes());
    buf
}
