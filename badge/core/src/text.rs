//! Fixed-width, NUL-padded text as carried in packets and storage

use core::fmt;

use crate::{MESSAGE_LEN, USERNAME_LEN};

/// Text stored in exactly `N` bytes, padded with NUL.
///
/// Input longer than `N` bytes is truncated at a character boundary.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedText<const N: usize>([u8; N]);

/// Player name as carried in game-over packets
pub type Username = FixedText<USERNAME_LEN>;

/// Show/test message body
pub type Message = FixedText<MESSAGE_LEN>;

impl<const N: usize> FixedText<N> {
    /// All-NUL text
    pub const EMPTY: Self = Self([0; N]);

    /// Build from a string, truncating to fit
    pub fn new(text: &str) -> Self {
        let mut end = text.len().min(N);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let mut buf = [0u8; N];
        buf[..end].copy_from_slice(&text.as_bytes()[..end]);
        Self(buf)
    }

    /// Wrap raw wire bytes without validation
    pub const fn from_bytes(bytes: [u8; N]) -> Self {
        Self(bytes)
    }

    /// Raw padded bytes
    pub const fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    /// Text up to the first NUL; invalid UTF-8 yields the valid prefix
    pub fn as_str(&self) -> &str {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(N);
        match core::str::from_utf8(&self.0[..end]) {
            Ok(text) => text,
            Err(err) => {
                // valid_up_to is always a boundary
                core::str::from_utf8(&self.0[..err.valid_up_to()]).unwrap_or("")
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0[0] == 0
    }
}

impl<const N: usize> Default for FixedText<N> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<const N: usize> fmt::Debug for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl<const N: usize> fmt::Display for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl<const N: usize> defmt::Format for FixedText<N> {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.as_str());
    }
}
