//! Hardware self-test of the IR receive path

use log::debug;

use badge_core::Message;

/// Pattern a test badge sends during the factory self-test
pub const SELF_TEST_PATTERN: &str = "HITCON-IR-TEST";

/// Counts received test frames that carry the expected pattern.
#[derive(Debug, Clone)]
pub struct IrSelfTest {
    expected: Message,
    matched: u32,
    mismatched: u32,
}

impl IrSelfTest {
    pub fn new(expected: Message) -> Self {
        Self {
            expected,
            matched: 0,
            mismatched: 0,
        }
    }

    /// Compare one received test message, returns whether it matched
    pub fn check(&mut self, received: &Message) -> bool {
        if *received == self.expected {
            self.matched = self.matched.wrapping_add(1);
            true
        } else {
            debug!("self-test mismatch: {}", received);
            self.mismatched = self.mismatched.wrapping_add(1);
            false
        }
    }

    pub fn matched(&self) -> u32 {
        self.matched
    }

    pub fn mismatched(&self) -> u32 {
        self.mismatched
    }

    pub fn passed(&self) -> bool {
        self.matched > 0
    }
}

impl Default for IrSelfTest {
    fn default() -> Self {
        Self::new(Message::new(SELF_TEST_PATTERN))
    }
}
