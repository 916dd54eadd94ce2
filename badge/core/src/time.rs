//! Time management types and utilities
//!
//! The badge keeps a single millisecond counter driven by the system timer.
//! All scheduling decisions are made against that counter.

use core::fmt;

/// Point in time, in milliseconds since boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(u64);

impl Instant {
    /// Boot time
    pub const ZERO: Self = Self(0);

    /// Create an instant from a raw millisecond count
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Get the raw millisecond value
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since a previous instant (handles wraparound)
    pub const fn elapsed_since(self, previous: Instant) -> u64 {
        self.0.wrapping_sub(previous.0)
    }

    /// Check if at least `interval` has passed since `previous`
    pub const fn has_elapsed(self, previous: Instant, interval: Duration) -> bool {
        self.elapsed_since(previous) >= interval.as_millis() as u64
    }

    /// Instant shifted forward by a duration
    pub const fn after(self, duration: Duration) -> Instant {
        Instant(self.0.wrapping_add(duration.as_millis() as u64))
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t+{}ms", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Instant {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "t+{}ms", self.0);
    }
}

/// Span of time in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration {
    millis: u32,
}

impl Duration {
    /// Zero duration
    pub const ZERO: Self = Self { millis: 0 };

    /// Create duration from milliseconds
    pub const fn from_millis(millis: u32) -> Self {
        Self { millis }
    }

    /// Create duration from seconds
    pub const fn from_secs(secs: u32) -> Self {
        Self {
            millis: secs * 1000,
        }
    }

    /// Get the millisecond count
    pub const fn as_millis(&self) -> u32 {
        self.millis
    }

    /// Check if duration is zero
    pub const fn is_zero(&self) -> bool {
        self.millis == 0
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.millis)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Duration {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}ms", self.millis);
    }
}

/// Macro to create compile-time durations
#[macro_export]
macro_rules! duration {
    ($value:literal ms) => {
        $crate::Duration::from_millis($value)
    };
    ($value:literal s) => {
        $crate::Duration::from_secs($value)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_wraps() {
        let before = Instant::from_millis(u64::MAX - 4);
        let after = Instant::from_millis(5);
        assert_eq!(after.elapsed_since(before), 10);
    }

    #[test]
    fn test_has_elapsed_is_inclusive() {
        let start = Instant::from_millis(100);
        let interval = duration!(50 ms);
        assert!(!Instant::from_millis(149).has_elapsed(start, interval));
        assert!(Instant::from_millis(150).has_elapsed(start, interval));
        assert_eq!(start.after(interval), Instant::from_millis(150));
    }
}
