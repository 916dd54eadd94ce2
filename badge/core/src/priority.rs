//! Task priorities

use core::fmt;

/// Scheduling priority of a task.
///
/// Lower values are more urgent: when several tasks are due in the same
/// tick they run in ascending priority-value order. Input polling and link
/// timing therefore get small numbers, cosmetic redraws large ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Priority(u16);

impl Priority {
    /// Most urgent priority
    pub const HIGHEST: Priority = Priority(0);

    /// Least urgent priority
    pub const LOWEST: Priority = Priority(u16::MAX);

    /// Create a priority from its raw value
    pub const fn new(priority: u16) -> Self {
        Priority(priority)
    }

    /// Get the raw priority value
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// True if `self` runs before `other` when both are due
    pub const fn runs_before(self, other: Priority) -> bool {
        self.0 < other.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Priority({})", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Priority {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Priority({})", self.0);
    }
}

/// Macro to create compile-time priority constants
#[macro_export]
macro_rules! priority {
    ($value:literal) => {
        $crate::Priority::new($value)
    };
}
