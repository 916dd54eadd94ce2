#![no_std]
#![forbid(unsafe_code)]

//! # Badge Core
//!
//! Core types shared by every layer of the badge runtime: task priorities,
//! millisecond time, button input, fixed-width text and the narrow traits
//! through which the runtime reaches its external collaborators (display,
//! storage, scoring, randomness).

#[cfg(feature = "std")]
extern crate std;

use core::fmt;

pub mod input;
pub mod priority;
pub mod services;
pub mod text;
pub mod time;

pub use input::*;
pub use priority::*;
pub use services::*;
pub use text::*;
pub use time::*;

/// Runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Width of the LED matrix in columns; each column is one packed byte.
pub const DISPLAY_WIDTH: usize = 16;

/// Length of a username as carried on the wire.
pub const USERNAME_LEN: usize = 16;

/// Length of a show/test message as carried on the wire.
pub const MESSAGE_LEN: usize = 16;

/// Result type used throughout the badge runtime
pub type BadgeResult<T> = Result<T, BadgeError>;

/// Error types for runtime operations
///
/// Only configuration-time mistakes surface as errors. Conditions the device
/// is expected to meet in the field (dropped packets, stale requests, a busy
/// link) are handled where they are detected and never reach this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeError {
    /// Fixed task table has no free slot
    TaskTableFull,
    /// Task id does not name a registered task
    UnknownTask,
    /// Tasks can only be registered before the scheduler starts
    RegistrationClosed,
    /// Application roster has no free slot
    AppRosterFull,
    /// App id does not name a registered application
    UnknownApp,
    /// An application with this id is already registered
    DuplicateApp,
    /// Operation requires a started controller
    NotStarted,
    /// Output buffer cannot hold the encoded value
    BufferTooSmall,
}

impl fmt::Display for BadgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadgeError::TaskTableFull => write!(f, "Task table is full"),
            BadgeError::UnknownTask => write!(f, "Unknown task"),
            BadgeError::RegistrationClosed => write!(f, "Task registration is closed"),
            BadgeError::AppRosterFull => write!(f, "Application roster is full"),
            BadgeError::UnknownApp => write!(f, "Unknown application"),
            BadgeError::DuplicateApp => write!(f, "Application already registered"),
            BadgeError::NotStarted => write!(f, "Controller not started"),
            BadgeError::BufferTooSmall => write!(f, "Buffer too small"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BadgeError {}

#[cfg(feature = "defmt")]
impl defmt::Format for BadgeError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            BadgeError::TaskTableFull => defmt::write!(fmt, "TaskTableFull"),
            BadgeError::UnknownTask => defmt::write!(fmt, "UnknownTask"),
            BadgeError::RegistrationClosed => defmt::write!(fmt, "RegistrationClosed"),
            BadgeError::AppRosterFull => defmt::write!(fmt, "AppRosterFull"),
            BadgeError::UnknownApp => defmt::write!(fmt, "UnknownApp"),
            BadgeError::DuplicateApp => defmt::write!(fmt, "DuplicateApp"),
            BadgeError::NotStarted => defmt::write!(fmt, "NotStarted"),
            BadgeError::BufferTooSmall => defmt::write!(fmt, "BufferTooSmall"),
        }
    }
}
