#![no_std]
#![forbid(unsafe_code)]

//! # Badge Scheduler
//!
//! Non-preemptive, run-to-completion task scheduler. A fixed table of tasks
//! is registered at start-up; once per tick the scheduler works out which
//! tasks are due and runs them one after another in ascending
//! priority-value order.
//!
//! Task callbacks must not block. There is no timeout and no cancellation:
//! a callback that spins stalls the whole device.

pub mod config;
pub mod records;
pub mod scheduler;
pub mod task;

pub use badge_core::*;
pub use config::*;
pub use scheduler::*;
pub use task::*;

/// Default size of the fixed task table
pub const MAX_TASKS: usize = 32;
