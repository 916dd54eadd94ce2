//! Scheduler trace record identifiers.
//!
//! Records are emitted through the optional [`TraceHook`](crate::TraceHook)
//! with a small little-endian payload described next to each id.

/// Task about to run: `[task:1][priority:2]`
pub const SCHED_NEXT: u8 = 52;
/// Tick pass found nothing due: `[pass:4]`
pub const SCHED_IDLE: u8 = 53;
/// One-shot execution requested: `[task:1]`
pub const TASK_QUEUED: u8 = 60;
/// Periodic execution enabled: `[task:1]`
pub const TASK_ENABLED: u8 = 61;
/// Periodic execution disabled: `[task:1]`
pub const TASK_DISABLED: u8 = 62;
