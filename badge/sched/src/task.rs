//! Task descriptors and the interfaces between scheduler and task owners

use core::fmt;

use badge_core::{BadgeResult, Duration, Instant, Priority};

/// Handle to an entry in the scheduler's task table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub(crate) u8);

impl TaskId {
    /// Position in the task table
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TaskId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "task#{}", self.0);
    }
}

/// When a task runs on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Runs once per explicit queue request
    OneShot,
    /// Re-armed automatically every interval while enabled
    Periodic(Duration),
}

impl Schedule {
    pub const fn is_periodic(&self) -> bool {
        matches!(self, Schedule::Periodic(_))
    }

    /// Interval between runs, zero for one-shot tasks
    pub const fn interval(&self) -> Duration {
        match self {
            Schedule::OneShot => Duration::ZERO,
            Schedule::Periodic(interval) => *interval,
        }
    }
}

/// Static description of a unit of deferred work.
///
/// `context` is what the task's owner receives when the task runs. It is a
/// plain value chosen by the owner (usually an enum naming the component and
/// carrying whatever data the callback needs), never a pointer the scheduler
/// keeps beyond the call.
#[derive(Debug, Clone)]
pub struct TaskDescriptor<C> {
    pub name: &'static str,
    pub priority: Priority,
    pub schedule: Schedule,
    pub context: C,
}

impl<C> TaskDescriptor<C> {
    /// Task that runs only when queued
    pub const fn one_shot(name: &'static str, priority: Priority, context: C) -> Self {
        Self {
            name,
            priority,
            schedule: Schedule::OneShot,
            context,
        }
    }

    /// Task that runs every `interval` while enabled. A zero interval is
    /// rounded up to one millisecond so the task cannot run twice per tick.
    pub const fn periodic(
        name: &'static str,
        priority: Priority,
        interval: Duration,
        context: C,
    ) -> Self {
        let interval = if interval.is_zero() {
            Duration::from_millis(1)
        } else {
            interval
        };
        Self {
            name,
            priority,
            schedule: Schedule::Periodic(interval),
            context,
        }
    }
}

/// One execution handed to a task owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Due<C> {
    pub task: TaskId,
    pub priority: Priority,
    pub now: Instant,
    pub context: C,
}

/// Run-time control over the task table, available to running tasks.
///
/// This is the part of the scheduler a callback may touch while a tick pass
/// is in progress. Changes made here apply to the next pass; the set of
/// tasks due in the current pass is fixed when the pass starts.
pub trait TaskControl {
    /// Request one execution with the task's default context. Returns
    /// `false` if an execution is already pending.
    fn queue(&mut self, task: TaskId) -> BadgeResult<bool>;

    /// Allow the periodic task to run again
    fn enable_periodic(&mut self, task: TaskId) -> BadgeResult<()>;

    /// Stop future periodic runs. A pending execution is not cancelled.
    fn disable_periodic(&mut self, task: TaskId) -> BadgeResult<()>;

    fn is_enabled(&self, task: TaskId) -> bool;

    fn is_pending(&self, task: TaskId) -> bool;
}

/// Owner side of task execution: receives each due task in order.
pub trait Runnable<C> {
    fn run(&mut self, tasks: &mut dyn TaskControl, due: Due<C>);
}

impl<C, F> Runnable<C> for F
where
    F: FnMut(&mut dyn TaskControl, Due<C>),
{
    fn run(&mut self, tasks: &mut dyn TaskControl, due: Due<C>) {
        self(tasks, due)
    }
}
