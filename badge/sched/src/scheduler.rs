//! Cooperative priority scheduler

use heapless::Vec;
use log::{debug, trace, warn};

use badge_core::{BadgeError, BadgeResult, Instant};

use crate::config::SchedulerConfig;
use crate::records;
use crate::task::{Due, Runnable, Schedule, TaskControl, TaskDescriptor, TaskId};
use crate::MAX_TASKS;

#[derive(Debug, Clone)]
enum Pending<C> {
    Default,
    Override(C),
}

#[derive(Debug)]
struct TaskSlot<C> {
    descriptor: TaskDescriptor<C>,
    pending: Option<Pending<C>>,
    enabled: bool,
    last_run: Option<Instant>,
}

/// Counters kept across tick passes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub passes: u32,
    pub executed: u32,
}

/// Tasks due in one tick pass, already in execution order
pub(crate) type DuePass<C, const N: usize> = Vec<Due<C>, N>;

/// The fixed task table and its per-tick dispatch.
///
/// Owns only the table and per-task bookkeeping. What a task does when it
/// runs is up to the [`Runnable`] handed to [`Scheduler::tick`].
pub struct Scheduler<C, const N: usize = MAX_TASKS> {
    config: SchedulerConfig,
    tasks: Vec<TaskSlot<C>, N>,
    started: bool,
    stats: SchedulerStats,
}

impl<C: Clone, const N: usize> Scheduler<C, N> {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            tasks: Vec::new(),
            started: false,
            stats: SchedulerStats::default(),
        }
    }

    /// Add a task to the table. Periodic tasks start disabled.
    pub fn register(&mut self, descriptor: TaskDescriptor<C>) -> BadgeResult<TaskId> {
        if self.started {
            return Err(BadgeError::RegistrationClosed);
        }
        if self.tasks.len() >= N.min(u8::MAX as usize + 1) {
            return Err(BadgeError::TaskTableFull);
        }

        let id = TaskId(self.tasks.len() as u8);
        debug!(
            "{}: registered {} '{}' at {}",
            self.config.name, id, descriptor.name, descriptor.priority
        );
        self.tasks
            .push(TaskSlot {
                descriptor,
                pending: None,
                enabled: false,
                last_run: None,
            })
            .map_err(|_| BadgeError::TaskTableFull)?;
        Ok(id)
    }

    /// Close registration. Later calls to [`register`](Self::register) fail.
    pub fn start(&mut self) {
        self.started = true;
        debug!("{}: started with {} tasks", self.config.name, self.tasks.len());
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Request one execution of `task` in the next pass, optionally with a
    /// context that replaces the descriptor's default for that run only.
    ///
    /// Returns `Ok(false)` without touching the pending request if the task
    /// is already pending.
    pub fn queue_with(&mut self, task: TaskId, context: Option<C>) -> BadgeResult<bool> {
        let name = self.config.name;
        let slot = self.slot_mut(task)?;
        if slot.pending.is_some() {
            trace!("{name}: {task} already pending");
            return Ok(false);
        }
        slot.pending = Some(match context {
            Some(context) => Pending::Override(context),
            None => Pending::Default,
        });
        self.emit(records::TASK_QUEUED, &[task.0]);
        Ok(true)
    }

    pub fn last_run(&self, task: TaskId) -> Option<Instant> {
        self.tasks.get(task.index()).and_then(|slot| slot.last_run)
    }

    pub fn descriptor(&self, task: TaskId) -> Option<&TaskDescriptor<C>> {
        self.tasks.get(task.index()).map(|slot| &slot.descriptor)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Work out which tasks are due at `now` and return them in execution
    /// order: ascending priority value, ties broken by registration order.
    ///
    /// A periodic task is due when it is enabled and at least its interval
    /// has passed since it last ran; any task is due when queued. A task
    /// that is both counts once. Periodic tasks have their last-run time set
    /// to `now` here, so a late tick does not shorten the following interval.
    pub(crate) fn collect_due(&mut self, now: Instant) -> DuePass<C, N> {
        let mut due: Vec<Due<C>, N> = Vec::new();

        for (index, slot) in self.tasks.iter_mut().enumerate() {
            let periodic_due = match slot.descriptor.schedule {
                Schedule::Periodic(interval) => {
                    slot.enabled
                        && slot
                            .last_run
                            .map_or(true, |last| now.has_elapsed(last, interval))
                }
                Schedule::OneShot => false,
            };

            let context = match slot.pending.take() {
                Some(Pending::Override(context)) => context,
                Some(Pending::Default) => slot.descriptor.context.clone(),
                None if periodic_due => slot.descriptor.context.clone(),
                None => continue,
            };

            slot.last_run = Some(now);
            // one entry per slot, same capacity as the table
            let _ = due.push(Due {
                task: TaskId(index as u8),
                priority: slot.descriptor.priority,
                now,
                context,
            });
        }

        due.sort_unstable_by_key(|item| (item.priority, item.task));
        due
    }

    /// Run one tick pass: collect the due tasks and hand each, in order, to
    /// `runner`. Each task runs to completion before the next starts.
    ///
    /// Returns the number of tasks executed.
    pub fn tick<R>(&mut self, now: Instant, runner: &mut R) -> usize
    where
        R: Runnable<C> + ?Sized,
    {
        let pass = self.collect_due(now);
        self.stats.passes = self.stats.passes.wrapping_add(1);

        if pass.is_empty() {
            self.emit(records::SCHED_IDLE, &self.stats.passes.to_le_bytes());
            if let Some(idle) = self.config.idle_callback {
                idle();
            }
            return 0;
        }

        let count = pass.len();
        for due in pass {
            let mut payload = [0u8; 3];
            payload[0] = due.task.0;
            payload[1..].copy_from_slice(&due.priority.raw().to_le_bytes());
            self.emit(records::SCHED_NEXT, &payload);
            trace!("{}: run {} at {}", self.config.name, due.task, due.now);

            runner.run(self, due);
            self.stats.executed = self.stats.executed.wrapping_add(1);
        }
        count
    }

    fn slot(&self, task: TaskId) -> BadgeResult<&TaskSlot<C>> {
        self.tasks.get(task.index()).ok_or(BadgeError::UnknownTask)
    }

    fn slot_mut(&mut self, task: TaskId) -> BadgeResult<&mut TaskSlot<C>> {
        self.tasks.get_mut(task.index()).ok_or(BadgeError::UnknownTask)
    }

    fn emit(&self, record: u8, payload: &[u8]) {
        if let Some(hook) = self.config.trace_hook {
            hook(record, payload);
        }
    }
}

impl<C: Clone, const N: usize> Default for Scheduler<C, N> {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl<C: Clone, const N: usize> TaskControl for Scheduler<C, N> {
    fn queue(&mut self, task: TaskId) -> BadgeResult<bool> {
        self.queue_with(task, None)
    }

    fn enable_periodic(&mut self, task: TaskId) -> BadgeResult<()> {
        let name = self.config.name;
        let slot = self.slot_mut(task)?;
        if !slot.descriptor.schedule.is_periodic() {
            warn!("{name}: enable on one-shot {task} ignored");
            return Ok(());
        }
        if !slot.enabled {
            slot.enabled = true;
            self.emit(records::TASK_ENABLED, &[task.0]);
        }
        Ok(())
    }

    fn disable_periodic(&mut self, task: TaskId) -> BadgeResult<()> {
        let slot = self.slot_mut(task)?;
        if slot.enabled {
            slot.enabled = false;
            self.emit(records::TASK_DISABLED, &[task.0]);
        }
        Ok(())
    }

    fn is_enabled(&self, task: TaskId) -> bool {
        self.slot(task).map_or(false, |slot| slot.enabled)
    }

    fn is_pending(&self, task: TaskId) -> bool {
        self.slot(task).map_or(false, |slot| slot.pending.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use badge_core::{duration, priority};

    extern crate std;
    use std::vec::Vec as StdVec;

    fn order(pass: DuePass<u16, 8>) -> StdVec<u16> {
        pass.into_iter().map(|due| due.context).collect()
    }

    #[test]
    fn test_priority_order_with_ties() {
        let mut sched: Scheduler<u16, 8> = Scheduler::default();
        let a = sched.register(TaskDescriptor::one_shot("a", priority!(5), 1)).unwrap();
        let b = sched.register(TaskDescriptor::one_shot("b", priority!(3), 2)).unwrap();
        let c = sched.register(TaskDescriptor::one_shot("c", priority!(5), 3)).unwrap();
        for task in [c, b, a] {
            assert!(sched.queue(task).unwrap());
        }

        assert_eq!(order(sched.collect_due(Instant::ZERO)), [2, 1, 3]);
    }

    #[test]
    fn test_queue_twice_is_noop() {
        let mut sched: Scheduler<u16, 8> = Scheduler::default();
        let task = sched.register(TaskDescriptor::one_shot("a", priority!(5), 1)).unwrap();
        assert_eq!(sched.queue_with(task, Some(10)), Ok(true));
        assert_eq!(sched.queue_with(task, Some(20)), Ok(false));

        // the first request's context survives
        assert_eq!(order(sched.collect_due(Instant::ZERO)), [10]);
        assert!(sched.collect_due(Instant::from_millis(1)).is_empty());
    }

    #[test]
    fn test_periodic_needs_enable() {
        let mut sched: Scheduler<u16, 8> = Scheduler::default();
        let task = sched
            .register(TaskDescriptor::periodic("p", priority!(1), duration!(10 ms), 7))
            .unwrap();
        assert!(sched.collect_due(Instant::ZERO).is_empty());

        sched.enable_periodic(task).unwrap();
        assert_eq!(order(sched.collect_due(Instant::ZERO)), [7]);
        assert!(sched.collect_due(Instant::from_millis(9)).is_empty());
        assert_eq!(order(sched.collect_due(Instant::from_millis(10))), [7]);
    }

    #[test]
    fn test_registration_closes_on_start() {
        let mut sched: Scheduler<u16, 8> = Scheduler::default();
        sched.start();
        assert_eq!(
            sched.register(TaskDescriptor::one_shot("late", priority!(1), 0)),
            Err(BadgeError::RegistrationClosed)
        );
    }

    #[test]
    fn test_table_full() {
        let mut sched: Scheduler<u16, 2> = Scheduler::default();
        sched.register(TaskDescriptor::one_shot("a", priority!(1), 0)).unwrap();
        sched.register(TaskDescriptor::one_shot("b", priority!(1), 0)).unwrap();
        assert_eq!(
            sched.register(TaskDescriptor::one_shot("c", priority!(1), 0)),
            Err(BadgeError::TaskTableFull)
        );
    }

    #[test]
    fn test_unknown_task() {
        let mut sched: Scheduler<u16, 8> = Scheduler::default();
        assert_eq!(sched.queue(TaskId(3)), Err(BadgeError::UnknownTask));
        assert!(!sched.is_pending(TaskId(3)));
    }
}
