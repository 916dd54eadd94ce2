//! Callback context handed to applications

use log::debug;

use badge_core::{Instant, PacketSink, Services};
use badge_sched::{TaskControl, TaskId};

use crate::app::{AppId, Handoff};

/// Transfer of control requested from inside a callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    To {
        target: AppId,
        handoff: Option<Handoff>,
    },
    BackToMenu {
        requester: AppId,
    },
    RestoreStored,
}

/// Everything an application callback may touch: its own routine task, the
/// external collaborators and the outgoing link.
///
/// Borrowed for the duration of one callback only.
pub struct AppContext<'a> {
    pub me: AppId,
    pub current: AppId,
    pub now: Instant,
    pub services: Services<'a>,
    task: Option<TaskId>,
    tasks: &'a mut dyn TaskControl,
    link: &'a mut dyn PacketSink,
    request: Option<Transfer>,
}

impl<'a> AppContext<'a> {
    pub fn new(
        me: AppId,
        task: Option<TaskId>,
        current: AppId,
        now: Instant,
        tasks: &'a mut dyn TaskControl,
        services: Services<'a>,
        link: &'a mut dyn PacketSink,
    ) -> Self {
        Self {
            me,
            current,
            now,
            services,
            task,
            tasks,
            link,
            request: None,
        }
    }

    /// True if the calling application is the active one
    pub fn is_active(&self) -> bool {
        self.me == self.current
    }

    pub fn routine_task(&self) -> Option<TaskId> {
        self.task
    }

    /// Arm this application's periodic routine
    pub fn enable_routine(&mut self) {
        if let Some(task) = self.task {
            if let Err(err) = self.tasks.enable_periodic(task) {
                debug!("{}: enable {} failed: {}", self.me, task, err);
            }
        }
    }

    /// Disarm this application's periodic routine
    pub fn disable_routine(&mut self) {
        if let Some(task) = self.task {
            if let Err(err) = self.tasks.disable_periodic(task) {
                debug!("{}: disable {} failed: {}", self.me, task, err);
            }
        }
    }

    /// Request a run of the routine on the next tick
    pub fn queue_routine(&mut self) -> bool {
        match self.task {
            Some(task) => self.tasks.queue(task).unwrap_or(false),
            None => false,
        }
    }

    /// Best-effort send over the link
    pub fn send_packet(&mut self, packet: &[u8]) -> bool {
        self.link.send(packet)
    }

    /// Ask for control to pass to `target`. A later request in the same
    /// callback replaces an earlier one.
    pub fn change_app(&mut self, target: AppId, handoff: Option<Handoff>) {
        self.request = Some(Transfer::To { target, handoff });
    }

    /// Ask to return to the menu. Ignored unless the caller is active.
    pub fn back_to_menu(&mut self) {
        self.request = Some(Transfer::BackToMenu { requester: self.me });
    }

    /// Ask to return to the application the controller has stored
    pub fn restore_stored(&mut self) {
        self.request = Some(Transfer::RestoreStored);
    }

    pub fn request(&self) -> Option<Transfer> {
        self.request
    }

    pub(crate) fn take_request(&mut self) -> Option<Transfer> {
        self.request.take()
    }
}
