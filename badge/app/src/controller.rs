//! Single-active-application controller

use alloc::boxed::Box;

use heapless::Vec;
use log::{debug, info, warn};

use badge_core::{BadgeError, BadgeResult, Button, Instant, PacketSink, Services};
use badge_sched::{Scheduler, TaskControl, TaskDescriptor, TaskId};

use crate::app::{App, AppId, Handoff};
use crate::context::{AppContext, Transfer};
use crate::MAX_APPS;

/// Longest chain of transfers followed after one callback
const MAX_CHAINED_TRANSFERS: usize = 4;

/// The parts of the device an application callback needs, lent to the
/// controller for one operation.
pub struct Environment<'a> {
    pub now: Instant,
    pub tasks: &'a mut dyn TaskControl,
    pub services: Services<'a>,
    pub link: &'a mut dyn PacketSink,
}

impl<'a> Environment<'a> {
    pub fn new(
        now: Instant,
        tasks: &'a mut dyn TaskControl,
        services: Services<'a>,
        link: &'a mut dyn PacketSink,
    ) -> Self {
        Self {
            now,
            tasks,
            services,
            link,
        }
    }
}

struct Entry {
    id: AppId,
    task: Option<TaskId>,
    app: Box<dyn App>,
}

/// Keeps track of the active application and performs transfers.
///
/// Holds the roster and the identity of the active entry. Application state
/// stays inside each application.
pub struct AppController<const N: usize = MAX_APPS> {
    roster: Vec<Entry, N>,
    current: Option<AppId>,
    menu: AppId,
    stored: Option<AppId>,
    switches: u32,
}

impl<const N: usize> AppController<N> {
    /// Create an empty controller whose menu is `menu`
    pub fn new(menu: AppId) -> Self {
        Self {
            roster: Vec::new(),
            current: None,
            menu,
            stored: None,
            switches: 0,
        }
    }

    /// Add an application, optionally bound to its routine task
    pub fn register(
        &mut self,
        id: AppId,
        task: Option<TaskId>,
        app: Box<dyn App>,
    ) -> BadgeResult<()> {
        if self.contains(id) {
            return Err(BadgeError::DuplicateApp);
        }
        debug!("registered {} '{}'", id, app.name());
        self.roster
            .push(Entry { id, task, app })
            .map_err(|_| BadgeError::AppRosterFull)
    }

    pub fn contains(&self, id: AppId) -> bool {
        self.roster.iter().any(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    pub fn menu(&self) -> AppId {
        self.menu
    }

    /// The active application, `None` before [`start`](Self::start)
    pub fn current_app(&self) -> Option<AppId> {
        self.current
    }

    pub fn is_started(&self) -> bool {
        self.current.is_some()
    }

    /// Number of completed transfers
    pub fn switches(&self) -> u32 {
        self.switches
    }

    /// Routine task bound to `id`
    pub fn task_of(&self, id: AppId) -> Option<TaskId> {
        self.roster
            .iter()
            .find(|entry| entry.id == id)
            .and_then(|entry| entry.task)
    }

    pub fn app_name(&self, id: AppId) -> Option<&'static str> {
        self.roster
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.app.name())
    }

    /// Activate the first application. Later calls are ignored.
    pub fn start(&mut self, env: &mut Environment<'_>, initial: AppId) -> BadgeResult<()> {
        if self.current.is_some() {
            debug!("controller already started");
            return Ok(());
        }
        if !self.contains(initial) {
            return Err(BadgeError::UnknownApp);
        }
        info!("starting with {}", initial);
        self.current = Some(initial);
        let request = self.invoke(env, initial, |app, ctx| app.on_entry(ctx))?;
        self.follow(env, request)
    }

    /// Exit the active application and enter `target`
    pub fn change_app(
        &mut self,
        env: &mut Environment<'_>,
        target: AppId,
        handoff: Option<Handoff>,
    ) -> BadgeResult<()> {
        let request = self.switch(env, target, handoff)?;
        self.follow(env, request)
    }

    /// Return to the menu on behalf of `requester`. Returns `Ok(false)` if
    /// the requester is no longer active. A requester that is the stored
    /// application is forgotten, so a later restore goes to the menu.
    pub fn back_to_menu(&mut self, env: &mut Environment<'_>, requester: AppId) -> BadgeResult<bool> {
        let current = self.current.ok_or(BadgeError::NotStarted)?;
        if current != requester {
            self.forget_stored(requester);
            return Ok(false);
        }
        let menu = self.menu;
        self.change_app(env, menu, None)?;
        Ok(true)
    }

    /// Remember the active application for a later [`restore_stored`](Self::restore_stored)
    pub fn store_current(&mut self) {
        self.stored = self.current;
    }

    pub fn stored_app(&self) -> Option<AppId> {
        self.stored
    }

    /// Return to the stored application, or to the menu if none is stored
    pub fn restore_stored(&mut self, env: &mut Environment<'_>) -> BadgeResult<()> {
        let target = self.stored.take().unwrap_or(self.menu);
        self.change_app(env, target, None)
    }

    /// Deliver an input event to the active application
    pub fn on_button(&mut self, env: &mut Environment<'_>, button: Button) -> BadgeResult<()> {
        let current = self.current.ok_or(BadgeError::NotStarted)?;
        let request = self.invoke(env, current, |app, ctx| app.on_button(ctx, button))?;
        self.follow(env, request)
    }

    /// Run the periodic routine of `id`
    pub fn run_routine(&mut self, env: &mut Environment<'_>, id: AppId) -> BadgeResult<()> {
        let request = self.invoke(env, id, |app, ctx| app.routine(ctx))?;
        self.follow(env, request)
    }

    /// Hand a received packet to `id`, active or not
    pub fn deliver_packet(
        &mut self,
        env: &mut Environment<'_>,
        id: AppId,
        packet: &[u8],
    ) -> BadgeResult<()> {
        let request = self.invoke(env, id, |app, ctx| app.on_packet(ctx, packet))?;
        self.follow(env, request)
    }

    fn switch(
        &mut self,
        env: &mut Environment<'_>,
        target: AppId,
        handoff: Option<Handoff>,
    ) -> BadgeResult<Option<Transfer>> {
        let from = self.current.ok_or(BadgeError::NotStarted)?;
        if !self.contains(target) {
            return Err(BadgeError::UnknownApp);
        }

        if let Some(dropped) = self.invoke(env, from, |app, ctx| app.on_exit(ctx))? {
            debug!("{}: transfer {:?} requested on exit dropped", from, dropped);
        }
        self.current = Some(target);
        self.switches = self.switches.wrapping_add(1);
        info!("switch {} -> {}", from, target);

        if let Some(handoff) = handoff {
            self.invoke_plain(target, |app| app.accept(handoff))?;
        }
        self.invoke(env, target, |app, ctx| app.on_entry(ctx))
    }

    fn follow(&mut self, env: &mut Environment<'_>, mut request: Option<Transfer>) -> BadgeResult<()> {
        let mut hops = 0;
        while let Some(transfer) = request.take() {
            if hops == MAX_CHAINED_TRANSFERS {
                warn!("transfer chain too long, {:?} dropped", transfer);
                break;
            }
            hops += 1;

            request = match transfer {
                Transfer::To { target, handoff } => self.switch(env, target, handoff)?,
                Transfer::BackToMenu { requester } => {
                    if self.current == Some(requester) {
                        let menu = self.menu;
                        self.switch(env, menu, None)?
                    } else {
                        self.forget_stored(requester);
                        None
                    }
                }
                Transfer::RestoreStored => {
                    let target = self.stored.take().unwrap_or(self.menu);
                    self.switch(env, target, None)?
                }
            };
        }
        Ok(())
    }

    /// A parked application asking to leave is not returned to
    fn forget_stored(&mut self, requester: AppId) {
        if self.stored == Some(requester) {
            debug!("stored {} dropped on its back-to-menu", requester);
            self.stored = None;
        } else {
            debug!("stale back-to-menu from {} ignored", requester);
        }
    }

    fn invoke<F>(&mut self, env: &mut Environment<'_>, id: AppId, f: F) -> BadgeResult<Option<Transfer>>
    where
        F: FnOnce(&mut dyn App, &mut AppContext<'_>),
    {
        let current = self.current.ok_or(BadgeError::NotStarted)?;
        let entry = self
            .roster
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(BadgeError::UnknownApp)?;

        let mut ctx = AppContext::new(
            id,
            entry.task,
            current,
            env.now,
            &mut *env.tasks,
            env.services.reborrow(),
            &mut *env.link,
        );
        f(entry.app.as_mut(), &mut ctx);
        Ok(ctx.take_request())
    }

    fn invoke_plain<F>(&mut self, id: AppId, f: F) -> BadgeResult<()>
    where
        F: FnOnce(&mut dyn App),
    {
        let entry = self
            .roster
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(BadgeError::UnknownApp)?;
        f(entry.app.as_mut());
        Ok(())
    }
}

/// Register `app` with the controller and, if it has a routine, its
/// periodic task with the scheduler. The task context is built from the
/// application id.
pub fn register_app<C, const T: usize, const N: usize>(
    sched: &mut Scheduler<C, T>,
    controller: &mut AppController<N>,
    id: AppId,
    app: Box<dyn App>,
) -> BadgeResult<Option<TaskId>>
where
    C: Clone + From<AppId>,
{
    if controller.contains(id) {
        return Err(BadgeError::DuplicateApp);
    }
    let task = match app.task() {
        Some(routine) => Some(sched.register(TaskDescriptor::periodic(
            app.name(),
            routine.priority,
            routine.interval,
            C::from(id),
        ))?),
        None => None,
    };
    controller.register(id, task, app)?;
    Ok(task)
}
