//! The assembled device

use alloc::boxed::Box;
use alloc::vec::Vec;

use log::{debug, info, trace, warn};

use badge_app::{
    register_app, App, AppController, AppId, Environment, Handoff, MenuApp, PlayerCount,
    ScoreApp, ShowTextApp,
};
use badge_core::{BadgeResult, Button, Instant, Message};
use badge_ir::{IrChannel, IrInbox, IrSelfTest, IrTransport, PacketType};
use badge_sched::{Due, Runnable, Scheduler, TaskControl, TaskDescriptor, TaskId};
use badge_versus::{GameEngine, VersusApp};

use crate::config::BadgeConfig;
use crate::services::ServiceSet;
use crate::task::{IrRoute, TaskContext, VERSUS_APP};

#[derive(Debug, Clone, Copy)]
struct IrTasks {
    routine: TaskId,
    broadcast: TaskId,
    show_text: TaskId,
}

/// Everything the scheduler's tasks act on
struct World<T> {
    controller: AppController,
    ir: IrChannel<T, IrRoute>,
    services: ServiceSet,
    self_test: IrSelfTest,
    tasks: IrTasks,
}

impl<T: IrTransport> World<T> {
    fn show_text(&mut self, tasks: &mut dyn TaskControl, now: Instant, message: Message) {
        if self.controller.current_app() != Some(AppId::SHOW_TEXT) {
            self.controller.store_current();
        }
        let mut env = Environment::new(now, tasks, self.services.services(), &mut self.ir);
        let handoff = Some(Handoff::Message(message));
        if let Err(err) = self.controller.change_app(&mut env, AppId::SHOW_TEXT, handoff) {
            warn!("show text: {}", err);
        }
    }

    fn receive(&mut self, sched: &mut Scheduler<TaskContext>, now: Instant, bytes: &[u8]) {
        let delivery = match self.ir.on_packet_received(bytes) {
            Some(delivery) => delivery,
            None => return,
        };
        match delivery.subscriber {
            IrRoute::App(id) => {
                let mut env = Environment::new(now, sched, self.services.services(), &mut self.ir);
                if let Err(err) = self
                    .controller
                    .deliver_packet(&mut env, id, delivery.frame.payload)
                {
                    warn!("game frame for {}: {}", id, err);
                }
            }
            IrRoute::ShowText => {
                // acted on by the show-text task, not inside the receive path
                if let Some(message) = delivery.frame.message() {
                    let context = Some(TaskContext::ShowText(message));
                    match sched.queue_with(self.tasks.show_text, context) {
                        Ok(true) => debug!("show '{}' queued", message),
                        Ok(false) => debug!("show '{}' dropped, one already pending", message),
                        Err(err) => warn!("show text task: {}", err),
                    }
                }
            }
            IrRoute::SelfTest => {
                if let Some(message) = delivery.frame.message() {
                    self.self_test.check(&message);
                }
            }
        }
    }
}

impl<T: IrTransport> Runnable<TaskContext> for World<T> {
    fn run(&mut self, tasks: &mut dyn TaskControl, due: Due<TaskContext>) {
        match due.context {
            TaskContext::App(id) => {
                let mut env =
                    Environment::new(due.now, tasks, self.services.services(), &mut self.ir);
                if let Err(err) = self.controller.run_routine(&mut env, id) {
                    warn!("routine of {}: {}", id, err);
                }
            }
            TaskContext::IrRoutine => {
                if let Err(err) = tasks.queue(self.tasks.broadcast) {
                    warn!("broadcast not queued: {}", err);
                }
            }
            TaskContext::IrBroadcast => {
                let outcome = self.ir.broadcast();
                trace!("broadcast: {:?}", outcome);
            }
            TaskContext::ShowText(message) => self.show_text(tasks, due.now, message),
        }
    }
}

/// One badge: scheduler, application controller and IR link.
///
/// Built with [`Badge::builder`]; nothing runs until [`Badge::start`].
pub struct Badge<T> {
    sched: Scheduler<TaskContext>,
    world: World<T>,
    surprise: Message,
}

impl<T: IrTransport> Badge<T> {
    pub fn builder(config: BadgeConfig, transport: T, services: ServiceSet) -> BadgeBuilder<T> {
        BadgeBuilder {
            config,
            transport,
            services,
            menu: None,
            apps: Vec::new(),
            game_app: None,
        }
    }

    /// Arm the IR routine and enter the menu
    pub fn start(&mut self, now: Instant) -> BadgeResult<()> {
        let routine = self.world.tasks.routine;
        self.sched.enable_periodic(routine)?;
        self.sched.queue(routine)?;

        let world = &mut self.world;
        let mut env = Environment::new(now, &mut self.sched, world.services.services(), &mut world.ir);
        let menu = world.controller.menu();
        world.controller.start(&mut env, menu)?;
        info!("badge started");
        Ok(())
    }

    /// Run one scheduler pass. Returns the number of tasks executed.
    pub fn tick(&mut self, now: Instant) -> usize {
        self.sched.tick(now, &mut self.world)
    }

    /// Handle one received IR frame
    pub fn on_frame_received(&mut self, now: Instant, bytes: &[u8]) {
        self.world.receive(&mut self.sched, now, bytes);
    }

    /// Drain frames the receive interrupt left in `inbox`
    pub fn poll_inbox<const N: usize>(&mut self, now: Instant, inbox: &IrInbox<N>) -> usize {
        let mut handled = 0;
        while let Some(frame) = inbox.pop() {
            self.on_frame_received(now, &frame);
            handled += 1;
        }
        handled
    }

    /// Handle one button event. A long press of MODE sends the surprise
    /// announcement; everything else goes to the active application.
    pub fn press(&mut self, now: Instant, button: Button) {
        if button == Button::LongMode {
            let sent = self.world.ir.send_show(&self.surprise);
            debug!("surprise sent: {}", sent);
            return;
        }
        let world = &mut self.world;
        let mut env = Environment::new(now, &mut self.sched, world.services.services(), &mut world.ir);
        if let Err(err) = world.controller.on_button(&mut env, button) {
            warn!("button {}: {}", button, err);
        }
    }

    pub fn current_app(&self) -> Option<AppId> {
        self.world.controller.current_app()
    }

    pub fn controller(&self) -> &AppController {
        &self.world.controller
    }

    pub fn scheduler(&self) -> &Scheduler<TaskContext> {
        &self.sched
    }

    pub fn ir(&self) -> &IrChannel<T, IrRoute> {
        &self.world.ir
    }

    pub fn ir_mut(&mut self) -> &mut IrChannel<T, IrRoute> {
        &mut self.world.ir
    }

    pub fn self_test(&self) -> &IrSelfTest {
        &self.world.self_test
    }

    pub fn services(&self) -> &ServiceSet {
        &self.world.services
    }
}

/// Assembles a [`Badge`]. The menu, score and show-text applications are
/// always present; games are added on top.
pub struct BadgeBuilder<T> {
    config: BadgeConfig,
    transport: T,
    services: ServiceSet,
    menu: Option<MenuApp>,
    apps: Vec<(AppId, Box<dyn App>)>,
    game_app: Option<AppId>,
}

impl<T: IrTransport> BadgeBuilder<T> {
    /// Replace the default menu
    pub fn menu(mut self, menu: MenuApp) -> Self {
        self.menu = Some(menu);
        self
    }

    /// Add an application to the roster
    pub fn app(mut self, id: AppId, app: Box<dyn App>) -> Self {
        self.apps.push((id, app));
        self
    }

    /// Add the versus game over `engine`. Received game frames are routed
    /// to it.
    pub fn versus<G: GameEngine + 'static>(mut self, engine: G) -> Self {
        let app = VersusApp::new(engine, self.config.versus);
        self.apps.push((VERSUS_APP, Box::new(app)));
        self.game_app = Some(VERSUS_APP);
        self
    }

    pub fn build(self) -> BadgeResult<Badge<T>> {
        let config = self.config;
        let mut sched: Scheduler<TaskContext> = Scheduler::new(config.scheduler.clone());

        let tasks = IrTasks {
            routine: sched.register(TaskDescriptor::periodic(
                "ir-routine",
                config.ir.routine_priority,
                config.ir.routine_interval,
                TaskContext::IrRoutine,
            ))?,
            broadcast: sched.register(TaskDescriptor::one_shot(
                "ir-broadcast",
                config.ir.broadcast_priority,
                TaskContext::IrBroadcast,
            ))?,
            show_text: sched.register(TaskDescriptor::one_shot(
                "show-text",
                config.ir.show_text_priority,
                TaskContext::ShowText(Message::EMPTY),
            ))?,
        };

        let menu = match self.menu {
            Some(menu) => menu,
            None => {
                let mut menu = MenuApp::new();
                if self.game_app == Some(VERSUS_APP) {
                    menu.add("Solo", VERSUS_APP, Some(Handoff::Players(PlayerCount::Single)))?;
                    menu.add("Versus", VERSUS_APP, Some(Handoff::Players(PlayerCount::Multi)))?;
                }
                menu
            }
        };

        let mut controller = AppController::new(AppId::MENU);
        register_app(&mut sched, &mut controller, AppId::MENU, Box::new(menu))?;
        register_app(&mut sched, &mut controller, AppId::SCORE, Box::new(ScoreApp::new()))?;
        register_app(
            &mut sched,
            &mut controller,
            AppId::SHOW_TEXT,
            Box::new(ShowTextApp::new()),
        )?;
        for (id, app) in self.apps {
            register_app(&mut sched, &mut controller, id, app)?;
        }
        sched.start();

        let mut ir = IrChannel::new(self.transport, config.ir.clone());
        ir.subscribe(PacketType::Show, IrRoute::ShowText);
        ir.subscribe(PacketType::Test, IrRoute::SelfTest);
        if let Some(game) = self.game_app {
            ir.subscribe(PacketType::Game, IrRoute::App(game));
        }

        Ok(Badge {
            sched,
            world: World {
                controller,
                ir,
                services: self.services,
                self_test: IrSelfTest::new(config.self_test),
                tasks,
            },
            surprise: config.surprise,
        })
    }
}
