use badge_core::{duration, priority, Button, Message};

use crate::app::{App, AppTask, Handoff};
use crate::context::AppContext;

/// Scrolls a received message once, then hands control back to whatever
/// application was stored before it was entered.
#[derive(Debug, Default)]
pub struct ShowTextApp {
    message: Message,
}

impl ShowTextApp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> &Message {
        &self.message
    }
}

impl App for ShowTextApp {
    fn name(&self) -> &'static str {
        "show-text"
    }

    fn task(&self) -> Option<AppTask> {
        Some(AppTask::new(priority!(850), duration!(100 ms)))
    }

    fn accept(&mut self, handoff: Handoff) {
        if let Handoff::Message(message) = handoff {
            self.message = message;
        }
    }

    fn on_entry(&mut self, ctx: &mut AppContext<'_>) {
        ctx.services.display.scroll_text(self.message.as_str());
        ctx.enable_routine();
    }

    fn on_exit(&mut self, ctx: &mut AppContext<'_>) {
        ctx.disable_routine();
    }

    fn on_button(&mut self, ctx: &mut AppContext<'_>, _button: Button) {
        ctx.restore_stored();
    }

    fn routine(&mut self, ctx: &mut AppContext<'_>) {
        if ctx.is_active() && ctx.services.display.scroll_completed() {
            ctx.restore_stored();
        }
    }
}
