use heapless::Vec;
use log::debug;

use badge_core::{BadgeError, BadgeResult, Button};

use crate::app::{App, AppId, Handoff};
use crate::context::AppContext;

/// Default number of menu entries
pub const MAX_MENU_ENTRIES: usize = 8;

/// One selectable line of the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: &'static str,
    pub target: AppId,
    pub handoff: Option<Handoff>,
}

/// Scrolls the selected entry's label; directions move the selection and
/// OK enters the selected application.
pub struct MenuApp<const N: usize = MAX_MENU_ENTRIES> {
    entries: Vec<MenuEntry, N>,
    selected: usize,
}

impl<const N: usize> MenuApp<N> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            selected: 0,
        }
    }

    pub fn add(
        &mut self,
        label: &'static str,
        target: AppId,
        handoff: Option<Handoff>,
    ) -> BadgeResult<()> {
        self.entries
            .push(MenuEntry {
                label,
                target,
                handoff,
            })
            .map_err(|_| BadgeError::AppRosterFull)
    }

    pub fn selected(&self) -> Option<&MenuEntry> {
        self.entries.get(self.selected)
    }

    fn step(&mut self, forward: bool) {
        let len = self.entries.len();
        if len == 0 {
            return;
        }
        self.selected = if forward {
            (self.selected + 1) % len
        } else {
            (self.selected + len - 1) % len
        };
    }

    fn render(&self, ctx: &mut AppContext<'_>) {
        if let Some(entry) = self.selected() {
            ctx.services.display.scroll_text(entry.label);
        }
    }
}

impl<const N: usize> Default for MenuApp<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> App for MenuApp<N> {
    fn name(&self) -> &'static str {
        "menu"
    }

    fn on_entry(&mut self, ctx: &mut AppContext<'_>) {
        self.render(ctx);
    }

    fn on_exit(&mut self, _ctx: &mut AppContext<'_>) {}

    fn on_button(&mut self, ctx: &mut AppContext<'_>, button: Button) {
        match button {
            Button::Up | Button::Left => {
                self.step(false);
                self.render(ctx);
            }
            Button::Down | Button::Right => {
                self.step(true);
                self.render(ctx);
            }
            Button::Ok => {
                if let Some(entry) = self.selected().copied() {
                    debug!("menu: enter '{}'", entry.label);
                    ctx.change_app(entry.target, entry.handoff);
                }
            }
            _ => {}
        }
    }
}
