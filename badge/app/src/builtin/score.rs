use core::fmt::Write;

use heapless::String;

use badge_core::Button;

use crate::app::{App, Handoff};
use crate::context::AppContext;

/// Scrolls the final score of the last game. Any button returns to the menu.
#[derive(Debug, Default)]
pub struct ScoreApp {
    score: u16,
}

impl ScoreApp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u16 {
        self.score
    }

    fn text(&self) -> String<16> {
        let mut text = String::new();
        // "Score: 65535" always fits
        let _ = write!(text, "Score: {}", self.score);
        text
    }
}

impl App for ScoreApp {
    fn name(&self) -> &'static str {
        "score"
    }

    fn accept(&mut self, handoff: Handoff) {
        if let Handoff::Score(score) = handoff {
            self.score = score;
        }
    }

    fn on_entry(&mut self, ctx: &mut AppContext<'_>) {
        ctx.services.display.scroll_text(&self.text());
    }

    fn on_exit(&mut self, _ctx: &mut AppContext<'_>) {}

    fn on_button(&mut self, ctx: &mut AppContext<'_>, _button: Button) {
        ctx.back_to_menu();
    }
}
