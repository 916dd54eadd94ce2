//! The application contract

use core::fmt;

use badge_core::{Button, Duration, Message, Priority};

use crate::context::AppContext;

/// Identity of a registered application
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AppId(pub u8);

impl AppId {
    pub const MENU: AppId = AppId(0);
    pub const SCORE: AppId = AppId(1);
    pub const SHOW_TEXT: AppId = AppId(2);
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "app#{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AppId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "app#{}", self.0);
    }
}

/// Scheduling parameters of an application's periodic routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppTask {
    pub priority: Priority,
    pub interval: Duration,
}

impl AppTask {
    pub const fn new(priority: Priority, interval: Duration) -> Self {
        Self { priority, interval }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCount {
    Single,
    Multi,
}

/// Typed value passed to the incoming application on a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handoff {
    /// Final score to present
    Score(u16),
    /// Text to scroll
    Message(Message),
    /// Player count chosen before a game starts
    Players(PlayerCount),
}

/// A selectable screen or mini-program.
///
/// `on_entry` and `on_exit` are always called in pairs by the controller.
/// `on_button` and `routine` are where state changes happen; an application
/// that changes what it shows rebuilds its frame before returning.
///
/// Transfers of control requested through the context are carried out
/// after the callback returns.
pub trait App {
    fn name(&self) -> &'static str;

    /// Periodic routine to register for this application, if any
    fn task(&self) -> Option<AppTask> {
        None
    }

    /// Receives the transfer value, just before `on_entry`
    fn accept(&mut self, _handoff: Handoff) {}

    fn on_entry(&mut self, ctx: &mut AppContext<'_>);

    fn on_exit(&mut self, ctx: &mut AppContext<'_>);

    fn on_button(&mut self, ctx: &mut AppContext<'_>, button: Button);

    /// Body of the periodic routine. May still run once after the
    /// application was switched away; check [`AppContext::is_active`].
    fn routine(&mut self, _ctx: &mut AppContext<'_>) {}

    /// Packet addressed to this application by the link layer. Delivered
    /// whether or not the application is active.
    fn on_packet(&mut self, _ctx: &mut AppContext<'_>, _packet: &[u8]) {}
}
