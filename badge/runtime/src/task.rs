//! Task contexts of the assembled device

use badge_app::AppId;
use badge_core::Message;

/// Id of the versus game in the roster
pub const VERSUS_APP: AppId = AppId(3);

/// What a scheduled task is for, and the data it runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskContext {
    /// Periodic routine of an application
    App(AppId),
    /// Periodic IR routine; arms a broadcast attempt
    IrRoutine,
    /// One broadcast attempt
    IrBroadcast,
    /// Put a received announcement on screen
    ShowText(Message),
}

impl From<AppId> for TaskContext {
    fn from(id: AppId) -> Self {
        TaskContext::App(id)
    }
}

/// Subscriber of a received IR frame type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrRoute {
    /// Game frames go to this application
    App(AppId),
    ShowText,
    SelfTest,
}
