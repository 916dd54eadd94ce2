//! Versus application configuration

use badge_app::AppId;
use badge_core::{duration, priority, ActivityKind, Duration, Priority, Username};

/// Configuration for [`VersusApp`](crate::VersusApp).
#[derive(Debug, Clone, Copy)]
pub struct VersusConfig {
    pub name: &'static str,
    /// Priority of the game update routine
    pub priority: Priority,
    /// How often the game update routine runs
    pub interval: Duration,
    /// Scoring and best-score slot for this game
    pub kind: ActivityKind,
    /// Application that presents the final score
    pub score_app: AppId,
    /// Name sent to the peer; the stored username when unset
    pub username: Option<Username>,
}

impl Default for VersusConfig {
    fn default() -> Self {
        Self {
            name: "versus",
            priority: priority!(900),
            interval: duration!(20 ms),
            kind: ActivityKind::STACKER,
            score_app: AppId::SCORE,
            username: None,
        }
    }
}
