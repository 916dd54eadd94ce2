//! Device configuration

use badge_core::Message;
use badge_ir::{IrConfig, SELF_TEST_PATTERN};
use badge_sched::SchedulerConfig;
use badge_versus::VersusConfig;

/// Text announced to nearby badges on a long press of MODE
pub const SURPRISE_TEXT: &str = "You got pwned!";

/// Everything needed to assemble a [`Badge`](crate::Badge).
#[derive(Debug, Clone)]
pub struct BadgeConfig {
    pub scheduler: SchedulerConfig,
    pub ir: IrConfig,
    pub versus: VersusConfig,
    pub surprise: Message,
    pub self_test: Message,
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            ir: IrConfig::default(),
            versus: VersusConfig::default(),
            surprise: Message::new(SURPRISE_TEXT),
            self_test: Message::new(SELF_TEST_PATTERN),
        }
    }
}
