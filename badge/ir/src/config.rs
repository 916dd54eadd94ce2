//! IR channel configuration

use badge_core::{duration, priority, Duration, Priority};

use crate::frame::FrameBuf;

/// Outgoing game frames held while the link is busy
pub const GAME_QUEUE_LEN: usize = 4;

/// Configuration for the IR channel and its tasks.
#[derive(Debug, Clone)]
pub struct IrConfig {
    /// Priority of the periodic routine that arms a broadcast
    pub routine_priority: Priority,
    /// How often a broadcast is attempted
    pub routine_interval: Duration,
    /// Priority of the broadcast attempt itself
    pub broadcast_priority: Priority,
    /// Priority of the task that puts a received announcement on screen
    pub show_text_priority: Priority,
    /// TTL byte written into outgoing frames
    pub ttl: u8,
    /// Frame sent by the default broadcast, if any
    pub beacon: Option<FrameBuf>,
}

impl Default for IrConfig {
    fn default() -> Self {
        Self {
            routine_priority: priority!(950),
            routine_interval: duration!(1 s),
            broadcast_priority: priority!(800),
            show_text_priority: priority!(800),
            ttl: 0,
            beacon: None,
        }
    }
}

impl IrConfig {
    pub fn builder() -> IrConfigBuilder {
        IrConfigBuilder::default()
    }
}

/// Builder for [`IrConfig`].
#[derive(Debug, Clone, Default)]
pub struct IrConfigBuilder {
    config: IrConfig,
}

impl IrConfigBuilder {
    pub fn routine_interval(mut self, interval: Duration) -> Self {
        self.config.routine_interval = interval;
        self
    }

    pub fn ttl(mut self, ttl: u8) -> Self {
        self.config.ttl = ttl;
        self
    }

    pub fn beacon(mut self, frame: FrameBuf) -> Self {
        self.config.beacon = Some(frame);
        self
    }

    pub fn build(self) -> IrConfig {
        self.config
    }
}
