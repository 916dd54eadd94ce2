//! Scheduler configuration

/// Sink for scheduler trace records (see [`records`](crate::records))
pub type TraceHook = fn(record: u8, payload: &[u8]);

/// Configuration for the scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub name: &'static str,
    pub trace_hook: Option<TraceHook>,
    pub idle_callback: Option<fn()>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            name: "badge",
            trace_hook: None,
            idle_callback: None,
        }
    }
}

impl SchedulerConfig {
    /// Creates a new scheduler configuration builder.
    pub fn builder() -> SchedulerConfigBuilder {
        SchedulerConfigBuilder::default()
    }
}

/// Builder for ergonomic scheduler configuration construction.
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfigBuilder {
    config: SchedulerConfig,
}

impl SchedulerConfigBuilder {
    /// Sets the scheduler name used in log lines.
    pub fn name(mut self, name: &'static str) -> Self {
        self.config.name = name;
        self
    }

    /// Sets the trace record sink.
    pub fn trace_hook(mut self, hook: TraceHook) -> Self {
        self.config.trace_hook = Some(hook);
        self
    }

    /// Sets the callback invoked after a tick pass with nothing due.
    pub fn idle_callback(mut self, callback: fn()) -> Self {
        self.config.idle_callback = Some(callback);
        self
    }

    /// Builds the scheduler configuration.
    pub fn build(self) -> SchedulerConfig {
        self.config
    }
}
