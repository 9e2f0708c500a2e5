//! Scheduler configuration.

/// Host run mode, used only to pick the log severity for task failures.
///
/// An unsuppressed panic in a user callback logs at `error` severity when the
/// host is interactive (a developer is watching) and at `info` severity in
/// batch runs, where per-task failures are expected noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunMode {
    /// Interactive session (editor or attached developer).
    #[default]
    Interactive,
    /// Headless / automated run.
    Batch,
}

impl RunMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RunMode::Interactive => "interactive",
            RunMode::Batch => "batch",
        }
    }
}

/// Construction-time settings for [`Scheduler`].
///
/// [`Scheduler`]: crate::Scheduler
#[derive(Debug, Clone, Copy)]
pub struct SchedulerConfig {
    /// Selects failure log severity; see [`RunMode`].
    pub run_mode: RunMode,
    /// Initial capacity of the active task list.
    pub initial_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            run_mode: RunMode::default(),
            initial_capacity: 64,
        }
    }
}
