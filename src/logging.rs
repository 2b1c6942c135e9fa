//! Logging collaborator handed to the [`Visualizer`](crate::Visualizer).

use std::cell::RefCell;
use std::fmt;

use log::{Level, LevelFilter};

/// Target used for records forwarded to the `log` facade.
pub const LOG_TARGET: &str = "autoviz";

/// Receives the visualizer's diagnostics.
pub trait LogSink {
    /// Most verbose level this sink accepts.
    fn max_level(&self) -> LevelFilter;

    fn record(&self, level: Level, message: &str);

    fn enabled(&self, level: Level) -> bool {
        level <= self.max_level()
    }

    fn log(&self, level: Level, message: &str) {
        if self.enabled(level) {
            self.record(level, message);
        }
    }

    /// Like [`log`](LogSink::log), but only formats `args` when the level
    /// is enabled.
    fn log_fmt(&self, level: Level, args: fmt::Arguments<'_>) {
        if self.enabled(level) {
            self.record(level, &args.to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// LogFacade – forwards to the `log` crate
// ---------------------------------------------------------------------------

/// Forwards records to whatever logger the binary installed (`env_logger`
/// in `autoviz`), filtered at an explicit level.
#[derive(Debug, Clone, Copy)]
pub struct LogFacade {
    level: LevelFilter,
}

impl LogFacade {
    pub fn new(level: LevelFilter) -> Self {
        LogFacade { level }
    }
}

impl Default for LogFacade {
    fn default() -> Self {
        LogFacade::new(LevelFilter::Info)
    }
}

impl LogSink for LogFacade {
    fn max_level(&self) -> LevelFilter {
        self.level
    }

    fn record(&self, level: Level, message: &str) {
        log::log!(target: LOG_TARGET, level, "{message}");
    }
}

// ---------------------------------------------------------------------------
// MemorySink – keeps records for inspection
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct MemorySink {
    level: LevelFilter,
    records: RefCell<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new(level: LevelFilter) -> Self {
        MemorySink {
            level,
            records: RefCell::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<(Level, String)> {
        self.records.borrow().clone()
    }

    /// Messages logged at exactly `level`.
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.records
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        MemorySink::new(LevelFilter::Trace)
    }
}

impl LogSink for MemorySink {
    fn max_level(&self) -> LevelFilter {
        self.level
    }

    fn record(&self, level: Level, message: &str) {
        self.records.borrow_mut().push((level, message.to_string()));
    }
}

impl<S: LogSink + ?Sized> LogSink for &S {
    fn max_level(&self) -> LevelFilter {
        (**self).max_level()
    }

    fn record(&self, level: Level, message: &str) {
        (**self).record(level, message);
    }
}
