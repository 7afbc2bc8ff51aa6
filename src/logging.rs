/*!
 * Injected logging capability.
 *
 * The translation model, the book translator and the writer take an
 * `Arc<dyn LogSink>` instead of writing to the process logger directly, so a
 * test can hand them a `CaptureLog` and assert on what was reported.
 */

use log::Level;
use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::Arc;

/// A captured log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
}

/// Destination for diagnostics emitted while translating a book
pub trait LogSink: Send + Sync + Debug {
    fn log(&self, level: Level, message: &str);

    fn error(&self, message: &str) {
        self.log(Level::Error, message);
    }

    fn warn(&self, message: &str) {
        self.log(Level::Warn, message);
    }

    fn info(&self, message: &str) {
        self.log(Level::Info, message);
    }

    fn debug(&self, message: &str) {
        self.log(Level::Debug, message);
    }
}

/// Shared handle passed to components
pub type SharedLog = Arc<dyn LogSink>;

/// Forwards to the `log` facade, and from there to whatever logger the binary installed
#[derive(Debug, Default, Clone, Copy)]
pub struct StdLogSink;

impl StdLogSink {
    pub fn shared() -> SharedLog {
        Arc::new(Self)
    }
}

impl LogSink for StdLogSink {
    fn log(&self, level: Level, message: &str) {
        log::log!(level, "{}", message);
    }
}

/// Records every entry in memory
#[derive(Debug, Default, Clone)]
pub struct CaptureLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl CaptureLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the entries recorded so far
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Whether some entry at `level` contains `needle`
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.entries
            .lock()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }

    pub fn count(&self, level: Level) -> usize {
        self.entries.lock().iter().filter(|e| e.level == level).count()
    }
}

impl LogSink for CaptureLog {
    fn log(&self, level: Level, message: &str) {
        self.entries.lock().push(LogEntry {
            level,
            message: message.to_string(),
        });
    }
}
