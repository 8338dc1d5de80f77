//! Run log.
//!
//! Pipeline progress goes through a process-wide [`RunLog`]: every entry is
//! printed to stderr (unless quiet) and kept so the CLI can attach the log
//! to its JSON report.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Log level for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting level for display
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    fn render(&self) -> String {
        let prefix = match self.level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
        };
        let indent = "   ".repeat(self.indent as usize);
        format!("{}{} {}", indent, prefix, self.message)
    }
}

/// Global run log
pub static RUN_LOG: Lazy<RunLog> = Lazy::new(RunLog::new);

/// Prints entries to stderr and retains them for the run report.
pub struct RunLog {
    quiet: AtomicBool,
    entries: Mutex<Vec<LogEntry>>,
}

impl RunLog {
    pub fn new() -> Self {
        Self {
            quiet: AtomicBool::new(false),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Stop printing; entries are still retained.
    pub fn set_quiet(&self, quiet: bool) {
        self.quiet.store(quiet, Ordering::Relaxed);
    }

    pub fn log(&self, entry: LogEntry) {
        if !self.quiet.load(Ordering::Relaxed) {
            eprintln!("{}", entry.render());
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }

    /// Drain the retained entries.
    pub fn take_entries(&self) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(mut entries) => std::mem::take(&mut *entries),
            Err(_) => Vec::new(),
        }
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    RUN_LOG.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    RUN_LOG.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    RUN_LOG.log(LogEntry::warning(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    RUN_LOG.log(LogEntry::info(msg).with_indent(indent));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_retained_when_quiet() {
        let log = RunLog::new();
        log.set_quiet(true);
        log.log(LogEntry::info("reading"));
        log.log(LogEntry::warning("2 rows dropped"));

        let entries = log.take_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].level, LogLevel::Warning);
        assert!(log.take_entries().is_empty());
    }

    #[test]
    fn test_render_indent_and_prefix() {
        let entry = LogEntry::success("done").with_indent(1);
        assert_eq!(entry.render(), "      ✓ done");
    }

    #[test]
    fn test_entry_serialization() {
        let json = serde_json::to_string(&LogEntry::warning("boom")).unwrap();
        assert!(json.contains("\"level\":\"warning\""));
        assert!(json.contains("\"indent\":0"));
    }
}
