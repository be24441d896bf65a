//! Conversion log output.
//!
//! Pipeline progress is reported through leveled helpers (`log_info`,
//! `log_success`, ...) that forward to the `log` facade. The binary installs
//! a `simplelog` terminal logger; library users may install any logger.

use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Log level for pipeline messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Optional indentation level (for nested logs)
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

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Message with indentation and level marker applied.
    pub fn render(&self) -> String {
        let marker = match self.level {
            LogLevel::Info => "",
            LogLevel::Success => "✓ ",
            LogLevel::Warning => "⚠ ",
            LogLevel::Error => "✗ ",
        };
        format!("{}{}{}", "   ".repeat(self.indent as usize), marker, self.message)
    }
}

/// Forward an entry to the installed logger.
pub fn emit(entry: LogEntry) {
    let line = entry.render();
    match entry.level {
        LogLevel::Info | LogLevel::Success => log::info!("{}", line),
        LogLevel::Warning => log::warn!("{}", line),
        LogLevel::Error => log::error!("{}", line),
    }
}

/// Install a terminal logger at the given level.
///
/// Calling this twice is harmless; the second logger is ignored.
pub fn init_terminal(level: LevelFilter) {
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();

    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

/// Parse a level name (`error`, `warn`, `info`, `debug`, `trace`, `off`).
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    name.trim().parse().ok()
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    emit(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    emit(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    emit(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    emit(LogEntry::error(msg));
}

pub fn log_warning_indent(msg: impl Into<String>, indent: u8) {
    emit(LogEntry::warning(msg).with_indent(indent));
}
