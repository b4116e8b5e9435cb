//! File logging for the graph engine and the `taskdag` CLI.
//!
//! - ERROR: a snapshot or command could not be processed at all
//! - WARN: rejected dependency requests, skipped snapshot references
//! - INFO: snapshot loads, confirmed mutations, CLI commands
//! - DEBUG: per-edge validation, layout recomputation
//! - TRACE: pointer and hover traffic
//!
//! Nothing is written until one of the `init` functions has run. Verbosity
//! comes from the CLI (`-d` for DEBUG, `-dd` for TRACE) or from
//! `TASKDAG_DEBUG` (`1`/`true`/`debug`, or `trace`), whichever is higher.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();
static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Level for a `-d` count: 0 is INFO, 1 is DEBUG, 2 or more is TRACE.
    pub fn from_verbosity(verbosity: u8) -> Self {
        match verbosity {
            0 => LogLevel::Info,
            1 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    /// Level requested by a `TASKDAG_DEBUG` value, if it names one.
    fn from_env_value(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "1" | "true" | "debug" => Some(LogLevel::Debug),
            "2" | "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }
}

/// Effective level for a CLI verbosity and an optional env value.
pub fn resolve_level(verbosity: u8, env: Option<&str>) -> LogLevel {
    let cli = LogLevel::from_verbosity(verbosity);
    match env.and_then(LogLevel::from_env_value) {
        Some(level) => level.max(cli),
        None => cli,
    }
}

/// Initialize logging to ~/.taskdag/taskdag.log.
pub fn init_with_verbosity(verbosity: u8) {
    let env = std::env::var("TASKDAG_DEBUG").ok();
    let level = resolve_level(verbosity, env.as_deref());
    match dirs::home_dir() {
        Some(home) => init_at(home.join(".taskdag").join("taskdag.log"), level),
        None => set_level(level),
    }
}

/// Initialize logging to an explicit file at `level`. The file is truncated.
pub fn init_at(path: PathBuf, level: LogLevel) {
    set_level(level);

    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = std::fs::write(&path, "");
    LOG_PATH.set(path).ok();
}

fn set_level(level: LogLevel) {
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

pub fn get_level() -> LogLevel {
    LogLevel::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Log a message at the specified level.
pub fn log_at(level: LogLevel, msg: &str) {
    if level > get_level() {
        return;
    }

    if let Some(path) = LOG_PATH.get() {
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
            let _ = writeln!(file, "[{}] [{}] {}", timestamp, level.as_str(), msg);
        }
    }
}

pub fn log(msg: &str) {
    log_at(LogLevel::Info, msg);
}

pub fn error(msg: &str) {
    log_at(LogLevel::Error, msg);
}

pub fn warn(msg: &str) {
    log_at(LogLevel::Warn, msg);
}

pub fn debug(msg: &str) {
    log_at(LogLevel::Debug, msg);
}

pub fn trace(msg: &str) {
    log_at(LogLevel::Trace, msg);
}

/// Log macro for INFO level.
#[macro_export]
macro_rules! tdlog {
    ($($arg:tt)*) => {
        $crate::log::log(&format!($($arg)*))
    };
}

/// Log macro for ERROR level.
#[macro_export]
macro_rules! tdlog_error {
    ($($arg:tt)*) => {
        $crate::log::error(&format!($($arg)*))
    };
}

/// Log macro for WARN level.
#[macro_export]
macro_rules! tdlog_warn {
    ($($arg:tt)*) => {
        $crate::log::warn(&format!($($arg)*))
    };
}

/// Log macro for DEBUG level (only logs when debug mode is enabled).
#[macro_export]
macro_rules! tdlog_debug {
    ($($arg:tt)*) => {
        $crate::log::debug(&format!($($arg)*))
    };
}

/// Log macro for TRACE level.
#[macro_export]
macro_rules! tdlog_trace {
    ($($arg:tt)*) => {
        $crate::log::trace(&format!($($arg)*))
    };
}
