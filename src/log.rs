//! File logger for cato.
//!
//! Lines go to `~/.cato/cato.log` once [`init`] has run. Until then every
//! call is dropped before formatting, so the analysis code can log from
//! library callers and tests that never configure a file. A line carries
//! the UTC time, the level and the emitting module:
//!
//! ```text
//! 2025-06-02T14:00:00.123Z WARN  cato::core::dag  DependencyGraph: 1 dangling reference(s)
//! ```
//!
//! Levels as used across the crate:
//! - ERROR: a snapshot or config file was rejected
//! - WARN: tolerated upstream drift (dangling ids, diverging dependents)
//! - INFO: snapshot swaps
//! - DEBUG: analysis summaries, playback start and stop
//! - TRACE: every playback tick
//!
//! `CATO_LOG=<level>` picks the level; `CATO_DEBUG=1` is shorthand for debug.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Mutex, OnceLock};

use chrono::Utc;

use crate::config::Config;
use crate::{Error, Result};

static SINK: OnceLock<Mutex<File>> = OnceLock::new();
static MAX_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const ALL: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Validation(format!("unknown log level {:?}", s)))
    }
}

fn level_from_env() -> LogLevel {
    if let Some(level) = std::env::var("CATO_LOG").ok().and_then(|v| v.parse().ok()) {
        return level;
    }
    match std::env::var("CATO_DEBUG").as_deref() {
        Ok("1") | Ok("true") => LogLevel::Debug,
        _ => LogLevel::Info,
    }
}

/// Log to `~/.cato/cato.log` at the level taken from the environment.
pub fn init() -> Result<()> {
    init_with_debug(false)
}

/// Like [`init`]; `debug` raises the level to at least DEBUG.
pub fn init_with_debug(debug: bool) -> Result<()> {
    let level = match level_from_env() {
        level if debug => level.max(LogLevel::Debug),
        level => level,
    };
    let dir = Config::cato_dir()?;
    std::fs::create_dir_all(&dir)?;
    init_with_path(&dir.join("cato.log"), level)
}

/// Truncate `path` and send every later line there.
///
/// The first call in a process owns the file; later calls only change the level.
pub fn init_with_path(path: &Path, level: LogLevel) -> Result<()> {
    set_level(level);
    if SINK.get().is_none() {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        let _ = SINK.set(Mutex::new(file));
    }
    Ok(())
}

pub fn set_level(level: LogLevel) {
    MAX_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Whether a line at `level` would be written.
pub fn enabled(level: LogLevel) -> bool {
    level as u8 <= MAX_LEVEL.load(Ordering::Relaxed) && SINK.get().is_some()
}

#[doc(hidden)]
pub fn write(level: LogLevel, target: &str, args: std::fmt::Arguments<'_>) {
    let Some(sink) = SINK.get() else {
        return;
    };
    let Ok(mut file) = sink.lock() else {
        return;
    };
    let _ = writeln!(
        file,
        "{} {:<5} {}  {}",
        Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
        level.as_str(),
        target,
        args
    );
}

/// Log at an explicit level, tagged with the calling module.
#[macro_export]
macro_rules! clog_at {
    ($level:expr, $($arg:tt)*) => {
        if $crate::log::enabled($level) {
            $crate::log::write($level, module_path!(), format_args!($($arg)*));
        }
    };
}

#[macro_export]
macro_rules! clog {
    ($($arg:tt)*) => {
        $crate::clog_at!($crate::log::LogLevel::Info, $($arg)*)
    };
}

#[macro_export]
macro_rules! clog_error {
    ($($arg:tt)*) => {
        $crate::clog_at!($crate::log::LogLevel::Error, $($arg)*)
    };
}

#[macro_export]
macro_rules! clog_warn {
    ($($arg:tt)*) => {
        $crate::clog_at!($crate::log::LogLevel::Warn, $($arg)*)
    };
}

#[macro_export]
macro_rules! clog_debug {
    ($($arg:tt)*) => {
        $crate::clog_at!($crate::log::LogLevel::Debug, $($arg)*)
    };
}

/// Per-tick output; formatting is skipped unless TRACE is on.
#[macro_export]
macro_rules! clog_trace {
    ($($arg:tt)*) => {
        $crate::clog_at!($crate::log::LogLevel::Trace, $($arg)*)
    };
}
