//! Debug logging for plugterm.
//!
//! All output goes to `/tmp/plugterm_debug.log` on Unix/macOS, or
//! `%TEMP%\plugterm_debug.log` on Windows, so stdout stays clean for the
//! terminal stream and the MCP protocol.
//!
//! [`init_log_bridge`] installs a `log::Log` implementation so every
//! `log::info!()` etc. in the workspace crates lands in the same file. Level
//! precedence is `--log-level`, then `RUST_LOG`, then the config file's
//! `log_level` (applied later through [`apply_config_level`]). When `RUST_LOG`
//! is set, lines are mirrored to stderr.
//!
//! The `debug_*!` macros log with an explicit category instead of a module
//! path target.

use parking_lot::Mutex;
use plugterm_config::LogLevel;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Debug level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl DebugLevel {
    fn label(self) -> &'static str {
        match self {
            DebugLevel::Off => "",
            DebugLevel::Error => "ERROR",
            DebugLevel::Warn => "WARN ",
            DebugLevel::Info => "INFO ",
            DebugLevel::Debug => "DEBUG",
            DebugLevel::Trace => "TRACE",
        }
    }

    fn to_level_filter(self) -> log::LevelFilter {
        match self {
            DebugLevel::Off => log::LevelFilter::Off,
            DebugLevel::Error => log::LevelFilter::Error,
            DebugLevel::Warn => log::LevelFilter::Warn,
            DebugLevel::Info => log::LevelFilter::Info,
            DebugLevel::Debug => log::LevelFilter::Debug,
            DebugLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl From<log::Level> for DebugLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => DebugLevel::Error,
            log::Level::Warn => DebugLevel::Warn,
            log::Level::Info => DebugLevel::Info,
            log::Level::Debug => DebugLevel::Debug,
            log::Level::Trace => DebugLevel::Trace,
        }
    }
}

impl From<log::LevelFilter> for DebugLevel {
    fn from(filter: log::LevelFilter) -> Self {
        filter.to_level().map_or(DebugLevel::Off, DebugLevel::from)
    }
}

impl From<LogLevel> for DebugLevel {
    fn from(level: LogLevel) -> Self {
        DebugLevel::from(level.to_level_filter())
    }
}

/// Parse a `RUST_LOG` value. Only levels are honoured; per-target directives
/// (`crate=debug`) contribute their level, and the most verbose one wins.
pub fn parse_rust_log(value: &str) -> DebugLevel {
    value
        .split(',')
        .filter_map(|directive| {
            let level = directive.rsplit('=').next().unwrap_or(directive).trim();
            level.parse::<log::LevelFilter>().ok()
        })
        .map(DebugLevel::from)
        .max()
        .unwrap_or(DebugLevel::Info)
}

/// Global debug logger
struct DebugLogger {
    level: DebugLevel,
    file: Option<File>,
    mirror_stderr: bool,
    /// Set when the CLI or `RUST_LOG` chose the level; config can't override.
    locked: bool,
}

impl DebugLogger {
    fn new() -> Self {
        DebugLogger {
            level: DebugLevel::Off,
            file: None,
            mirror_stderr: false,
            locked: false,
        }
    }

    fn set_level(&mut self, level: DebugLevel) {
        self.level = level;
        if level != DebugLevel::Off && self.file.is_none() {
            self.open_file();
        }
        log::set_max_level(level.to_level_filter());
    }

    fn open_file(&mut self) {
        // Silently fail if the log file can't be opened; stderr mirroring (if
        // any) still works.
        if let Ok(f) = OpenOptions::new()
            .write(true)
            .truncate(true)
            .create(true)
            .open(log_path())
        {
            self.file = Some(f);
            self.write_raw(&format!(
                "\n{}\nplugterm debug session started at {} (level={:?})\n{}\n",
                "=".repeat(80),
                get_timestamp(),
                self.level,
                "=".repeat(80)
            ));
        }
    }

    fn write_raw(&mut self, msg: &str) {
        if let Some(ref mut file) = self.file {
            let _ = file.write_all(msg.as_bytes());
            let _ = file.flush();
        }
    }

    fn log(&mut self, level: DebugLevel, category: &str, msg: &str) {
        if level == DebugLevel::Off || level > self.level {
            return;
        }
        let line = format!(
            "[{}] [{}] [{}] {}\n",
            get_timestamp(),
            level.label(),
            category,
            msg
        );
        if self.mirror_stderr {
            eprint!("{line}");
        }
        self.write_raw(&line);
    }
}

static LOGGER: OnceLock<Mutex<DebugLogger>> = OnceLock::new();

fn get_logger() -> &'static Mutex<DebugLogger> {
    LOGGER.get_or_init(|| Mutex::new(DebugLogger::new()))
}

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}.{:06}", now.as_secs(), now.subsec_micros())
}

/// Path of the debug log file.
pub fn log_path() -> PathBuf {
    #[cfg(unix)]
    {
        PathBuf::from("/tmp/plugterm_debug.log")
    }
    #[cfg(not(unix))]
    {
        std::env::temp_dir().join("plugterm_debug.log")
    }
}

struct LogBridge;

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        DebugLevel::from(metadata.level()) <= get_logger().lock().level
    }

    fn log(&self, record: &log::Record<'_>) {
        let mut logger = get_logger().lock();
        logger.log(
            DebugLevel::from(record.level()),
            record.target(),
            &record.args().to_string(),
        );
    }

    fn flush(&self) {}
}

static BRIDGE: LogBridge = LogBridge;

/// Install the `log` bridge. `cli_level` comes from `--log-level`.
///
/// Safe to call more than once; only the first call installs the logger.
pub fn init_log_bridge(cli_level: Option<LogLevel>) {
    let rust_log = std::env::var("RUST_LOG").ok().filter(|v| !v.trim().is_empty());

    let (level, locked) = match (cli_level, rust_log.as_deref()) {
        (Some(level), _) => (DebugLevel::from(level), true),
        (None, Some(value)) => (parse_rust_log(value), true),
        (None, None) => (DebugLevel::Off, false),
    };

    {
        let mut logger = get_logger().lock();
        logger.mirror_stderr = rust_log.is_some();
        logger.locked = locked;
        logger.set_level(level);
    }

    if log::set_logger(&BRIDGE).is_err() {
        return;
    }
    log::set_max_level(level.to_level_filter());
}

/// Apply the config file's `log_level` unless the CLI or `RUST_LOG` already
/// chose one.
pub fn apply_config_level(level: LogLevel) {
    let mut logger = get_logger().lock();
    if logger.locked {
        return;
    }
    logger.set_level(DebugLevel::from(level));
}

/// Check if debugging is enabled at given level
pub fn is_enabled(level: DebugLevel) -> bool {
    let logger = get_logger().lock();
    level != DebugLevel::Off && level <= logger.level
}

/// Log a message at specified level
pub fn log(level: DebugLevel, category: &str, msg: &str) {
    let mut logger = get_logger().lock();
    logger.log(level, category, msg);
}

/// Log formatted message
pub fn logf(level: DebugLevel, category: &str, args: fmt::Arguments) {
    if is_enabled(level) {
        log(level, category, &format!("{}", args));
    }
}

// Convenience macros for logging
#[macro_export]
macro_rules! debug_error {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Error, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_info {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Info, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_log {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Debug, $category, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_trace {
    ($category:expr, $($arg:tt)*) => {
        $crate::debug::logf($crate::debug::DebugLevel::Trace, $category, format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rust_log() {
        assert_eq!(parse_rust_log("debug"), DebugLevel::Debug);
        assert_eq!(parse_rust_log("warn,plugterm_modules=trace"), DebugLevel::Trace);
        assert_eq!(parse_rust_log("plugterm=error"), DebugLevel::Error);
        assert_eq!(parse_rust_log("nonsense"), DebugLevel::Info);
    }

    #[test]
    fn test_level_conversions() {
        assert_eq!(DebugLevel::from(LogLevel::Off), DebugLevel::Off);
        assert_eq!(DebugLevel::from(LogLevel::Warn), DebugLevel::Warn);
        assert_eq!(DebugLevel::from(log::Level::Trace), DebugLevel::Trace);
        assert!(DebugLevel::Error < DebugLevel::Trace);
    }
}
