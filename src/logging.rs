//! Diagnostic logging setup
//!
//! The library only emits `tracing` events; the binary installs a subscriber
//! through [`init_with_level`]. Log lines go to stderr so they never mix with
//! the instruction trace written to the output file.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Initialize logging at WARN, the default for non-verbose runs
pub fn init() {
    init_with_level(LogLevel::Warn);
}

/// Initialize logging with a custom level (`LEVEL message`, no timestamps)
///
/// Calling it a second time is a no-op.
pub fn init_with_level(level: LogLevel) {
    let filter = tracing_subscriber::filter::LevelFilter::from_level(level.into());

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_level(true)
        .compact()
        .with_filter(filter);

    let _ = Registry::default().with(layer).try_init();
}
