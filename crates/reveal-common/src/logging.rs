//! Unified logging bootstrap
//!
//! Every crate logs through `tracing` macros. Binaries and tests call [`init`]
//! once to install a formatting subscriber capped at the configured level.

use std::str::FromStr;

use thiserror::Error;

/// Log levels accepted by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Returned when a level string is not one of `debug|info|warn|error`
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown log level: {0}")]
pub struct UnknownLogLevel(pub String);

impl LogLevel {
    /// Lowercase name used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Maximum verbosity handed to the subscriber
    pub fn to_tracing(&self) -> tracing::Level {
        match self {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = UnknownLogLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(UnknownLogLevel(s.to_string())),
        }
    }
}

/// Logging configuration options
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Least severe level still emitted
    pub level: LogLevel,
    /// Include module targets in each line
    pub with_target: bool,
    /// Use the compact single-line formatter
    pub compact: bool,
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed, which happens when
/// several tests in one binary each initialise logging.
pub fn init(options: LogOptions) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_max_level(options.level.to_tracing())
        .with_target(options.with_target);

    let installed = if options.compact {
        builder.compact().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        tracing::debug!(level = options.level.as_str(), "logging initialised");
    }
    installed
}

/// Format an error with its cause chain
pub fn format_error(error: &dyn std::error::Error) -> String {
    format_error_recursive(error, 0)
}

fn format_error_recursive(error: &dyn std::error::Error, depth: usize) -> String {
    const MAX_DEPTH: usize = 10;

    let base = error.to_string();
    if depth >= MAX_DEPTH {
        return base;
    }

    match error.source() {
        Some(source) => format!("{} Caused by: {}", base, format_error_recursive(source, depth + 1)),
        None => base,
    }
}
