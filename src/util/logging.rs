//! Structured logging setup for github-build
//!
//! Installs a `tracing` subscriber once per process. `RUST_LOG` takes precedence over the
//! configured level; otherwise the crate logs at the configured level and the HTTP stack
//! is capped at `warn`.
//!
//! # Example
//!
//! ```no_run
//! use github_build::util::logging;
//! use tracing::info;
//!
//! logging::init_from_env();
//! info!("Application started");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

pub const LOG_LEVEL_ENV: &str = "GITHUB_BUILD_LOG_LEVEL";
pub const LOG_JSON_ENV: &str = "GITHUB_BUILD_LOG_JSON";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for this crate's events
    pub level: Level,

    /// Emit one JSON object per event
    pub use_json: bool,

    /// Include the module target (e.g. github_build::pipeline) in logs
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Level picked from command-line switches, falling back to the environment
    ///
    /// An explicit level wins, then `verbose` (debug), then `quiet` (error), then
    /// `GITHUB_BUILD_LOG_LEVEL`. JSON output follows `GITHUB_BUILD_LOG_JSON`.
    pub fn from_switches(log_level: Option<&str>, verbose: bool, quiet: bool) -> Self {
        let level = if let Some(level_str) = log_level {
            parse_level(level_str)
        } else if verbose {
            Level::DEBUG
        } else if quiet {
            Level::ERROR
        } else {
            env_level()
        };

        Self {
            level,
            use_json: env_json(),
            ..Default::default()
        }
    }
}

/// Parses a log level case-insensitively, defaulting to `INFO`
///
/// ```
/// use github_build::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("Debug"), Level::DEBUG);
/// assert_eq!(parse_level("nonsense"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

fn env_level() -> Level {
    let level_str = env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string());
    parse_level(&level_str)
}

fn env_json() -> bool {
    env::var(LOG_JSON_ENV)
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false)
}

/// Installs the global subscriber; later calls are ignored
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();

        if env::var("RUST_LOG").is_err() {
            filter = filter
                .add_directive(
                    format!("github_build={}", config.level)
                        .parse()
                        .expect("valid directive"),
                )
                .add_directive("h2=warn".parse().expect("valid directive"))
                .add_directive("hyper=warn".parse().expect("valid directive"))
                .add_directive("reqwest=warn".parse().expect("valid directive"));
        }

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_target(config.include_target)
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(config.include_target)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}

/// Initializes logging from `GITHUB_BUILD_LOG_LEVEL` and `GITHUB_BUILD_LOG_JSON`
pub fn init_from_env() {
    init_logging(LoggingConfig::from_switches(None, false, false));
}
