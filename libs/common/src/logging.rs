//! Logging setup for GridLoad tools
//!
//! Console output on stderr plus an optional daily-rolling log file, both
//! behind one `EnvFilter`.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::Writer, FmtContext, FormatEvent, FormatFields},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::error::{Error, Result};

/// Custom format for log level with brackets: `[INFO]`, `[WARN]`, etc.
pub fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// Event formatter that outputs: `timestamp [LEVEL] message`
///
/// Example output: `2025-12-02T00:50:44.809123Z [INFO] Dataset built: 96 records`
pub struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m",
                Level::DEBUG => "\x1b[34m",
                Level::INFO => "\x1b[32m",
                Level::WARN => "\x1b[33m",
                Level::ERROR => "\x1b[31m",
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

// Keeps the non-blocking file writer flushing until process exit
static GUARDS: OnceLock<Mutex<Vec<WorkerGuard>>> = OnceLock::new();

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Application name, used as the log file prefix
    pub app_name: String,
    /// Filter spec used when `RUST_LOG` is unset, e.g. `info` or `warn,gridload_model=debug`
    pub level: String,
    /// Directory for daily-rolling log files; console only when `None`
    pub log_dir: Option<PathBuf>,
    /// Colored console output
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "gridload".to_string(),
            level: "info".to_string(),
            log_dir: None,
            ansi: true,
        }
    }
}

/// Filter spec: `RUST_LOG` when set and non-empty, otherwise `level`
pub fn build_filter(rust_log: Option<&str>, level: &str) -> String {
    match rust_log.map(str::trim) {
        Some(spec) if !spec.is_empty() => spec.to_string(),
        _ => level.to_string(),
    }
}

/// Initialize the global subscriber
///
/// Fails if the filter spec is invalid, the log directory cannot be
/// created, or a global subscriber is already installed.
pub fn init_with_config(config: LogConfig) -> Result<()> {
    let filter_spec = build_filter(std::env::var("RUST_LOG").ok().as_deref(), &config.level);
    let env_filter = EnvFilter::try_new(&filter_spec)
        .map_err(|e| Error::Logging(format!("Invalid log filter '{}': {}", filter_spec, e)))?;

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .event_format(BracketedLevelFormat)
        .boxed();

    let file_layer = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                Error::Logging(format!("Cannot create log directory {}: {}", dir.display(), e))
            })?;
            let appender =
                tracing_appender::rolling::daily(dir, format!("{}.log", config.app_name));
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);

            let guards = GUARDS.get_or_init(|| Mutex::new(Vec::new()));
            match guards.lock() {
                Ok(mut guards) => guards.push(guard),
                Err(poisoned) => poisoned.into_inner().push(guard),
            }

            Some(
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .event_format(BracketedLevelFormat)
                    .boxed(),
            )
        },
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))?;

    tracing::debug!(
        "Logging: {} filter={} dir={:?}",
        config.app_name,
        filter_spec,
        config.log_dir
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_format_level() {
        assert_eq!(format_level(&Level::INFO), "[INFO]");
        assert_eq!(format_level(&Level::ERROR), "[ERROR]");
    }

    #[test]
    fn test_build_filter_prefers_rust_log() {
        assert_eq!(build_filter(Some("warn,common=debug"), "info"), "warn,common=debug");
        assert_eq!(build_filter(Some("  "), "info"), "info");
        assert_eq!(build_filter(None, "debug"), "debug");
    }

    #[test]
    fn test_invalid_filter_rejected_before_install() {
        let config = LogConfig {
            level: "gridload=loud".to_string(),
            ..Default::default()
        };
        if std::env::var("RUST_LOG").map_or(true, |v| v.trim().is_empty()) {
            let err = init_with_config(config).unwrap_err();
            assert!(err.to_string().contains("Invalid log filter"));
        }
    }

    // The only test in this crate that installs a global subscriber
    #[test]
    fn test_init_with_file_output() {
        let dir = tempfile::tempdir().unwrap();
        let config = LogConfig {
            app_name: "gridload-test".to_string(),
            level: "info".to_string(),
            log_dir: Some(dir.path().join("logs")),
            ansi: false,
        };

        init_with_config(config.clone()).unwrap();
        assert!(dir.path().join("logs").is_dir());

        // Second global init is refused
        assert!(init_with_config(config).is_err());
    }
}
