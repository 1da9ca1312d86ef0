//! Tracing setup shared by the snippet harvester binary and its tests.
//!
//! Every process logs into a daily-rolled file so that long scraping runs can
//! be inspected after the fact. Call [`init_logging`] once near process start;
//! repeat calls are no-ops that hand back the originally resolved file path,
//! which keeps integration tests that share a process from fighting over the
//! global subscriber.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Output encoding for the file sink.
#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Text,
    Json,
}

/// Configuration passed to [`init_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Logical process name, used for default directories and file names.
    pub app_name: &'static str,
    /// Explicit log directory. When `None`, `FRANKEN_LOG_DIR` is consulted
    /// and the fallback is `~/.local/share/<app_name>`.
    pub log_dir: Option<PathBuf>,
    /// Mirror events to `stderr` in addition to the file sink.
    pub emit_stderr: bool,
    /// Encoding for the file sink; the `stderr` mirror follows it.
    pub format: LogFormat,
    /// Filter applied when `RUST_LOG` is unset.
    pub default_filter: &'static str,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "franken",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info",
        }
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Returns the log file path for the current day. The non-blocking writer
/// guard is parked in a process-wide static so the sink stays alive until
/// exit.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = LOG_PATH.get() {
        return Ok(path.clone());
    }

    let log_dir = resolve_log_dir(config.app_name, config.log_dir.as_deref());
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory: {}", log_dir.display()))?;

    let prefix = format!("{}.log", config.app_name);
    let appender = rolling::daily(&log_dir, &prefix);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_filter));
    let stderr_requested = config.emit_stderr;

    match config.format {
        LogFormat::Text => {
            let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
            let stderr_layer = stderr_requested.then(|| fmt::layer().with_writer(std::io::stderr));
            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(stderr_layer)
                .try_init()
                .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;
        }
        LogFormat::Json => {
            let file_layer = fmt::layer().json().with_writer(writer);
            let stderr_layer =
                stderr_requested.then(|| fmt::layer().json().with_writer(std::io::stderr));
            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .with(stderr_layer)
                .try_init()
                .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;
        }
    }

    // `rolling::daily` appends the date to the prefix.
    let today = Local::now().format("%Y-%m-%d").to_string();
    let full_path = log_dir.join(format!("{prefix}.{today}"));
    let _ = LOG_PATH.set(full_path.clone());
    Ok(full_path)
}

fn resolve_log_dir(app_name: &str, explicit: Option<&Path>) -> PathBuf {
    let candidate = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var("FRANKEN_LOG_DIR").ok().map(PathBuf::from));

    match candidate {
        Some(dir) => expand_home(&dir),
        None => default_data_dir(app_name),
    }
}

fn expand_home(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/")) {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    path.to_path_buf()
}

fn default_data_dir(app_name: &str) -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(app_name),
        Err(_) => PathBuf::from(".").join(app_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins_over_environment() {
        let dir = resolve_log_dir("franken", Some(Path::new("/tmp/franken-logs")));
        assert_eq!(dir, PathBuf::from("/tmp/franken-logs"));
    }

    #[test]
    fn tilde_prefix_expands_against_home() {
        temp_env::with_var("HOME", Some("/home/harvest"), || {
            let dir = resolve_log_dir("franken", Some(Path::new("~/logs")));
            assert_eq!(dir, PathBuf::from("/home/harvest/logs"));
        });
    }

    #[test]
    fn falls_back_to_data_dir() {
        temp_env::with_vars(
            [
                ("FRANKEN_LOG_DIR", None::<&str>),
                ("HOME", Some("/home/harvest")),
            ],
            || {
                let dir = resolve_log_dir("franken", None);
                assert_eq!(dir, PathBuf::from("/home/harvest/.local/share/franken"));
            },
        );
    }
}
