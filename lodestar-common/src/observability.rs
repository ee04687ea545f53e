//! Process-wide `tracing` setup.
//!
//! Every entrypoint (example binaries, integration tests) funnels through
//! [`init_logging`] so events land in one rolling daily file, optionally
//! mirrored to stderr. The first caller wins; later calls are no-ops that
//! receive the already-resolved log file path.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::Local;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

static WRITER_GUARD: OnceLock<WorkerGuard> = OnceLock::new();
static ACTIVE_LOG: OnceLock<PathBuf> = OnceLock::new();

/// Output encoding for structured logs.
#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Text,
    Json,
}

/// Configuration passed to [`init_logging`].
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Component name; doubles as the log file prefix.
    pub app_name: &'static str,
    /// Explicit log directory. When `None`, `LODESTAR_LOG_DIR` is consulted,
    /// then `~/.local/share/<app_name>`.
    pub log_dir: Option<PathBuf>,
    /// Mirror events to stderr as well as the file sink.
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: &'static str,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "lodestar",
            log_dir: None,
            emit_stderr: false,
            format: LogFormat::Text,
            default_filter: "info",
        }
    }
}

/// Install the global subscriber and return today's concrete log file path.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(active) = ACTIVE_LOG.get() {
        return Ok(active.clone());
    }

    let dir = log_directory(&config);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory: {}", dir.display()))?;

    // `rolling::daily` writes `<prefix>.<date>` inside the directory.
    let prefix = format!("{}.log", config.app_name);
    let sink_path = dir.join(format!("{prefix}.{}", Local::now().format("%Y-%m-%d")));

    let (writer, guard) = tracing_appender::non_blocking(rolling::daily(dir, prefix));
    let _ = WRITER_GUARD.set(guard);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter));
    let active_filter = filter.to_string();

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();
    match config.format {
        LogFormat::Text => {
            layers.push(fmt::layer().with_writer(writer).with_ansi(false).boxed());
            if config.emit_stderr {
                layers.push(fmt::layer().with_writer(std::io::stderr).boxed());
            }
        }
        LogFormat::Json => {
            layers.push(fmt::layer().json().with_writer(writer).boxed());
            if config.emit_stderr {
                layers.push(fmt::layer().json().with_writer(std::io::stderr).boxed());
            }
        }
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing setup failed: {e}"))?;

    tracing::debug!(
        log_file = %sink_path.display(),
        filter = %active_filter,
        "logging initialised"
    );

    let _ = ACTIVE_LOG.set(sink_path.clone());
    Ok(sink_path)
}

fn log_directory(config: &LogConfig) -> PathBuf {
    let chosen = config
        .log_dir
        .clone()
        .or_else(|| std::env::var("LODESTAR_LOG_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| fallback_dir(config.app_name));
    tilde_expand(&chosen)
}

fn tilde_expand(path: &Path) -> PathBuf {
    let Some(rest) = path.to_str().and_then(|p| p.strip_prefix("~/")) else {
        return path.to_path_buf();
    };
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(rest),
        Err(_) => path.to_path_buf(),
    }
}

fn fallback_dir(app_name: &str) -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) => [home.as_str(), ".local", "share", app_name]
            .into_iter()
            .collect(),
        Err(_) => PathBuf::from(".").join(app_name),
    }
}
