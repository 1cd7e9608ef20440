//! Logging setup for the analysis driver: human-readable console output plus
//! rotating log files, optionally in JSON.
//!
//! Library code only emits `tracing` events; installing a subscriber is left to
//! the binary (or to tests that want output).

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// File name prefix of every log file written by the driver
pub const LOG_FILE_PREFIX: &str = "candle_analytics";

const DEFAULT_LEVEL_FILTER: &str = "info,candle_analytics=info";
const CONSOLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f UTC";
const FILE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Logging configuration options
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Directory to store log files
    pub log_dir: String,
    /// Log level filter (e.g., "info", "candle_analytics=debug")
    pub level_filter: String,
    pub rotation: LogRotation,
    /// Whether to include timestamps in console output
    pub console_timestamps: bool,
    /// Whether to use JSON format for file logs
    pub file_json_format: bool,
    /// Log files older than this are removed at startup
    pub cleanup_days: u32,
}

/// Log rotation configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    Daily,
    Hourly,
    /// Rotate when file reaches size limit (MB)
    SizeBased(u64),
}

impl LogRotation {
    /// Parse `"daily"`, `"hourly"` or `"size:<MB>"`; anything else rotates daily
    pub fn from_config_str(value: &str) -> Self {
        match value.trim() {
            "hourly" => LogRotation::Hourly,
            "daily" => LogRotation::Daily,
            s if s.starts_with("size:") => {
                let size_mb = s
                    .strip_prefix("size:")
                    .and_then(|mb| mb.trim().parse().ok())
                    .unwrap_or(100);
                LogRotation::SizeBased(size_mb)
            }
            _ => LogRotation::Daily,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "logs".to_string(),
            level_filter: DEFAULT_LEVEL_FILTER.to_string(),
            rotation: LogRotation::Daily,
            console_timestamps: true,
            file_json_format: true,
            cleanup_days: 30,
        }
    }
}

fn level_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level_filter))
}

fn rolling_appender(config: &LoggingConfig) -> RollingFileAppender {
    let file_name = format!("{}.log", LOG_FILE_PREFIX);
    match config.rotation {
        LogRotation::Hourly => tracing_appender::rolling::hourly(&config.log_dir, file_name),
        // tracing_appender has no size-based rotation, so size limits roll daily
        LogRotation::Daily | LogRotation::SizeBased(_) => {
            tracing_appender::rolling::daily(&config.log_dir, file_name)
        }
    }
}

/// Install console + rotating file logging.
///
/// Files land in `<log_dir>/candle_analytics.log.<date>`. The returned guard
/// flushes the background writer on drop and must outlive all logging.
pub fn init_dual_logging(config: &LoggingConfig) -> Result<WorkerGuard, Box<dyn std::error::Error + Send + Sync>> {
    std::fs::create_dir_all(&config.log_dir)?;

    let (file_writer, guard) = tracing_appender::non_blocking(rolling_appender(config));

    let console_timer = if config.console_timestamps {
        ChronoUtc::new(CONSOLE_TIME_FORMAT.to_string())
    } else {
        ChronoUtc::new(String::new())
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_timer(console_timer)
        .with_filter(level_filter(config));

    let file_layer = if config.file_json_format {
        fmt::layer()
            .json()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true)
            .with_timer(ChronoUtc::new(FILE_TIME_FORMAT.to_string()))
            .with_filter(level_filter(config))
            .boxed()
    } else {
        fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true)
            .with_timer(ChronoUtc::new(CONSOLE_TIME_FORMAT.to_string()))
            .with_filter(level_filter(config))
            .boxed()
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!(
        log_dir = %config.log_dir,
        rotation = ?config.rotation,
        json_format = config.file_json_format,
        "📁 Dual logging initialized - console + rotating files"
    );

    Ok(guard)
}

/// Console-only logging for tests or minimal setups
pub fn init_simple_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL_FILTER)))
        .with_writer(std::io::stderr)
        .try_init()?;

    tracing::info!("🖥️ Simple console logging initialized");
    Ok(())
}

fn is_log_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with(LOG_FILE_PREFIX) && name.contains(".log"))
            .unwrap_or(false)
}

/// Log files written by the driver, sorted by name
pub fn get_current_log_files(log_dir: &str) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(log_dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| is_log_file(path))
                .collect()
        })
        .unwrap_or_default();

    files.sort();
    files
}

/// Remove driver log files not modified within `keep_days`
pub fn cleanup_old_logs(log_dir: &str, keep_days: u32) -> Result<usize, std::io::Error> {
    let cutoff = std::time::SystemTime::now()
        - std::time::Duration::from_secs(u64::from(keep_days) * 24 * 3600);

    let mut removed = 0;
    for path in get_current_log_files(log_dir) {
        let modified = path.metadata().and_then(|meta| meta.modified());
        if let Ok(modified) = modified {
            if modified < cutoff && std::fs::remove_file(&path).is_ok() {
                removed += 1;
                tracing::debug!("🗑️ Removed old log file: {:?}", path);
            }
        }
    }

    if removed > 0 {
        tracing::info!("🧹 Cleaned up {} old log files (older than {} days)", removed, keep_days);
    }

    Ok(removed)
}

/// Log build and runtime information once at startup
pub fn log_system_info() {
    tracing::info!(
        package_version = env!("CARGO_PKG_VERSION"),
        target_arch = std::env::consts::ARCH,
        target_os = std::env::consts::OS,
        worker_threads = rayon::current_num_threads(),
        "📊 Environment information logged"
    );
}
