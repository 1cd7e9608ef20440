use candle_analytics::breakout::{analyze_breakout, find_extremes, select_visible_window, BreakoutResult, PriceExtremes};
use candle_analytics::config::AnalyticsConfig;
use candle_analytics::logging::{cleanup_old_logs, init_dual_logging, init_simple_logging, log_system_info};
use candle_analytics::market_data::{load_candles_csv, Candle};
use candle_analytics::volume_profile::{build_adaptive_profile, ProfileOutcome};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

const DEFAULT_CONFIG_PATH: &str = "config.toml";
const USAGE: &str = "usage: candle_analytics [--config <config.toml>] <candles.csv>...";

/// Command line: optional config path followed by candle files
#[derive(Debug, Clone, PartialEq)]
struct CliArgs {
    config_path: PathBuf,
    inputs: Vec<PathBuf>,
}

impl CliArgs {
    fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self, String> {
        let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
        let mut inputs = Vec::new();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args.next().ok_or_else(|| format!("--config needs a path\n{}", USAGE))?;
                    config_path = PathBuf::from(path);
                }
                "--help" | "-h" => return Err(USAGE.to_string()),
                _ => inputs.push(PathBuf::from(arg)),
            }
        }

        if inputs.is_empty() {
            return Err(USAGE.to_string());
        }

        Ok(Self { config_path, inputs })
    }
}

/// Everything computed for one candle file
#[derive(Debug, Clone, Serialize)]
struct CandleAnalysis {
    source: String,
    candles: usize,
    first_candle: Option<String>,
    last_candle: Option<String>,
    volume_profile: ProfileOutcome,
    /// Fraction of profiled volume inside the value area
    value_area_share: Option<f64>,
    breakout: BreakoutResult,
    /// Support/resistance of the trailing window a chart would show by default
    recent_extremes: Option<PriceExtremes>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum FileReport {
    Analyzed(Box<CandleAnalysis>),
    Failed { source: String, error: String },
}

fn analyze_candles(source: String, candles: &[Candle], config: &AnalyticsConfig) -> FileReport {
    let volume_profile = match build_adaptive_profile(candles, &config.volume_profile) {
        Ok(outcome) => outcome,
        Err(e) => return FileReport::Failed { source, error: e.to_string() },
    };
    let value_area_share = volume_profile.profile().map(|profile| profile.value_area_share());
    let breakout = analyze_breakout(candles, &config.breakout);
    let recent_extremes = find_extremes(select_visible_window(candles, None));

    info!("📈 {}: {}", source, volume_profile.message());
    info!("🔍 {}: {}", source, breakout.message);

    let rfc3339 = |candle: &Candle| candle.datetime().map(|dt| dt.to_rfc3339());

    FileReport::Analyzed(Box::new(CandleAnalysis {
        candles: candles.len(),
        first_candle: candles.first().and_then(rfc3339),
        last_candle: candles.last().and_then(rfc3339),
        source,
        volume_profile,
        value_area_share,
        breakout,
        recent_extremes,
    }))
}

fn analyze_file(path: &Path, config: &AnalyticsConfig) -> FileReport {
    let source = path.display().to_string();
    match load_candles_csv(path) {
        Ok(candles) => analyze_candles(source, &candles, config),
        Err(e) => {
            error!("❌ Failed to load {}: {}", source, e);
            FileReport::Failed { source, error: e.to_string() }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = CliArgs::parse(std::env::args().skip(1))?;

    let config = match AnalyticsConfig::from_toml(&args.config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("⚠️ Could not load {}: {}. Using defaults.", args.config_path.display(), e);
            AnalyticsConfig::default()
        }
    };

    let _log_guard = match init_dual_logging(&config.logging) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("⚠️ File logging unavailable ({}), logging to console only", e);
            if let Err(e) = init_simple_logging() {
                eprintln!("⚠️ Console logging unavailable: {}", e);
            }
            None
        }
    };

    log_system_info();
    if let Err(e) = cleanup_old_logs(&config.logging.log_dir, config.logging.cleanup_days) {
        warn!("Log cleanup failed: {}", e);
    }

    info!("🚀 Analyzing {} candle file(s)", args.inputs.len());

    let reports: Vec<FileReport> = args
        .inputs
        .par_iter()
        .map(|path| analyze_file(path, &config))
        .collect();

    let failed = reports.iter().filter(|r| matches!(r, FileReport::Failed { .. })).count();
    info!("✅ Analysis complete: {} analyzed, {} failed", reports.len() - failed, failed);

    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
