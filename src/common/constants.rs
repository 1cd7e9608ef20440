/// Analytics defaults and tuning constants

// Volume profile
pub const DEFAULT_BODY_WEIGHT: f64 = 0.7;
pub const DEFAULT_VALUE_AREA_PCT: f64 = 0.7;
pub const DEFAULT_TARGET_BINS: u32 = 75;

// Largest bucket grid a profile may allocate; finer steps over the same
// price range are rejected as a configuration error
pub const MAX_PROFILE_BINS: usize = 1_000_000;

// Subtracted from a range's upper edge before locating its last bucket, so a
// range ending exactly on a bucket boundary does not spill into the next bucket
pub const BUCKET_EDGE_EPSILON: f64 = 1e-12;

// Decimal places kept on histogram prices
pub const PRICE_DISPLAY_DECIMALS: i32 = 10;

// Adaptive step snapping
pub const STEP_TIER_TENS: f64 = 100.0;
pub const STEP_TIER_UNITS: f64 = 10.0;
pub const STEP_TIER_TENTHS: f64 = 1.0;
pub const STEP_TIER_HUNDREDTHS: f64 = 0.1;
pub const MIN_ADAPTIVE_STEP: f64 = 0.001;

// Breakout detection
pub const DEFAULT_LOOKBACK_PERIOD: usize = 20;
pub const DEFAULT_VOLUME_THRESHOLD: f64 = 1.5;
pub const DEFAULT_PRICE_THRESHOLD: f64 = 0.002;

// Visible window selection
pub const FALLBACK_VISIBLE_CANDLES: usize = 100;
pub const MIN_VISIBLE_CANDLES: usize = 50;

// Summary formatting
pub const SUMMARY_PRICE_DECIMALS: usize = 4;
