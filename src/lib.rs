//! Candle analytics: volume-by-price profiles and support/resistance breakout
//! detection over OHLCV candles.
//!
//! All analysis entry points are pure functions over borrowed candle slices and
//! may be called concurrently.

pub mod breakout;
pub mod common;
pub mod config;
pub mod logging;
pub mod market_data;
pub mod volume_profile;

pub use breakout::{analyze_breakout, BreakoutConfig, BreakoutResult};
pub use market_data::{Candle, SessionWindow, TimestampMS};
pub use volume_profile::{build_adaptive_profile, build_profile, choose_step, ProfileOptions, ProfileOutcome, VolumeProfile};
