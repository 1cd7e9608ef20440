use tracing::debug;

use crate::common::constants::{
    DEFAULT_TARGET_BINS, MIN_ADAPTIVE_STEP, STEP_TIER_HUNDREDTHS, STEP_TIER_TENS, STEP_TIER_TENTHS,
    STEP_TIER_UNITS,
};
use crate::market_data::Candle;
use super::calculator::build_profile;
use super::errors::VolumeProfileError;
use super::structs::{NoDataReason, ProfileOutcome, VolumeProfileConfig};

/// Pick a bucket width giving roughly 75 buckets across the candles' high/low range
pub fn choose_step(candles: &[Candle]) -> Option<f64> {
    choose_step_for_bins(candles, DEFAULT_TARGET_BINS)
}

/// Pick a bucket width giving roughly `target_bins` buckets, snapped to a round value.
///
/// Returns `None` when there are no candles.
pub fn choose_step_for_bins(candles: &[Candle], target_bins: u32) -> Option<f64> {
    if candles.is_empty() {
        return None;
    }

    let (low, high) = candles.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
        (lo.min(c.low), hi.max(c.high))
    });

    let price_range = high - low;
    let raw_step = price_range / target_bins.max(1) as f64;
    let step = snap_step(raw_step);

    debug!("Adaptive price step: range {:.4}, target bins {}, raw step {:.6}, snapped {:.6}, candles {}",
           price_range, target_bins, raw_step, step, candles.len());

    Some(step)
}

/// Round a raw step up to a legible magnitude.
///
/// Above 100 to a multiple of 10, above 10 to a whole unit, above 1 to a tenth,
/// above 0.1 to a hundredth, otherwise to a thousandth. A zero or invalid step
/// becomes the smallest unit so it can always be used as a bucket width.
pub fn snap_step(raw_step: f64) -> f64 {
    if !raw_step.is_finite() || raw_step <= 0.0 {
        return MIN_ADAPTIVE_STEP;
    }

    let snapped = if raw_step > STEP_TIER_TENS {
        (raw_step / 10.0).ceil() * 10.0
    } else if raw_step > STEP_TIER_UNITS {
        raw_step.ceil()
    } else if raw_step > STEP_TIER_TENTHS {
        (raw_step * 10.0).ceil() / 10.0
    } else if raw_step > STEP_TIER_HUNDREDTHS {
        (raw_step * 100.0).ceil() / 100.0
    } else {
        (raw_step * 1000.0).ceil() / 1000.0
    };

    snapped.max(MIN_ADAPTIVE_STEP)
}

/// Build a profile using the configured step, or an adaptive one when none is set
pub fn build_adaptive_profile(candles: &[Candle], config: &VolumeProfileConfig) -> Result<ProfileOutcome, VolumeProfileError> {
    if candles.is_empty() {
        return Ok(ProfileOutcome::NoData { reason: NoDataReason::EmptyInput });
    }

    let price_step = match config.price_step {
        Some(step) => step,
        None => {
            let participating: Vec<Candle> = match config.session {
                Some(session) => candles.iter().filter(|c| session.contains(c.timestamp)).copied().collect(),
                None => candles.to_vec(),
            };

            match choose_step_for_bins(&participating, config.target_bins) {
                Some(step) => step,
                None => return Ok(ProfileOutcome::NoData { reason: NoDataReason::SessionExcludedAll }),
            }
        }
    };

    build_profile(candles, &config.to_options(price_step))
}
