use tracing::{debug, warn};

use crate::common::constants::MAX_PROFILE_BINS;
use crate::market_data::structs::{first_out_of_order, Candle};
use super::errors::VolumeProfileError;
use super::precision::{bucket_count, bucket_span, ceil_to_step, floor_to_step, round_price};
use super::structs::{
    NoDataReason, PointOfControl, PriceBin, ProfileMeta, ProfileOptions, ProfileOutcome,
    ValueArea, VolumeProfile,
};

/// Build a volume-by-price profile from a candle sequence.
///
/// Each candle's volume is split between its body (`body_weight`) and its
/// wicks, and every part is spread uniformly over the price range it covers.
/// Empty input, or a session window that excludes every candle, yields
/// `ProfileOutcome::NoData` rather than an error.
pub fn build_profile(candles: &[Candle], options: &ProfileOptions) -> Result<ProfileOutcome, VolumeProfileError> {
    let options = options.normalized()?;

    if candles.is_empty() {
        return Ok(ProfileOutcome::NoData { reason: NoDataReason::EmptyInput });
    }

    let selected: Vec<&Candle> = match options.session {
        Some(session) => candles.iter().filter(|c| session.contains(c.timestamp)).collect(),
        None => candles.iter().collect(),
    };

    if selected.is_empty() {
        debug!("Session {:?} excluded all {} candles", options.session, candles.len());
        return Ok(ProfileOutcome::NoData { reason: NoDataReason::SessionExcludedAll });
    }

    if let Some(index) = first_out_of_order(candles) {
        warn!("Candle timestamps are not ascending (first decrease at index {})", index);
    }

    let (raw_low, raw_high) = selected.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
        (lo.min(c.low), hi.max(c.high))
    });

    let grid_bins = (raw_high - raw_low) / options.price_step;
    if !grid_bins.is_finite() || grid_bins > MAX_PROFILE_BINS as f64 {
        return Err(VolumeProfileError::InvalidConfiguration(format!(
            "price_step {} too small for price range [{}, {}] (limit {} bins)",
            options.price_step, raw_low, raw_high, MAX_PROFILE_BINS
        )));
    }

    let mut accumulator = VolumeAccumulator::new(raw_low, raw_high, options.price_step);
    for candle in &selected {
        accumulator.distribute_candle(candle, options.body_weight);
    }

    let min_price = accumulator.min_price;
    let max_price = accumulator.max_price;
    let histogram = accumulator.into_histogram();
    let total_volume: f64 = histogram.iter().map(|bin| bin.volume).sum();

    let poc_index = find_poc_index(&histogram);
    let (from_index, to_index) = expand_value_area(&histogram, poc_index, options.value_area_pct * total_volume);
    let value_area_volume: f64 = histogram[from_index..=to_index].iter().map(|bin| bin.volume).sum();

    let poc = PointOfControl {
        price: histogram[poc_index].price,
        volume: histogram[poc_index].volume,
        index: poc_index,
    };

    debug!("Built volume profile: {} candles, {} bins, total volume {:.4}, POC {} (bin {}), VA [{}, {}]",
           selected.len(), histogram.len(), total_volume, poc.price, poc_index,
           histogram[from_index].price, histogram[to_index].price);

    Ok(ProfileOutcome::Ready(VolumeProfile {
        value_area: ValueArea {
            from: histogram[from_index].price,
            to: histogram[to_index].price,
            coverage: options.value_area_pct,
            from_index,
            to_index,
            volume: value_area_volume,
        },
        poc,
        total_volume,
        meta: ProfileMeta {
            price_step: options.price_step,
            body_weight: options.body_weight,
            value_area_pct: options.value_area_pct,
            min_price,
            max_price,
        },
        histogram,
    }))
}

/// Dense per-bucket volume totals over a fixed price grid
#[derive(Debug, Clone)]
pub struct VolumeAccumulator {
    /// Lower edge of the first bucket
    min_price: f64,
    /// Upper edge of the last bucket
    max_price: f64,
    price_step: f64,
    bins: Vec<f64>,
}

impl VolumeAccumulator {
    /// Create a zeroed grid covering `[low, high]` snapped outward to `price_step`
    pub fn new(low: f64, high: f64, price_step: f64) -> Self {
        let min_price = floor_to_step(low, price_step);
        let max_price = ceil_to_step(high, price_step);
        let count = bucket_count(min_price, max_price, price_step);

        Self {
            min_price,
            max_price,
            price_step,
            bins: vec![0.0; count],
        }
    }

    /// Spread `volume` uniformly over `[range_low, range_high)`, crediting each
    /// bucket with its share of the overlap.
    pub fn add_range(&mut self, range_low: f64, range_high: f64, volume: f64) {
        if volume <= 0.0 || range_high <= range_low {
            return;
        }

        let total_range = range_high - range_low;
        let Some((start, end)) = bucket_span(range_low, range_high, self.min_price, self.price_step, self.bins.len()) else {
            return;
        };

        for idx in start..=end {
            let bin_low = self.min_price + idx as f64 * self.price_step;
            let bin_high = bin_low + self.price_step;
            let overlap = range_high.min(bin_high) - range_low.max(bin_low);
            if overlap > 0.0 {
                self.bins[idx] += overlap / total_range * volume;
            }
        }
    }

    /// Split one candle's volume into lower wick, body and upper wick and spread each part.
    ///
    /// Candles without range or without positive volume contribute nothing.
    pub fn distribute_candle(&mut self, candle: &Candle, body_weight: f64) {
        let low = candle.low.min(candle.high);
        let high = candle.low.max(candle.high);
        if high == low || candle.volume <= 0.0 || !candle.volume.is_finite() {
            return;
        }

        let (open_close_low, open_close_high) = candle.body_bounds();
        let body_low = low.max(open_close_low);
        let body_high = high.min(open_close_high);

        let body_range = (body_high - body_low).max(0.0);
        let tail_range = ((high - low) - body_range).max(0.0);

        // A candle without wicks keeps its whole volume in the body
        let body_volume = if body_range <= 0.0 {
            0.0
        } else if tail_range <= 0.0 {
            candle.volume
        } else {
            candle.volume * body_weight
        };
        let tail_volume = candle.volume - body_volume;

        if tail_range > 0.0 {
            if body_low > low {
                self.add_range(low, body_low, tail_volume * ((body_low - low) / tail_range));
            }
            if high > body_high {
                self.add_range(body_high, high, tail_volume * ((high - body_high) / tail_range));
            }
        }

        if body_range > 0.0 {
            self.add_range(body_low, body_high, body_volume);
        }
    }

    /// Bucket lower edges paired with their volume, ascending by price
    pub fn into_histogram(self) -> Vec<PriceBin> {
        let min_price = self.min_price;
        let step = self.price_step;
        self.bins
            .into_iter()
            .enumerate()
            .map(|(idx, volume)| PriceBin {
                price: round_price(min_price + idx as f64 * step),
                volume,
            })
            .collect()
    }
}

/// Index of the highest-volume bucket; ties keep the lowest price
pub fn find_poc_index(histogram: &[PriceBin]) -> usize {
    let mut poc = 0;
    for (idx, bin) in histogram.iter().enumerate().skip(1) {
        if bin.volume > histogram[poc].volume {
            poc = idx;
        }
    }
    poc
}

/// Grow a band outward from the POC until it holds `target_volume`.
///
/// Each step takes the neighbouring bucket with strictly more volume; an
/// exhausted side counts as -1 and ties go to the lower side. Returns the
/// inclusive `(from, to)` bucket indices.
pub fn expand_value_area(histogram: &[PriceBin], poc_index: usize, target_volume: f64) -> (usize, usize) {
    if histogram.is_empty() {
        return (0, 0);
    }

    let len = histogram.len() as isize;
    let mut covered = histogram[poc_index].volume;
    let mut left = poc_index as isize - 1;
    let mut right = poc_index as isize + 1;

    while covered < target_volume && (left >= 0 || right < len) {
        let left_volume = if left >= 0 { histogram[left as usize].volume } else { -1.0 };
        let right_volume = if right < len { histogram[right as usize].volume } else { -1.0 };

        if right_volume > left_volume {
            covered += right_volume.max(0.0);
            right += 1;
        } else {
            covered += left_volume.max(0.0);
            left -= 1;
        }
    }

    ((left + 1) as usize, (right - 1) as usize)
}
