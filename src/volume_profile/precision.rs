//! Bucket arithmetic helpers.
//!
//! Prices are `f64` and bucket edges are multiples of the price step, so edge
//! comparisons go through the helpers here instead of ad-hoc rounding.

use crate::common::constants::{BUCKET_EDGE_EPSILON, PRICE_DISPLAY_DECIMALS};

/// Snap `price` down to the nearest multiple of `step`
pub fn floor_to_step(price: f64, step: f64) -> f64 {
    (price / step).floor() * step
}

/// Snap `price` up to the nearest multiple of `step`
pub fn ceil_to_step(price: f64, step: f64) -> f64 {
    (price / step).ceil() * step
}

/// Number of buckets covering `[min_price, max_price]`, never less than one
pub fn bucket_count(min_price: f64, max_price: f64, step: f64) -> usize {
    let count = ((max_price - min_price) / step).round();
    if count.is_finite() && count >= 1.0 {
        count as usize
    } else {
        1
    }
}

/// Inclusive bucket index span overlapped by `[range_low, range_high)`.
///
/// Returns `None` when the range lies entirely outside the histogram.
pub fn bucket_span(range_low: f64, range_high: f64, min_price: f64, step: f64, count: usize) -> Option<(usize, usize)> {
    if count == 0 {
        return None;
    }

    let start = ((range_low - min_price) / step).floor().max(0.0);
    let end = ((range_high - min_price - BUCKET_EDGE_EPSILON) / step).floor();
    let end = end.min((count - 1) as f64);

    if !start.is_finite() || !end.is_finite() || end < 0.0 || start > end {
        return None;
    }

    Some((start as usize, end as usize))
}

/// Round a price to a fixed number of decimals to drop binary float artifacts
pub fn round_price(price: f64) -> f64 {
    let factor = 10f64.powi(PRICE_DISPLAY_DECIMALS);
    let rounded = (price * factor).round() / factor;
    if rounded.is_finite() { rounded } else { price }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapping() {
        assert_eq!(floor_to_step(98.0, 2.0), 98.0);
        assert_eq!(floor_to_step(99.5, 2.0), 98.0);
        assert_eq!(ceil_to_step(105.1, 2.0), 106.0);
        assert_eq!(ceil_to_step(106.0, 2.0), 106.0);
    }

    #[test]
    fn test_bucket_count_minimum_is_one() {
        assert_eq!(bucket_count(100.0, 100.0, 2.0), 1);
        assert_eq!(bucket_count(98.0, 106.0, 2.0), 4);
        // 0.1 steps do not divide exactly in binary
        assert_eq!(bucket_count(0.3, 1.0, 0.1), 7);
    }

    #[test]
    fn test_bucket_span_excludes_bucket_starting_at_range_end() {
        // [100, 104) over buckets starting at 98 with width 2 -> buckets 1 and 2
        assert_eq!(bucket_span(100.0, 104.0, 98.0, 2.0, 4), Some((1, 2)));
        assert_eq!(bucket_span(98.0, 106.0, 98.0, 2.0, 4), Some((0, 3)));
        assert_eq!(bucket_span(101.0, 101.5, 98.0, 2.0, 4), Some((1, 1)));
    }

    #[test]
    fn test_bucket_span_clamps_to_histogram() {
        assert_eq!(bucket_span(90.0, 200.0, 98.0, 2.0, 4), Some((0, 3)));
        assert_eq!(bucket_span(200.0, 210.0, 98.0, 2.0, 4), None);
        assert_eq!(bucket_span(80.0, 90.0, 98.0, 2.0, 4), None);
    }

    #[test]
    fn test_round_price_removes_float_noise() {
        let noisy = 0.1 + 0.2;
        assert_ne!(noisy, 0.3);
        assert_eq!(round_price(noisy), 0.3);
        assert_eq!(round_price(50000.25), 50000.25);
    }
}
