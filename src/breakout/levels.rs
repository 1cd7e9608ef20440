//! Plain support/resistance band over the candles a chart currently shows.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::constants::{FALLBACK_VISIBLE_CANDLES, MIN_VISIBLE_CANDLES};
use crate::market_data::Candle;

/// Visible span reported by a chart, as fractional candle indices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibleRange {
    pub from: f64,
    pub to: f64,
}

impl VisibleRange {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }
}

/// Lowest low, highest high and the line halfway between them
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceExtremes {
    pub support: f64,
    pub resistance: f64,
    pub midpoint: f64,
    pub candles_analyzed: usize,
}

/// Slice of `candles` covered by `range`, clamped to the data.
///
/// A range past the end falls back to the last 100 candles and an empty range
/// is widened to 50 candles. Without a range the last 100 candles are used.
pub fn select_visible_window(candles: &[Candle], range: Option<VisibleRange>) -> &[Candle] {
    let len = candles.len();
    if len == 0 {
        return candles;
    }

    let Some(range) = range else {
        return &candles[len.saturating_sub(FALLBACK_VISIBLE_CANDLES)..];
    };

    let mut start = if range.from.is_finite() {
        range.from.floor().max(0.0) as usize
    } else {
        0
    };
    let mut end = if range.to.is_finite() {
        (range.to.ceil().max(0.0) as usize).min(len)
    } else {
        len
    };

    if start >= len {
        start = len.saturating_sub(FALLBACK_VISIBLE_CANDLES);
    }
    if end <= start {
        end = start + MIN_VISIBLE_CANDLES;
    }
    end = end.min(len);

    debug!("Visible window {:?} -> candles {}..{} of {}", range, start, end, len);
    &candles[start..end]
}

/// Support/resistance extremes of `candles`, `None` when there are none
pub fn find_extremes(candles: &[Candle]) -> Option<PriceExtremes> {
    if candles.is_empty() {
        return None;
    }

    let support = candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let resistance = candles.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);

    Some(PriceExtremes {
        support,
        resistance,
        midpoint: (support + resistance) / 2.0,
        candles_analyzed: candles.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ladder(count: usize) -> Vec<Candle> {
        (0..count)
            .map(|i| {
                let base = 100.0 + i as f64;
                Candle::new(i as i64 * 60_000, base, base + 1.0, base - 1.0, base + 0.5, 10.0)
            })
            .collect()
    }

    #[test]
    fn test_window_follows_fractional_range() {
        let candles = ladder(300);
        let window = select_visible_window(&candles, Some(VisibleRange::new(10.4, 39.2)));
        assert_eq!(window.len(), 30);
        assert_eq!(window[0].timestamp, 10 * 60_000);
        assert_eq!(window[29].timestamp, 39 * 60_000);
    }

    #[test]
    fn test_window_clamps_to_data() {
        let candles = ladder(300);
        let window = select_visible_window(&candles, Some(VisibleRange::new(-5.0, 1_000.0)));
        assert_eq!(window.len(), 300);
    }

    #[test]
    fn test_window_past_end_falls_back_to_tail() {
        let candles = ladder(300);
        let window = select_visible_window(&candles, Some(VisibleRange::new(400.0, 450.0)));
        assert_eq!(window.len(), 100);
        assert_eq!(window[0].timestamp, 200 * 60_000);

        // fewer candles than the fallback size start from zero
        let candles = ladder(30);
        let window = select_visible_window(&candles, Some(VisibleRange::new(40.0, 45.0)));
        assert_eq!(window.len(), 30);
    }

    #[test]
    fn test_empty_range_widens() {
        let candles = ladder(300);
        let window = select_visible_window(&candles, Some(VisibleRange::new(120.0, 110.0)));
        assert_eq!(window.len(), 50);
        assert_eq!(window[0].timestamp, 120 * 60_000);

        let window = select_visible_window(&candles, Some(VisibleRange::new(280.0, 10.0)));
        assert_eq!(window.len(), 20);
    }

    #[test]
    fn test_window_without_range_uses_last_hundred() {
        let candles = ladder(300);
        let window = select_visible_window(&candles, None);
        assert_eq!(window.len(), 100);
        assert_eq!(window[99].timestamp, 299 * 60_000);

        assert!(select_visible_window(&[], None).is_empty());
        assert!(select_visible_window(&[], Some(VisibleRange::new(0.0, 10.0))).is_empty());
    }

    #[test]
    fn test_extremes() {
        let candles = ladder(10);
        let extremes = find_extremes(&candles).unwrap();
        assert_eq!(extremes.support, 99.0);
        assert_eq!(extremes.resistance, 110.0);
        assert_eq!(extremes.midpoint, 104.5);
        assert_eq!(extremes.candles_analyzed, 10);

        assert!(find_extremes(&[]).is_none());
    }
}
