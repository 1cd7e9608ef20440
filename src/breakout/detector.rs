use tracing::{debug, warn};

use crate::common::constants::SUMMARY_PRICE_DECIMALS;
use crate::market_data::structs::{first_out_of_order, Candle};
use super::structs::{BreakoutConfig, BreakoutDirection, BreakoutResult, BreakoutStrength};

/// Classify the latest candle against the support/resistance band of the
/// candles before it.
///
/// Only the last `lookback_period` candles are inspected: the final one is the
/// current candle, the rest form the reference window. Too few candles (or a
/// lookback below 2) gives a neutral "insufficient data" result.
pub fn analyze_breakout(candles: &[Candle], config: &BreakoutConfig) -> BreakoutResult {
    let lookback = config.lookback_period;
    if lookback < 2 || candles.len() < lookback {
        debug!("Breakout analysis skipped: {} candles, lookback {}", candles.len(), lookback);
        return BreakoutResult::insufficient_data();
    }

    if let Some(index) = first_out_of_order(candles) {
        warn!("Candle timestamps are not ascending (first decrease at index {})", index);
    }

    let recent = &candles[candles.len() - lookback..];
    let Some((current, reference)) = recent.split_last() else {
        return BreakoutResult::insufficient_data();
    };

    let support = reference.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let resistance = reference.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    let avg_volume = reference.iter().map(|c| c.volume).sum::<f64>() / reference.len() as f64;

    // A zero average makes every ratio meaningless, so nothing can be confirmed
    let volume_ratio = if avg_volume.is_finite() && avg_volume > 0.0 {
        Some(current.volume / avg_volume)
    } else {
        None
    };
    let volume_confirmed = volume_ratio.is_some() && current.volume > avg_volume * config.volume_threshold;

    let break_up = current.close > resistance * (1.0 + config.price_threshold);
    let break_down = current.close < support * (1.0 - config.price_threshold);

    let (direction, strength, message) = match (break_up, break_down, volume_confirmed) {
        (true, _, true) => (
            BreakoutDirection::Up,
            BreakoutStrength::Strong,
            format!(
                "Resistance breakout! Price: {:.prec$}, level: {:.prec$}",
                current.close, resistance, prec = SUMMARY_PRICE_DECIMALS
            ),
        ),
        (true, _, false) => (
            BreakoutDirection::Up,
            BreakoutStrength::Weak,
            "Weak resistance breakout (low volume)".to_string(),
        ),
        (false, true, true) => (
            BreakoutDirection::Down,
            BreakoutStrength::Strong,
            format!(
                "Support breakout! Price: {:.prec$}, level: {:.prec$}",
                current.close, support, prec = SUMMARY_PRICE_DECIMALS
            ),
        ),
        (false, true, false) => (
            BreakoutDirection::Down,
            BreakoutStrength::Weak,
            "Weak support breakout (low volume)".to_string(),
        ),
        (false, false, _) => (
            BreakoutDirection::None,
            BreakoutStrength::Weak,
            "No breakout detected".to_string(),
        ),
    };

    debug!("Breakout analysis: close {} vs band [{}, {}], volume ratio {:?} -> {} ({})",
           current.close, support, resistance, volume_ratio, direction, strength);

    BreakoutResult {
        has_breakout: direction != BreakoutDirection::None,
        direction,
        strength,
        support_level: Some(support),
        resistance_level: Some(resistance),
        current_price: Some(current.close),
        volume_ratio,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 19 reference candles trading in [90, 110] with volume 1000, plus the given current candle
    fn window_with_current(close: f64, volume: f64) -> Vec<Candle> {
        let mut candles: Vec<Candle> = (0..19)
            .map(|i| Candle::new(i * 60_000, 100.0, 110.0, 90.0, 100.0, 1000.0))
            .collect();
        let high = close.max(100.0);
        let low = close.min(100.0);
        candles.push(Candle::new(19 * 60_000, 100.0, high, low, close, volume));
        candles
    }

    #[test]
    fn test_strong_upward_breakout() {
        let result = analyze_breakout(&window_with_current(112.5, 2000.0), &BreakoutConfig::default());

        assert!(result.has_breakout);
        assert_eq!(result.direction, BreakoutDirection::Up);
        assert_eq!(result.strength, BreakoutStrength::Strong);
        assert_eq!(result.support_level, Some(90.0));
        assert_eq!(result.resistance_level, Some(110.0));
        assert_eq!(result.current_price, Some(112.5));
        assert_eq!(result.volume_ratio, Some(2.0));
        assert_eq!(result.message, "Resistance breakout! Price: 112.5000, level: 110.0000");
        assert!(result.is_confirmed());
    }

    #[test]
    fn test_weak_downward_breakout() {
        // 89 < 90 * 0.998 = 89.82, volume 1200 <= 1500
        let result = analyze_breakout(&window_with_current(89.0, 1200.0), &BreakoutConfig::default());

        assert!(result.has_breakout);
        assert_eq!(result.direction, BreakoutDirection::Down);
        assert_eq!(result.strength, BreakoutStrength::Weak);
        assert_eq!(result.message, "Weak support breakout (low volume)");
        assert!(!result.is_confirmed());
    }

    #[test]
    fn test_weak_upward_and_strong_downward() {
        let result = analyze_breakout(&window_with_current(112.5, 1500.0), &BreakoutConfig::default());
        assert_eq!(result.direction, BreakoutDirection::Up);
        // volume must strictly exceed the threshold
        assert_eq!(result.strength, BreakoutStrength::Weak);
        assert_eq!(result.message, "Weak resistance breakout (low volume)");

        let result = analyze_breakout(&window_with_current(85.0, 3000.0), &BreakoutConfig::default());
        assert_eq!(result.direction, BreakoutDirection::Down);
        assert_eq!(result.strength, BreakoutStrength::Strong);
        assert_eq!(result.message, "Support breakout! Price: 85.0000, level: 90.0000");
    }

    #[test]
    fn test_close_within_threshold_is_not_a_breakout() {
        // 110.2 < 110 * 1.002 = 110.22
        let result = analyze_breakout(&window_with_current(110.2, 5000.0), &BreakoutConfig::default());

        assert!(!result.has_breakout);
        assert_eq!(result.direction, BreakoutDirection::None);
        assert_eq!(result.strength, BreakoutStrength::Weak);
        assert_eq!(result.message, "No breakout detected");
        assert_eq!(result.volume_ratio, Some(5.0));
        assert_eq!(result.resistance_level, Some(110.0));
    }

    #[test]
    fn test_lookback_boundary() {
        let config = BreakoutConfig::default();
        let candles = window_with_current(112.5, 2000.0);

        let short = analyze_breakout(&candles[1..], &config);
        assert_eq!(short, BreakoutResult::insufficient_data());
        assert_eq!(short.message, "Insufficient data for analysis");

        let exact = analyze_breakout(&candles, &config);
        assert!(exact.has_breakout);
    }

    #[test]
    fn test_only_trailing_window_sets_levels() {
        let mut candles = vec![Candle::new(0, 50.0, 500.0, 10.0, 50.0, 1_000_000.0)];
        candles.extend(window_with_current(112.5, 2000.0));

        let result = analyze_breakout(&candles, &BreakoutConfig::default());
        assert_eq!(result.support_level, Some(90.0));
        assert_eq!(result.resistance_level, Some(110.0));
        assert_eq!(result.direction, BreakoutDirection::Up);
    }

    #[test]
    fn test_current_candle_excluded_from_levels() {
        let mut candles = window_with_current(112.5, 2000.0);
        candles[19].high = 150.0;
        candles[19].low = 50.0;

        let result = analyze_breakout(&candles, &BreakoutConfig::default());
        assert_eq!(result.support_level, Some(90.0));
        assert_eq!(result.resistance_level, Some(110.0));
    }

    #[test]
    fn test_zero_average_volume_cannot_confirm() {
        let mut candles = window_with_current(112.5, 2000.0);
        for candle in candles.iter_mut().take(19) {
            candle.volume = 0.0;
        }

        let result = analyze_breakout(&candles, &BreakoutConfig::default());
        assert_eq!(result.volume_ratio, None);
        assert_eq!(result.direction, BreakoutDirection::Up);
        assert_eq!(result.strength, BreakoutStrength::Weak);
    }

    #[test]
    fn test_lookback_below_two_is_insufficient() {
        let candles = window_with_current(112.5, 2000.0);
        for lookback in [0, 1] {
            let config = BreakoutConfig::default().with_lookback_period(lookback);
            assert_eq!(analyze_breakout(&candles, &config), BreakoutResult::insufficient_data());
        }
    }

    #[test]
    fn test_minimal_lookback() {
        let candles = vec![
            Candle::new(0, 100.0, 101.0, 99.0, 100.0, 10.0),
            Candle::new(60_000, 100.0, 103.0, 100.0, 102.0, 20.0),
        ];
        let config = BreakoutConfig::default().with_lookback_period(2);

        let result = analyze_breakout(&candles, &config);
        assert_eq!(result.direction, BreakoutDirection::Up);
        assert_eq!(result.strength, BreakoutStrength::Strong);
    }

    #[test]
    fn test_up_takes_priority_in_degenerate_configuration() {
        // With a negative threshold the band collapses and both conditions hold
        let config = BreakoutConfig::default().with_price_threshold(-0.5);
        let result = analyze_breakout(&window_with_current(100.0, 1000.0), &config);

        assert_eq!(result.direction, BreakoutDirection::Up);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let candles = window_with_current(89.0, 1200.0);
        let config = BreakoutConfig::default();
        assert_eq!(analyze_breakout(&candles, &config), analyze_breakout(&candles, &config));
    }
}
