use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type TimestampMS = i64;

/// One OHLCV bar. Owned by the caller; analytics only ever borrow it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: TimestampMS,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp: TimestampMS, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// High minus low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Lower and upper edge of the open/close body
    pub fn body_bounds(&self) -> (f64, f64) {
        (self.open.min(self.close), self.open.max(self.close))
    }

    /// Finite prices with `low <= {open, close} <= high` and non-negative volume
    pub fn is_well_formed(&self) -> bool {
        let finite = [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite());

        finite
            && self.low <= self.high
            && (self.low..=self.high).contains(&self.open)
            && (self.low..=self.high).contains(&self.close)
            && self.volume >= 0.0
    }

    /// Open time as a UTC datetime, if representable
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

/// Time bounds restricting which candles take part in a profile.
/// Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub from: TimestampMS,
    pub to: TimestampMS,
}

impl SessionWindow {
    pub fn new(from: TimestampMS, to: TimestampMS) -> Self {
        Self { from, to }
    }

    pub fn from_datetimes(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: from.timestamp_millis(),
            to: to.timestamp_millis(),
        }
    }

    pub fn contains(&self, timestamp: TimestampMS) -> bool {
        timestamp >= self.from && timestamp <= self.to
    }
}

/// Index of the first candle whose timestamp goes backwards, if any
pub fn first_out_of_order(candles: &[Candle]) -> Option<usize> {
    candles
        .windows(2)
        .position(|pair| pair[1].timestamp < pair[0].timestamp)
        .map(|i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_body_bounds_for_bearish_candle() {
        let candle = Candle::new(0, 104.0, 106.0, 98.0, 100.0, 10.0);
        assert_eq!(candle.body_bounds(), (100.0, 104.0));
        assert_eq!(candle.range(), 8.0);
    }

    #[test]
    fn test_well_formed_checks() {
        assert!(Candle::new(0, 100.0, 106.0, 98.0, 104.0, 1000.0).is_well_formed());
        assert!(!Candle::new(0, 100.0, 99.0, 98.0, 104.0, 1000.0).is_well_formed());
        assert!(!Candle::new(0, 100.0, 106.0, 98.0, 104.0, -1.0).is_well_formed());
        assert!(!Candle::new(0, f64::NAN, 106.0, 98.0, 104.0, 1.0).is_well_formed());
    }

    #[test]
    fn test_session_window_is_inclusive() {
        let from = Utc.with_ymd_and_hms(2025, 1, 16, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 1, 16, 1, 0, 0).unwrap();
        let session = SessionWindow::from_datetimes(from, to);

        assert!(session.contains(from.timestamp_millis()));
        assert!(session.contains(to.timestamp_millis()));
        assert!(!session.contains(to.timestamp_millis() + 1));
        assert!(!session.contains(from.timestamp_millis() - 1));
    }

    #[test]
    fn test_first_out_of_order() {
        let mut candles: Vec<Candle> = (0..5)
            .map(|i| Candle::new(i * 60_000, 1.0, 1.0, 1.0, 1.0, 1.0))
            .collect();
        assert_eq!(first_out_of_order(&candles), None);

        candles[3].timestamp = 0;
        assert_eq!(first_out_of_order(&candles), Some(3));
    }
}
