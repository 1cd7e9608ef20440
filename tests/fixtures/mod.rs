#![allow(dead_code)]

use candle_analytics::market_data::Candle;

pub const MINUTE_MS: i64 = 60_000;
pub const BASE_TIMESTAMP: i64 = 1_704_067_200_000; // 2024-01-01T00:00:00Z

/// Create a sample 1-minute candle around `price`
pub fn create_sample_candle(timestamp: i64, price: f64, volume: f64) -> Candle {
    Candle::new(timestamp, price, price + 1.0, price - 1.0, price + 0.5, volume)
}

/// Deterministic wandering series with varying bodies, wicks and volumes
pub fn create_candle_series(count: usize, start_price: f64) -> Vec<Candle> {
    let mut candles = Vec::with_capacity(count);
    let mut price = start_price;

    for i in 0..count {
        let phase = i as f64;
        let open = price;
        let close = open + (phase * 0.7).sin() * start_price * 0.004;
        let upper_wick = (phase * 1.3).cos().abs() * start_price * 0.002;
        let lower_wick = (phase * 0.9).sin().abs() * start_price * 0.002;
        let high = open.max(close) + upper_wick;
        let low = open.min(close) - lower_wick;
        let volume = 500.0 + (phase * 0.37).sin().abs() * 1500.0;

        candles.push(Candle::new(BASE_TIMESTAMP + i as i64 * MINUTE_MS, open, high, low, close, volume));
        price = close;
    }

    candles
}

/// `reference` candles ranging over [90, 110] with volume 1000, followed by one current candle
pub fn create_breakout_window(reference: usize, close: f64, volume: f64) -> Vec<Candle> {
    let mut candles: Vec<Candle> = (0..reference)
        .map(|i| Candle::new(BASE_TIMESTAMP + i as i64 * MINUTE_MS, 100.0, 110.0, 90.0, 100.0, 1000.0))
        .collect();

    candles.push(Candle::new(
        BASE_TIMESTAMP + reference as i64 * MINUTE_MS,
        100.0,
        close.max(100.0),
        close.min(100.0),
        close,
        volume,
    ));
    candles
}

/// Render candles as a headered kline CSV
pub fn candles_to_csv(candles: &[Candle]) -> String {
    let mut csv = String::from("timestamp,open,high,low,close,volume\n");
    for c in candles {
        csv.push_str(&format!("{},{},{},{},{},{}\n", c.timestamp, c.open, c.high, c.low, c.close, c.volume));
    }
    csv
}
