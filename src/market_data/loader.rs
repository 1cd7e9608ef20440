use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, warn};

use super::errors::MarketDataError;
use super::structs::{first_out_of_order, Candle, TimestampMS};

/// Parse kline CSV data into candles.
///
/// Accepts the Binance kline column layout (`open_time, open, high, low, close,
/// volume, ...`) as well as a plain six-column `timestamp,open,high,low,close,volume`
/// file. Extra columns are ignored. A leading header row is detected and skipped.
pub fn parse_candles_csv(csv_data: &[u8]) -> Result<Vec<Candle>, MarketDataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(csv_data);

    let mut candles = Vec::new();

    for (line, record) in reader.records().enumerate() {
        let record = record?;

        if line == 0 && is_header(&record) {
            debug!("Skipping CSV header row: {:?}", record);
            continue;
        }

        let candle = parse_record(&record, line + 1)?;
        if !candle.is_well_formed() {
            return Err(MarketDataError::Validation(format!(
                "line {}: malformed candle {:?}",
                line + 1,
                candle
            )));
        }
        candles.push(candle);
    }

    if candles.is_empty() {
        return Err(MarketDataError::NoData("No klines parsed".to_string()));
    }

    if let Some(index) = first_out_of_order(&candles) {
        warn!("Candle timestamps go backwards at row {} ({} < {})",
              index, candles[index].timestamp, candles[index - 1].timestamp);
    }

    debug!("Parsed {} candles from CSV", candles.len());
    Ok(candles)
}

/// Read and parse a kline CSV file
pub fn load_candles_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Candle>, MarketDataError> {
    let data = std::fs::read(path.as_ref())?;
    debug!("Loaded {} bytes from {}", data.len(), path.as_ref().display());
    parse_candles_csv(&data)
}

/// A header's first column is not numeric at all; numeric but non-integer
/// timestamps are data and fail in `parse_record`
fn is_header(record: &StringRecord) -> bool {
    record
        .get(0)
        .map(|field| field.parse::<f64>().is_err())
        .unwrap_or(false)
}

fn parse_record(record: &StringRecord, line: usize) -> Result<Candle, MarketDataError> {
    if record.len() < 6 {
        return Err(MarketDataError::Validation(format!(
            "line {}: expected at least 6 columns, got {}",
            line,
            record.len()
        )));
    }

    let field = |idx: usize| -> Result<f64, MarketDataError> {
        record[idx].parse::<f64>().map_err(|e| {
            MarketDataError::Validation(format!("line {}, column {}: {}", line, idx, e))
        })
    };

    let timestamp = record[0].parse::<TimestampMS>().map_err(|e| {
        MarketDataError::Validation(format!("line {}, column 0: {}", line, e))
    })?;

    Ok(Candle::new(timestamp, field(1)?, field(2)?, field(3)?, field(4)?, field(5)?))
}
