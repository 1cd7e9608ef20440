pub mod errors;
pub mod loader;
pub mod structs;

pub use errors::MarketDataError;
pub use loader::{load_candles_csv, parse_candles_csv};
pub use structs::{Candle, SessionWindow, TimestampMS};
