/// Breakout Module
///
/// Classifies whether the latest candle closed beyond the support/resistance
/// band of the candles before it, graded by volume confirmation. Also finds
/// the plain extremes of a chart's visible window.
pub mod detector;
pub mod levels;
pub mod structs;

pub use detector::analyze_breakout;
pub use levels::{find_extremes, select_visible_window, PriceExtremes, VisibleRange};
pub use structs::{BreakoutConfig, BreakoutDirection, BreakoutResult, BreakoutStrength};
