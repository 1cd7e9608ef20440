use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::constants::{
    DEFAULT_LOOKBACK_PERIOD, DEFAULT_PRICE_THRESHOLD, DEFAULT_VOLUME_THRESHOLD,
};

fn default_lookback_period() -> usize {
    DEFAULT_LOOKBACK_PERIOD
}

fn default_volume_threshold() -> f64 {
    DEFAULT_VOLUME_THRESHOLD
}

fn default_price_threshold() -> f64 {
    DEFAULT_PRICE_THRESHOLD
}

/// Breakout detection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutConfig {
    /// Candles inspected, current candle included
    #[serde(default = "default_lookback_period")]
    pub lookback_period: usize,
    /// Multiple of the reference average volume needed for a strong break
    #[serde(default = "default_volume_threshold")]
    pub volume_threshold: f64,
    /// Fractional distance beyond a level needed to count as a break
    #[serde(default = "default_price_threshold")]
    pub price_threshold: f64,
}

impl Default for BreakoutConfig {
    fn default() -> Self {
        Self {
            lookback_period: DEFAULT_LOOKBACK_PERIOD,
            volume_threshold: DEFAULT_VOLUME_THRESHOLD,
            price_threshold: DEFAULT_PRICE_THRESHOLD,
        }
    }
}

impl BreakoutConfig {
    pub fn with_lookback_period(mut self, lookback_period: usize) -> Self {
        self.lookback_period = lookback_period;
        self
    }

    pub fn with_volume_threshold(mut self, volume_threshold: f64) -> Self {
        self.volume_threshold = volume_threshold;
        self
    }

    pub fn with_price_threshold(mut self, price_threshold: f64) -> Self {
        self.price_threshold = price_threshold;
        self
    }

    /// Validate settings loaded from a config file
    pub fn validate(&self) -> Result<(), String> {
        if self.lookback_period < 2 {
            return Err(format!(
                "lookback_period must be at least 2, got {}",
                self.lookback_period
            ));
        }

        if !self.volume_threshold.is_finite() || self.volume_threshold < 0.0 {
            return Err(format!(
                "volume_threshold must be a non-negative number, got {}",
                self.volume_threshold
            ));
        }

        if !self.price_threshold.is_finite() || self.price_threshold < 0.0 {
            return Err(format!(
                "price_threshold must be a non-negative number, got {}",
                self.price_threshold
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakoutDirection {
    Up,
    Down,
    None,
}

impl fmt::Display for BreakoutDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakoutDirection::Up => write!(f, "up"),
            BreakoutDirection::Down => write!(f, "down"),
            BreakoutDirection::None => write!(f, "none"),
        }
    }
}

/// Whether volume confirmed the break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakoutStrength {
    Weak,
    Strong,
}

impl fmt::Display for BreakoutStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakoutStrength::Weak => write!(f, "weak"),
            BreakoutStrength::Strong => write!(f, "strong"),
        }
    }
}

/// Classification of the latest candle against the preceding support/resistance band.
///
/// Level and price fields are `None` when there was not enough data to compute them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutResult {
    pub has_breakout: bool,
    pub direction: BreakoutDirection,
    pub strength: BreakoutStrength,
    pub support_level: Option<f64>,
    pub resistance_level: Option<f64>,
    pub current_price: Option<f64>,
    /// Current volume over the reference average; `None` when the average is zero
    pub volume_ratio: Option<f64>,
    pub message: String,
}

impl BreakoutResult {
    /// Neutral result for a window too short to analyze
    pub fn insufficient_data() -> Self {
        Self {
            has_breakout: false,
            direction: BreakoutDirection::None,
            strength: BreakoutStrength::Weak,
            support_level: None,
            resistance_level: None,
            current_price: None,
            volume_ratio: None,
            message: "Insufficient data for analysis".to_string(),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.has_breakout && self.strength == BreakoutStrength::Strong
    }
}
