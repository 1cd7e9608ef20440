use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::common::constants::{
    DEFAULT_BODY_WEIGHT, DEFAULT_TARGET_BINS, DEFAULT_VALUE_AREA_PCT, SUMMARY_PRICE_DECIMALS,
};
use crate::market_data::SessionWindow;
use super::errors::VolumeProfileError;

fn default_body_weight() -> f64 {
    DEFAULT_BODY_WEIGHT
}

fn default_value_area_pct() -> f64 {
    DEFAULT_VALUE_AREA_PCT
}

fn default_target_bins() -> u32 {
    DEFAULT_TARGET_BINS
}

/// Options for a single `build_profile` call
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileOptions {
    /// Bucket width; must be positive
    pub price_step: f64,
    /// Only candles inside this window take part
    pub session: Option<SessionWindow>,
    /// Share of each candle's volume assigned to its open/close body
    pub body_weight: f64,
    /// Target share of total volume covered by the value area
    pub value_area_pct: f64,
}

impl ProfileOptions {
    pub fn new(price_step: f64) -> Self {
        Self {
            price_step,
            session: None,
            body_weight: DEFAULT_BODY_WEIGHT,
            value_area_pct: DEFAULT_VALUE_AREA_PCT,
        }
    }

    pub fn with_session(mut self, session: SessionWindow) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_body_weight(mut self, body_weight: f64) -> Self {
        self.body_weight = body_weight;
        self
    }

    pub fn with_value_area_pct(mut self, value_area_pct: f64) -> Self {
        self.value_area_pct = value_area_pct;
        self
    }

    /// Validate the step and pull the weights back into their legal ranges.
    ///
    /// A non-positive or non-finite `price_step` is the only rejected input.
    pub fn normalized(&self) -> Result<Self, VolumeProfileError> {
        if !self.price_step.is_finite() || self.price_step <= 0.0 {
            return Err(VolumeProfileError::InvalidConfiguration(format!(
                "price_step must be > 0, got {}",
                self.price_step
            )));
        }

        let body_weight = if self.body_weight.is_finite() {
            self.body_weight.clamp(0.0, 1.0)
        } else {
            DEFAULT_BODY_WEIGHT
        };
        if body_weight != self.body_weight {
            warn!("body_weight {} outside [0, 1], using {}", self.body_weight, body_weight);
        }

        let value_area_pct = if self.value_area_pct.is_finite() && self.value_area_pct > 0.0 {
            self.value_area_pct.min(1.0)
        } else {
            DEFAULT_VALUE_AREA_PCT
        };
        if value_area_pct != self.value_area_pct {
            warn!("value_area_pct {} outside (0, 1], using {}", self.value_area_pct, value_area_pct);
        }

        Ok(Self {
            price_step: self.price_step,
            session: self.session,
            body_weight,
            value_area_pct,
        })
    }
}

/// Volume profile settings as read from `config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfileConfig {
    /// Fixed bucket width. Chosen from the data's price range when absent.
    #[serde(default)]
    pub price_step: Option<f64>,
    #[serde(default = "default_body_weight")]
    pub body_weight: f64,
    #[serde(default = "default_value_area_pct")]
    pub value_area_pct: f64,
    /// Bucket count the adaptive step aims for
    #[serde(default = "default_target_bins")]
    pub target_bins: u32,
    #[serde(default)]
    pub session: Option<SessionWindow>,
}

impl Default for VolumeProfileConfig {
    fn default() -> Self {
        Self {
            price_step: None,
            body_weight: DEFAULT_BODY_WEIGHT,
            value_area_pct: DEFAULT_VALUE_AREA_PCT,
            target_bins: DEFAULT_TARGET_BINS,
            session: None,
        }
    }
}

impl VolumeProfileConfig {
    /// Build call options for a resolved step
    pub fn to_options(&self, price_step: f64) -> ProfileOptions {
        ProfileOptions {
            price_step,
            session: self.session,
            body_weight: self.body_weight,
            value_area_pct: self.value_area_pct,
        }
    }

    /// Validate configuration for consistency and reasonable values
    pub fn validate(&self) -> Result<(), VolumeProfileError> {
        if let Some(step) = self.price_step {
            if !step.is_finite() || step <= 0.0 {
                return Err(VolumeProfileError::InvalidConfiguration(format!(
                    "price_step must be > 0, got {}", step
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.body_weight) {
            return Err(VolumeProfileError::InvalidConfiguration(format!(
                "body_weight must be between 0 and 1, got {}", self.body_weight
            )));
        }

        if !(self.value_area_pct > 0.0 && self.value_area_pct <= 1.0) {
            return Err(VolumeProfileError::InvalidConfiguration(format!(
                "value_area_pct must be in (0, 1], got {}", self.value_area_pct
            )));
        }

        if self.target_bins == 0 {
            return Err(VolumeProfileError::InvalidConfiguration(
                "target_bins must be positive".to_string(),
            ));
        }

        if let Some(session) = self.session {
            if session.from > session.to {
                return Err(VolumeProfileError::InvalidConfiguration(format!(
                    "session starts after it ends: {} > {}", session.from, session.to
                )));
            }
        }

        Ok(())
    }
}

/// One histogram bucket: `[price, price + price_step)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBin {
    /// Lower edge of the bucket
    pub price: f64,
    pub volume: f64,
}

/// Point of Control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointOfControl {
    pub price: f64,
    pub volume: f64,
    pub index: usize,
}

/// Contiguous band around the POC holding the target share of volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueArea {
    /// Lower edge of the lowest bucket in the band
    pub from: f64,
    /// Lower edge of the highest bucket in the band
    pub to: f64,
    /// Requested coverage
    pub coverage: f64,
    pub from_index: usize,
    pub to_index: usize,
    /// Volume actually inside the band
    pub volume: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileMeta {
    pub price_step: f64,
    pub body_weight: f64,
    pub value_area_pct: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// Volume-by-price distribution of a candle sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfile {
    /// Buckets in ascending price order
    pub histogram: Vec<PriceBin>,
    pub poc: PointOfControl,
    pub value_area: ValueArea,
    pub total_volume: f64,
    pub meta: ProfileMeta,
}

impl VolumeProfile {
    pub fn bin_count(&self) -> usize {
        self.histogram.len()
    }

    /// Share of total volume inside the value area, 0 when the profile is empty
    pub fn value_area_share(&self) -> f64 {
        if self.total_volume > 0.0 {
            self.value_area.volume / self.total_volume
        } else {
            0.0
        }
    }

    /// One-line description: POC and value area bounds
    pub fn summary(&self) -> String {
        format!(
            "Volume Profile: POC {:.prec$}, VA {:.prec$}-{:.prec$}",
            self.poc.price,
            self.value_area.from,
            self.value_area.to,
            prec = SUMMARY_PRICE_DECIMALS
        )
    }
}

/// Why no profile could be built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoDataReason {
    EmptyInput,
    SessionExcludedAll,
}

impl fmt::Display for NoDataReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoDataReason::EmptyInput => write!(f, "No candles to build a volume profile from"),
            NoDataReason::SessionExcludedAll => write!(f, "No candles inside the session window"),
        }
    }
}

/// Result of a profile build: a profile, or a neutral "no data" state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProfileOutcome {
    Ready(VolumeProfile),
    NoData { reason: NoDataReason },
}

impl ProfileOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, ProfileOutcome::Ready(_))
    }

    pub fn profile(&self) -> Option<&VolumeProfile> {
        match self {
            ProfileOutcome::Ready(profile) => Some(profile),
            ProfileOutcome::NoData { .. } => None,
        }
    }

    pub fn into_profile(self) -> Option<VolumeProfile> {
        match self {
            ProfileOutcome::Ready(profile) => Some(profile),
            ProfileOutcome::NoData { .. } => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ProfileOutcome::Ready(profile) => profile.summary(),
            ProfileOutcome::NoData { reason } => reason.to_string(),
        }
    }
}
