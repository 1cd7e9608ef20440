//! Structural checks on a built profile: volume conservation, POC validity and
//! value area containment.

use tracing::debug;

use crate::market_data::Candle;
use super::precision::bucket_count;
use super::structs::VolumeProfile;

/// Outcome of validating a profile
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileValidation {
    pub is_valid: bool,
    /// Rule violations
    pub errors: Vec<String>,
    /// Edge cases that don't invalidate the result
    pub warnings: Vec<String>,
}

/// Checks the invariants every `VolumeProfile` must hold
#[derive(Debug, Clone)]
pub struct ProfileValidator {
    /// Relative tolerance for volume sums
    pub tolerance: f64,
}

impl Default for ProfileValidator {
    fn default() -> Self {
        Self { tolerance: 1e-6 }
    }
}

/// Volume a profile should account for: candles with a price range and positive volume
pub fn allocatable_volume(candles: &[Candle]) -> f64 {
    candles
        .iter()
        .filter(|c| c.range() != 0.0 && c.volume > 0.0)
        .map(|c| c.volume)
        .sum()
}

impl ProfileValidator {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Validate `profile`; pass `input_volume` to also check conservation against the source candles
    pub fn validate(&self, profile: &VolumeProfile, input_volume: Option<f64>) -> ProfileValidation {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let histogram = &profile.histogram;

        if histogram.is_empty() {
            errors.push("histogram is empty".to_string());
            return ProfileValidation { is_valid: false, errors, warnings };
        }

        let meta = &profile.meta;
        let expected_bins = bucket_count(meta.min_price, meta.max_price, meta.price_step);
        if histogram.len() != expected_bins {
            errors.push(format!("expected {} bins, found {}", expected_bins, histogram.len()));
        }

        let histogram_total: f64 = histogram.iter().map(|b| b.volume).sum();
        if !self.close_enough(histogram_total, profile.total_volume) {
            errors.push(format!(
                "total_volume {} differs from histogram sum {}",
                profile.total_volume, histogram_total
            ));
        }

        if let Some(expected) = input_volume {
            if !self.close_enough(histogram_total, expected) {
                errors.push(format!(
                    "volume not conserved: input {} vs histogram {}",
                    expected, histogram_total
                ));
            }
        }

        let poc = &profile.poc;
        if poc.index >= histogram.len() {
            errors.push(format!("POC index {} out of range 0..{}", poc.index, histogram.len()));
        } else if let Some(bigger) = histogram.iter().position(|b| b.volume > poc.volume) {
            errors.push(format!(
                "bin {} holds {} which exceeds POC volume {}",
                bigger, histogram[bigger].volume, poc.volume
            ));
        }

        let va = &profile.value_area;
        if !(va.from <= poc.price && poc.price <= va.to) {
            errors.push(format!(
                "POC {} outside value area [{}, {}]",
                poc.price, va.from, va.to
            ));
        }

        let spans_all = va.from_index == 0 && va.to_index + 1 == histogram.len();
        if va.to_index < histogram.len() && va.from_index <= va.to_index {
            let covered: f64 = histogram[va.from_index..=va.to_index].iter().map(|b| b.volume).sum();
            let target = meta.value_area_pct * profile.total_volume;
            if covered < target && !spans_all && !self.close_enough(covered, target) {
                errors.push(format!(
                    "value area holds {} but target is {}",
                    covered, target
                ));
            }
        } else {
            errors.push(format!(
                "value area indices [{}, {}] invalid for {} bins",
                va.from_index, va.to_index, histogram.len()
            ));
        }

        if histogram.len() == 1 {
            warnings.push("single-bin profile".to_string());
        }
        if profile.total_volume <= 0.0 {
            warnings.push("profile carries no volume".to_string());
        }

        debug!("Profile validation: {} errors, {} warnings", errors.len(), warnings.len());

        ProfileValidation {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    fn close_enough(&self, a: f64, b: f64) -> bool {
        let scale = a.abs().max(b.abs()).max(1.0);
        (a - b).abs() <= self.tolerance * scale
    }
}
