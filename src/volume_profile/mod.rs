/// Volume Profile Module
///
/// Builds a volume-by-price histogram from a candle sequence, locates the
/// Point of Control and grows the value area around it. The adaptive step
/// selector picks a bucket width from the data when none is configured.
pub mod adaptive_step;
pub mod calculator;
pub mod errors;
pub mod precision;
pub mod structs;
pub mod validation;

pub use adaptive_step::{build_adaptive_profile, choose_step, choose_step_for_bins, snap_step};
pub use calculator::{build_profile, VolumeAccumulator};
pub use errors::VolumeProfileError;
pub use structs::{
    NoDataReason, PointOfControl, PriceBin, ProfileMeta, ProfileOptions, ProfileOutcome,
    ValueArea, VolumeProfile, VolumeProfileConfig,
};
pub use validation::{allocatable_volume, ProfileValidation, ProfileValidator};
