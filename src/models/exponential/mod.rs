//! Exponential smoothing models.
//!
//! Holt-Winters triple exponential smoothing with additive or
//! multiplicative seasonality and an optionally damped trend.

mod holt_winters;
mod summary;

pub use holt_winters::{Damping, HoltWinters, SeasonalType, SmoothingParams, TrendType};
pub use summary::{InformationCriteria, ModelSummary, ParamEstimate};
