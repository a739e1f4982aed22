//! # epicast
//!
//! Analysis of monthly epidemiological case counts.
//!
//! Loads a dated CSV series, splits it into training and test partitions,
//! decomposes it into trend, seasonal and residual components, and
//! forecasts it with Holt-Winters exponential smoothing. Reports and text
//! charts are written to any `io::Write`.
//!
//! ```no_run
//! use epicast::prelude::*;
//!
//! let mut dataset = Dataset::from_csv("dataset/dengue_cases.csv", 0.8)?;
//! dataset.set_scale(1000.0)?;
//!
//! let mut model = HoltWinters::additive(12).damping(Damping::Fixed(0.98));
//! model.fit(dataset.train())?;
//! let forecast = model.predict(60)?;
//! assert_eq!(forecast.horizon(), 60);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod plot;
pub mod report;
pub mod seasonality;
pub mod utils;

pub use error::{ForecastError, LoadError, Result};

pub mod prelude {
    pub use crate::core::{Forecast, Frequency, TimeSeries};
    pub use crate::data::{CsvOptions, Dataset};
    pub use crate::error::{ForecastError, LoadError, Result};
    pub use crate::models::exponential::{Damping, HoltWinters, SeasonalType, TrendType};
    pub use crate::models::Forecaster;
    pub use crate::seasonality::{seasonal_decompose, DecomposeModel};
    pub use crate::utils::{calculate_metrics, AccuracyMetrics};
}
