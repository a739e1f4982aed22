//! Analysis run configuration.

use crate::data::CsvOptions;
use crate::error::{ForecastError, Result};
use std::path::PathBuf;

/// Smallest chart that still leaves room for axes and a legend.
pub const MIN_CHART_WIDTH: u16 = 20;
pub const MIN_CHART_HEIGHT: u16 = 8;

/// Settings for one analysis run.
///
/// The defaults reproduce the standard dengue analysis: monthly data with a
/// yearly cycle, an 80/20 split, counts in thousands and a five-year
/// forecast.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub input: PathBuf,
    pub csv: CsvOptions,
    /// Share of rows used for training, in (0, 1).
    pub train_size: f64,
    /// Divisor applied to the counts before modelling.
    pub scale: f64,
    /// Forecast steps.
    pub horizon: usize,
    /// Seasonal period in observations.
    pub period: usize,
    /// Damping coefficient for the additive full-series model.
    pub damping: f64,
    /// Coverage of the prediction intervals reported alongside forecasts.
    pub interval_level: f64,
    pub plots: bool,
    pub chart_width: u16,
    pub chart_height: u16,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("dataset/dengue_cases.csv"),
            csv: CsvOptions::default(),
            train_size: 0.8,
            scale: 1000.0,
            horizon: 60,
            period: 12,
            damping: 0.98,
            interval_level: 0.95,
            plots: true,
            chart_width: 100,
            chart_height: 24,
        }
    }
}

impl AnalysisConfig {
    /// Check every setting before any work is done.
    pub fn validate(&self) -> Result<()> {
        if !(self.train_size > 0.0 && self.train_size < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "train size must lie in (0, 1), got {}",
                self.train_size
            )));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "scale must be finite and positive, got {}",
                self.scale
            )));
        }
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon must be at least 1".to_string(),
            ));
        }
        if self.period < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonal period must be at least 2, got {}",
                self.period
            )));
        }
        if !(self.damping > 0.0 && self.damping <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "damping must lie in (0, 1], got {}",
                self.damping
            )));
        }
        if !(self.interval_level > 0.0 && self.interval_level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval level must lie in (0, 1), got {}",
                self.interval_level
            )));
        }
        if self.plots && (self.chart_width < MIN_CHART_WIDTH || self.chart_height < MIN_CHART_HEIGHT)
        {
            return Err(ForecastError::InvalidParameter(format!(
                "charts need at least {MIN_CHART_WIDTH}x{MIN_CHART_HEIGHT} cells, got {}x{}",
                self.chart_width, self.chart_height
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.horizon, 60);
        assert_eq!(config.period, 12);
        assert_eq!(config.input, PathBuf::from("dataset/dengue_cases.csv"));
    }

    #[test]
    fn rejects_out_of_range_settings() {
        let cases = [
            AnalysisConfig {
                train_size: 1.0,
                ..Default::default()
            },
            AnalysisConfig {
                scale: 0.0,
                ..Default::default()
            },
            AnalysisConfig {
                horizon: 0,
                ..Default::default()
            },
            AnalysisConfig {
                period: 1,
                ..Default::default()
            },
            AnalysisConfig {
                damping: 1.2,
                ..Default::default()
            },
            AnalysisConfig {
                chart_width: 5,
                ..Default::default()
            },
        ];
        for config in cases {
            assert!(config.validate().is_err(), "{config:?}");
        }
    }

    #[test]
    fn chart_size_ignored_without_plots() {
        let config = AnalysisConfig {
            plots: false,
            chart_width: 0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
