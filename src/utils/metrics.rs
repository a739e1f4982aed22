//! Accuracy metrics for comparing a forecast with held-out observations.

use crate::error::{ForecastError, Result};
use std::fmt;

/// Accuracy of a forecast against the actual values it tried to predict.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyMetrics {
    /// Number of compared points.
    pub n: usize,
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error (None if any actual value is zero)
    pub mape: Option<f64>,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

/// Calculate accuracy metrics between actual and predicted values.
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> Result<AccuracyMetrics> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }

    let n = actual.len() as f64;
    let pairs = || actual.iter().zip(predicted.iter());

    let mae = pairs().map(|(a, p)| (a - p).abs()).sum::<f64>() / n;
    let rmse = (pairs().map(|(a, p)| (a - p).powi(2)).sum::<f64>() / n).sqrt();

    let mape = if actual.contains(&0.0) {
        None
    } else {
        Some(100.0 * pairs().map(|(a, p)| ((a - p) / a).abs()).sum::<f64>() / n)
    };

    let smape = 100.0
        * pairs()
            .map(|(a, p)| {
                let denom = a.abs() + p.abs();
                if denom == 0.0 {
                    0.0
                } else {
                    2.0 * (a - p).abs() / denom
                }
            })
            .sum::<f64>()
        / n;

    Ok(AccuracyMetrics {
        n: actual.len(),
        mae,
        rmse,
        mape,
        smape,
    })
}

impl fmt::Display for AccuracyMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<8} {:>14}", "points", self.n)?;
        writeln!(f, "{:<8} {:>14.6}", "MAE", self.mae)?;
        writeln!(f, "{:<8} {:>14.6}", "RMSE", self.rmse)?;
        match self.mape {
            Some(mape) => writeln!(f, "{:<8} {:>13.3}%", "MAPE", mape)?,
            None => writeln!(f, "{:<8} {:>14}", "MAPE", "n/a")?,
        }
        writeln!(f, "{:<8} {:>13.3}%", "sMAPE", self.smape)
    }
}
