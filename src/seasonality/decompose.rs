//! Classical seasonal decomposition by moving averages.
//!
//! The series is split into:
//! - Trend: a centred moving average spanning one full period
//! - Seasonal: the per-phase mean of the detrended series, repeated
//! - Residual: what remains after removing trend and seasonal
//!
//! Trend and residual are undefined (NaN) for the first and last
//! `period / 2` observations, where the moving average has no full window.

use crate::error::{ForecastError, Result};
use crate::utils::stats::{nan_mean, variance};

/// How the components combine into the observed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecomposeModel {
    /// y = trend + seasonal + residual
    #[default]
    Additive,
    /// y = trend * seasonal * residual
    Multiplicative,
}

impl DecomposeModel {
    pub fn name(&self) -> &'static str {
        match self {
            DecomposeModel::Additive => "additive",
            DecomposeModel::Multiplicative => "multiplicative",
        }
    }
}

/// Result of a classical decomposition.
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub observed: Vec<f64>,
    /// Trend component, NaN at the edges.
    pub trend: Vec<f64>,
    /// Seasonal component, defined everywhere.
    pub seasonal: Vec<f64>,
    /// Residual component, NaN wherever the trend is.
    pub residual: Vec<f64>,
    pub period: usize,
    pub model: DecomposeModel,
}

impl Decomposition {
    /// One seasonal cycle, indexed by phase (`t % period`).
    pub fn seasonal_pattern(&self) -> &[f64] {
        &self.seasonal[..self.period.min(self.seasonal.len())]
    }

    /// Recombine the components; NaN where the trend is undefined.
    pub fn reconstruct(&self) -> Vec<f64> {
        self.trend
            .iter()
            .zip(&self.seasonal)
            .zip(&self.residual)
            .map(|((t, s), r)| match self.model {
                DecomposeModel::Additive => t + s + r,
                DecomposeModel::Multiplicative => t * s * r,
            })
            .collect()
    }

    /// Seasonal strength in [0, 1]. Values close to 1 indicate strong seasonality.
    pub fn seasonal_strength(&self) -> f64 {
        self.strength(&self.seasonal)
    }

    /// Trend strength in [0, 1]. Values close to 1 indicate strong trend.
    pub fn trend_strength(&self) -> f64 {
        self.strength(&self.trend)
    }

    /// `1 - Var(R) / Var(C + R)`, on the log scale for multiplicative models.
    fn strength(&self, component: &[f64]) -> f64 {
        let to_additive = |x: f64| match self.model {
            DecomposeModel::Additive => x,
            DecomposeModel::Multiplicative => x.ln(),
        };

        let (remainder, combined): (Vec<f64>, Vec<f64>) = component
            .iter()
            .zip(&self.residual)
            .map(|(&c, &r)| (to_additive(r), to_additive(c) + to_additive(r)))
            .filter(|(r, cr)| r.is_finite() && cr.is_finite())
            .unzip();

        let var_cr = variance(&combined);
        if var_cr.is_nan() || var_cr < 1e-10 {
            return 0.0;
        }
        (1.0 - variance(&remainder) / var_cr).clamp(0.0, 1.0)
    }
}

/// Classical decomposition configuration.
#[derive(Debug, Clone)]
pub struct ClassicalDecomposition {
    period: usize,
    model: DecomposeModel,
}

impl ClassicalDecomposition {
    pub fn new(period: usize, model: DecomposeModel) -> Self {
        Self { period, model }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn model(&self) -> DecomposeModel {
        self.model
    }

    /// Decompose `values` into trend, seasonal and residual.
    pub fn decompose(&self, values: &[f64]) -> Result<Decomposition> {
        let period = self.period;
        let n = values.len();

        if period < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonal period must be at least 2, got {period}"
            )));
        }
        if n < 2 * period {
            return Err(ForecastError::InsufficientData {
                needed: 2 * period,
                got: n,
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::MissingValues);
        }
        if self.model == DecomposeModel::Multiplicative && values.iter().any(|&v| v <= 0.0) {
            return Err(ForecastError::InvalidParameter(
                "multiplicative decomposition requires strictly positive values".to_string(),
            ));
        }

        let trend = centred_moving_average(values, period);

        let detrended: Vec<f64> = values
            .iter()
            .zip(&trend)
            .map(|(y, t)| match self.model {
                DecomposeModel::Additive => y - t,
                DecomposeModel::Multiplicative => y / t,
            })
            .collect();

        let mut pattern: Vec<f64> = (0..period)
            .map(|phase| {
                let phase_values: Vec<f64> =
                    detrended.iter().skip(phase).step_by(period).copied().collect();
                nan_mean(&phase_values)
            })
            .collect();

        let centre = nan_mean(&pattern);
        for s in pattern.iter_mut() {
            match self.model {
                DecomposeModel::Additive => *s -= centre,
                DecomposeModel::Multiplicative => *s /= centre,
            }
        }

        let seasonal: Vec<f64> = (0..n).map(|t| pattern[t % period]).collect();

        let residual: Vec<f64> = values
            .iter()
            .zip(&trend)
            .zip(&seasonal)
            .map(|((y, t), s)| match self.model {
                DecomposeModel::Additive => y - t - s,
                DecomposeModel::Multiplicative => y / (t * s),
            })
            .collect();

        Ok(Decomposition {
            observed: values.to_vec(),
            trend,
            seasonal,
            residual,
            period,
            model: self.model,
        })
    }
}

/// Decompose with a classical moving-average filter.
pub fn seasonal_decompose(
    values: &[f64],
    period: usize,
    model: DecomposeModel,
) -> Result<Decomposition> {
    ClassicalDecomposition::new(period, model).decompose(values)
}

/// Centred moving average over one period.
///
/// Even periods use the 2×m filter: `period + 1` taps with half weight at
/// both ends.
fn centred_moving_average(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let half = period / 2;
    let weights: Vec<f64> = if period % 2 == 0 {
        (0..=period)
            .map(|k| {
                if k == 0 || k == period {
                    0.5 / period as f64
                } else {
                    1.0 / period as f64
                }
            })
            .collect()
    } else {
        vec![1.0 / period as f64; period]
    };

    (0..n)
        .map(|t| {
            if t < half || t + half >= n {
                f64::NAN
            } else {
                weights
                    .iter()
                    .zip(&values[t - half..=t + half])
                    .map(|(w, y)| w * y)
                    .sum()
            }
        })
        .collect()
}
