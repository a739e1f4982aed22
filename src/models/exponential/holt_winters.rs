//! Holt-Winters forecasting model.
//!
//! Also known as triple exponential smoothing, this model handles
//! data with a (possibly damped) trend and seasonality.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::exponential::summary::{InformationCriteria, ModelSummary, ParamEstimate};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::{mean, quantile_normal};
use tracing::debug;

const SMOOTHING_BOUNDS: (f64, f64) = (0.0001, 0.9999);
const PHI_BOUNDS: (f64, f64) = (0.8, 0.98);

/// Type of trend component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendType {
    /// Level only.
    None,
    /// Linear trend, optionally damped.
    #[default]
    Additive,
}

/// Type of seasonal component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeasonalType {
    /// Additive seasonality: y_t = l_t + b_t + s_t + e_t
    #[default]
    Additive,
    /// Multiplicative seasonality: y_t = (l_t + b_t) * s_t + e_t
    Multiplicative,
}

/// Damping applied to the trend.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Damping {
    /// Undamped trend (phi = 1).
    #[default]
    None,
    /// Fixed damping coefficient in (0, 1]. `Fixed(1.0)` is undamped.
    Fixed(f64),
    /// Damping coefficient estimated together with the smoothing parameters.
    Estimated,
}

/// Smoothing parameters of a fitted model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParams {
    pub alpha: f64,
    /// None when the model has no trend.
    pub beta: Option<f64>,
    pub gamma: f64,
    /// Damping coefficient; 1.0 when undamped.
    pub phi: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Param {
    Alpha,
    Beta,
    Gamma,
    Phi,
}

/// Level, trend and seasonal states.
#[derive(Debug, Clone, PartialEq)]
struct States {
    level: f64,
    trend: f64,
    /// Indexed by phase `t % period`.
    seasonals: Vec<f64>,
}

/// Output of one pass of the smoothing recursions.
struct Pass {
    fitted: Vec<f64>,
    sse: f64,
    states: States,
}

/// Holt-Winters forecaster.
///
/// Error-correction form with damping coefficient `φ` (1 when undamped):
/// - Level: `l_t = α(y_t - s_{t-m}) + (1-α)(l_{t-1} + φb_{t-1})`
/// - Trend: `b_t = β(l_t - l_{t-1}) + (1-β)φb_{t-1}`
/// - Seasonal: `s_t = γ(y_t - l_{t-1} - φb_{t-1}) + (1-γ)s_{t-m}`
/// - Forecast: `ŷ_{t+h} = l_t + (φ + … + φ^h)b_t + s_{t+h-m}`
///
/// Multiplicative seasonality divides by the seasonal index in the level
/// update and multiplies it into the forecast. Free parameters are chosen by
/// minimising the in-sample sum of squared one-step errors.
#[derive(Debug, Clone)]
pub struct HoltWinters {
    seasonal_period: usize,
    trend_type: TrendType,
    seasonal_type: SeasonalType,
    damping: Damping,
    /// Fixed alpha, beta, gamma; estimated when None.
    fixed: Option<(f64, f64, f64)>,
    params: Option<SmoothingParams>,
    initial: Option<States>,
    state: Option<States>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    sse: Option<f64>,
    optimizer_iterations: usize,
    optimizer_converged: bool,
    /// Original series length.
    n: usize,
}

impl HoltWinters {
    /// Additive trend, additive seasonality, undamped, parameters estimated.
    pub fn new(seasonal_period: usize) -> Self {
        Self {
            seasonal_period,
            trend_type: TrendType::Additive,
            seasonal_type: SeasonalType::Additive,
            damping: Damping::None,
            fixed: None,
            params: None,
            initial: None,
            state: None,
            fitted: None,
            residuals: None,
            sse: None,
            optimizer_iterations: 0,
            optimizer_converged: false,
            n: 0,
        }
    }

    /// Model with additive seasonality.
    pub fn additive(seasonal_period: usize) -> Self {
        Self::new(seasonal_period).seasonal(SeasonalType::Additive)
    }

    /// Model with multiplicative seasonality.
    pub fn multiplicative(seasonal_period: usize) -> Self {
        Self::new(seasonal_period).seasonal(SeasonalType::Multiplicative)
    }

    pub fn trend(mut self, trend_type: TrendType) -> Self {
        self.trend_type = trend_type;
        self
    }

    pub fn seasonal(mut self, seasonal_type: SeasonalType) -> Self {
        self.seasonal_type = seasonal_type;
        self
    }

    pub fn damping(mut self, damping: Damping) -> Self {
        self.damping = damping;
        self
    }

    /// Fix the smoothing parameters instead of estimating them.
    ///
    /// Values are clamped into (0, 1); `beta` is ignored without a trend.
    pub fn with_params(mut self, alpha: f64, beta: f64, gamma: f64) -> Self {
        let (lo, hi) = SMOOTHING_BOUNDS;
        self.fixed = Some((alpha.clamp(lo, hi), beta.clamp(lo, hi), gamma.clamp(lo, hi)));
        self
    }

    pub fn seasonal_period(&self) -> usize {
        self.seasonal_period
    }

    pub fn trend_type(&self) -> TrendType {
        self.trend_type
    }

    pub fn seasonal_type(&self) -> SeasonalType {
        self.seasonal_type
    }

    pub fn damping_kind(&self) -> Damping {
        self.damping
    }

    /// Whether the trend is damped (phi below 1 or estimated).
    pub fn is_damped(&self) -> bool {
        match self.damping {
            Damping::None => false,
            Damping::Fixed(phi) => phi < 1.0,
            Damping::Estimated => true,
        }
    }

    /// Smoothing parameters, available after fitting.
    pub fn params(&self) -> Option<SmoothingParams> {
        self.params
    }

    /// Current level, after fitting.
    pub fn level(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.level)
    }

    /// Current trend, after fitting (0 without a trend component).
    pub fn trend_state(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.trend)
    }

    /// Latest seasonal indices, indexed by phase.
    pub fn seasonals(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.seasonals.as_slice())
    }

    /// In-sample sum of squared one-step errors.
    pub fn sse(&self) -> Option<f64> {
        self.sse
    }

    fn validate(&self, values: &[f64]) -> Result<()> {
        let period = self.seasonal_period;
        if period < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonal period must be at least 2, got {period}"
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::MissingValues);
        }
        if values.len() < 2 * period {
            return Err(ForecastError::InsufficientData {
                needed: 2 * period,
                got: values.len(),
            });
        }
        if self.seasonal_type == SeasonalType::Multiplicative && values.iter().any(|&v| v <= 0.0)
        {
            return Err(ForecastError::InvalidParameter(
                "multiplicative seasonality requires strictly positive data".to_string(),
            ));
        }
        match (self.damping, self.trend_type) {
            (Damping::Fixed(phi), _) if !(phi > 0.0 && phi <= 1.0) => {
                Err(ForecastError::InvalidParameter(format!(
                    "damping coefficient must lie in (0, 1], got {phi}"
                )))
            }
            (Damping::Fixed(phi), TrendType::None) if phi < 1.0 => Err(
                ForecastError::InvalidParameter("only a trend can be damped".to_string()),
            ),
            (Damping::Estimated, TrendType::None) => Err(ForecastError::InvalidParameter(
                "only a trend can be damped".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Initial states from the first two seasonal cycles.
    ///
    /// The level and trend come from the means of the two cycles. Additive
    /// indices average each phase's deviation from that line; multiplicative
    /// indices average each phase's ratio to its own cycle mean, which stays
    /// positive when the line would cross zero.
    fn initialize_state(&self, values: &[f64]) -> States {
        let m = self.seasonal_period;
        let first = mean(&values[..m]);
        let second = mean(&values[m..2 * m]);
        let trend = match self.trend_type {
            TrendType::None => 0.0,
            TrendType::Additive => (second - first) / m as f64,
        };

        // Straight line through the midpoint of the first cycle.
        let mid = (m as f64 - 1.0) / 2.0;
        let line = |t: usize| first + (t as f64 - mid) * trend;

        let mut seasonals: Vec<f64> = (0..m)
            .map(|i| {
                let (a, b) = (values[i], values[i + m]);
                match self.seasonal_type {
                    SeasonalType::Additive => ((a - line(i)) + (b - line(i + m))) / 2.0,
                    SeasonalType::Multiplicative => (a / first + b / second) / 2.0,
                }
            })
            .collect();
        normalize_seasonals(&mut seasonals, self.seasonal_type);

        States {
            // Level one step before the first observation.
            level: line(0) - trend,
            trend,
            seasonals,
        }
    }

    /// Run the smoothing recursions over `values`.
    fn run(&self, values: &[f64], params: &SmoothingParams, initial: &States) -> Pass {
        let m = self.seasonal_period;
        let alpha = params.alpha;
        let beta = params.beta.unwrap_or(0.0);
        let gamma = params.gamma;
        let phi = params.phi;
        let has_trend = self.trend_type == TrendType::Additive;

        let mut level = initial.level;
        let mut trend = initial.trend;
        let mut seasonals = initial.seasonals.clone();
        let mut fitted = Vec::with_capacity(values.len());
        let mut sse = 0.0;

        for (t, &y) in values.iter().enumerate() {
            let idx = t % m;
            let s = seasonals[idx];
            let base = level + phi * trend;

            let forecast = match self.seasonal_type {
                SeasonalType::Additive => base + s,
                SeasonalType::Multiplicative => base * s,
            };
            fitted.push(forecast);
            sse += (y - forecast).powi(2);

            let level_prev = level;
            match self.seasonal_type {
                SeasonalType::Additive => {
                    level = alpha * (y - s) + (1.0 - alpha) * base;
                    seasonals[idx] = gamma * (y - base) + (1.0 - gamma) * s;
                }
                SeasonalType::Multiplicative => {
                    let deseasonalized = if s.abs() > 1e-10 { y / s } else { y };
                    level = alpha * deseasonalized + (1.0 - alpha) * base;
                    if base.abs() > 1e-10 {
                        seasonals[idx] = gamma * (y / base) + (1.0 - gamma) * s;
                    }
                }
            }
            if has_trend {
                trend = beta * (level - level_prev) + (1.0 - beta) * phi * trend;
            }
        }

        Pass {
            fitted,
            sse,
            states: States {
                level,
                trend,
                seasonals,
            },
        }
    }

    /// Parameters left to the optimiser.
    fn free_params(&self) -> Vec<Param> {
        let mut free = Vec::new();
        if self.fixed.is_none() {
            free.push(Param::Alpha);
            if self.trend_type == TrendType::Additive {
                free.push(Param::Beta);
            }
            free.push(Param::Gamma);
        }
        if self.damping == Damping::Estimated {
            free.push(Param::Phi);
        }
        free
    }

    /// Combine fixed settings with the optimiser's point.
    fn assemble(&self, free: &[Param], point: &[f64]) -> SmoothingParams {
        let (alpha, beta, gamma) = self.fixed.unwrap_or((0.3, 0.1, 0.1));
        let mut params = SmoothingParams {
            alpha,
            beta: (self.trend_type == TrendType::Additive).then_some(beta),
            gamma,
            phi: match self.damping {
                Damping::Fixed(phi) => phi,
                _ => 1.0,
            },
        };
        for (param, &value) in free.iter().zip(point) {
            match param {
                Param::Alpha => params.alpha = value,
                Param::Beta => params.beta = Some(value),
                Param::Gamma => params.gamma = value,
                Param::Phi => params.phi = value,
            }
        }
        params
    }

    /// Estimate the free parameters; also returns the optimiser's iteration
    /// count and convergence flag when anything was estimated.
    fn optimize_params(
        &self,
        values: &[f64],
        initial: &States,
    ) -> (SmoothingParams, Option<(usize, bool)>) {
        let free = self.free_params();
        if free.is_empty() {
            return (self.assemble(&free, &[]), None);
        }

        let (start, bounds): (Vec<f64>, Vec<(f64, f64)>) = free
            .iter()
            .map(|p| match p {
                Param::Alpha => (0.3, SMOOTHING_BOUNDS),
                Param::Beta | Param::Gamma => (0.1, SMOOTHING_BOUNDS),
                Param::Phi => (0.98, PHI_BOUNDS),
            })
            .unzip();

        let config = NelderMeadConfig {
            max_iter: 1000,
            tolerance: 1e-10,
            ..Default::default()
        };

        let result = nelder_mead(
            |point| {
                let params = self.assemble(&free, point);
                let sse = self.run(values, &params, initial).sse;
                if sse.is_finite() {
                    sse
                } else {
                    f64::INFINITY
                }
            },
            &start,
            Some(bounds.as_slice()),
            config,
        );

        debug!(
            iterations = result.iterations,
            converged = result.converged,
            sse = result.optimal_value,
            "holt-winters parameters optimised"
        );

        (
            self.assemble(&free, &result.optimal_point),
            Some((result.iterations, result.converged)),
        )
    }

    /// Sum of `φ + φ² + … + φ^h`.
    fn damped_sum(phi: f64, h: usize) -> f64 {
        if (phi - 1.0).abs() < 1e-10 {
            h as f64
        } else {
            phi * (1.0 - phi.powi(h as i32)) / (1.0 - phi)
        }
    }

    fn point_forecast(&self, state: &States, phi: f64, h: usize) -> f64 {
        let s = state.seasonals[(self.n + h - 1) % self.seasonal_period];
        let base = state.level + Self::damped_sum(phi, h) * state.trend;
        match self.seasonal_type {
            SeasonalType::Additive => base + s,
            SeasonalType::Multiplicative => base * s,
        }
    }

    /// Summary of the fitted model: information criteria, parameters and
    /// initial states.
    pub fn summary(&self) -> Result<ModelSummary> {
        let params = self.params.ok_or(ForecastError::FitRequired)?;
        let initial = self.initial.as_ref().ok_or(ForecastError::FitRequired)?;
        let sse = self.sse.ok_or(ForecastError::FitRequired)?;

        let free = self.free_params();
        let estimated = |p: Param| free.contains(&p);

        let mut parameters = vec![ParamEstimate::new(
            "smoothing_level",
            "alpha",
            params.alpha,
            estimated(Param::Alpha),
        )];
        if let Some(beta) = params.beta {
            parameters.push(ParamEstimate::new(
                "smoothing_trend",
                "beta",
                beta,
                estimated(Param::Beta),
            ));
        }
        parameters.push(ParamEstimate::new(
            "smoothing_seasonal",
            "gamma",
            params.gamma,
            estimated(Param::Gamma),
        ));
        if self.is_damped() {
            parameters.push(ParamEstimate::new(
                "damping_trend",
                "phi",
                params.phi,
                estimated(Param::Phi),
            ));
        }
        parameters.push(ParamEstimate::new("initial_level", "l.0", initial.level, false));
        if self.trend_type == TrendType::Additive {
            parameters.push(ParamEstimate::new("initial_trend", "b.0", initial.trend, false));
        }
        for (i, s) in initial.seasonals.iter().enumerate() {
            parameters.push(ParamEstimate::new(
                format!("initial_seasons.{i}"),
                format!("s.{i}"),
                *s,
                false,
            ));
        }

        // Free smoothing parameters plus the initial states.
        let k = free.len()
            + 1
            + usize::from(self.trend_type == TrendType::Additive)
            + self.seasonal_period;

        Ok(ModelSummary {
            model: self.name().to_string(),
            nobs: self.n,
            sse,
            n_params: k,
            criteria: InformationCriteria::from_sse(self.n, sse, k),
            trend: self.trend_type,
            seasonal: self.seasonal_type,
            damped: self.is_damped(),
            seasonal_periods: self.seasonal_period,
            parameters,
            iterations: self.optimizer_iterations,
            converged: self.optimizer_converged,
        })
    }
}

/// Additive seasonals sum to 0; multiplicative ones average to 1.
fn normalize_seasonals(seasonals: &mut [f64], seasonal_type: SeasonalType) {
    let period = seasonals.len();
    if period == 0 {
        return;
    }
    let centre = seasonals.iter().sum::<f64>() / period as f64;
    match seasonal_type {
        SeasonalType::Additive => seasonals.iter_mut().for_each(|s| *s -= centre),
        SeasonalType::Multiplicative => {
            if centre.abs() > 1e-10 {
                seasonals.iter_mut().for_each(|s| *s /= centre);
            }
        }
    }
}

impl Default for HoltWinters {
    fn default() -> Self {
        Self::new(12)
    }
}

impl Forecaster for HoltWinters {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.values();
        self.validate(values)?;
        self.n = values.len();

        let initial = self.initialize_state(values);
        let (params, optimizer) = self.optimize_params(values, &initial);

        let pass = self.run(values, &params, &initial);
        if !pass.sse.is_finite() {
            return Err(ForecastError::ComputationError(
                "smoothing recursions diverged".to_string(),
            ));
        }

        let (iterations, converged) = optimizer.unwrap_or((0, true));
        self.optimizer_iterations = iterations;
        self.optimizer_converged = converged;

        debug!(
            model = self.name(),
            n = self.n,
            alpha = params.alpha,
            beta = params.beta,
            gamma = params.gamma,
            phi = params.phi,
            sse = pass.sse,
            "holt-winters fitted"
        );

        self.residuals = Some(
            values
                .iter()
                .zip(&pass.fitted)
                .map(|(y, f)| y - f)
                .collect(),
        );
        self.fitted = Some(pass.fitted);
        self.sse = Some(pass.sse);
        self.params = Some(params);
        self.initial = Some(initial);
        self.state = Some(pass.states);

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let state = self.state.as_ref().ok_or(ForecastError::FitRequired)?;
        let params = self.params.ok_or(ForecastError::FitRequired)?;

        let predictions = (1..=horizon)
            .map(|h| self.point_forecast(state, params.phi, h))
            .collect();

        Ok(Forecast::from_values(predictions))
    }

    /// Intervals use the additive-error variance of the one-step residuals
    /// propagated through the smoothing weights; for multiplicative
    /// seasonality this is an approximation.
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let state = self.state.as_ref().ok_or(ForecastError::FitRequired)?;
        let params = self.params.ok_or(ForecastError::FitRequired)?;
        let sse = self.sse.ok_or(ForecastError::FitRequired)?;

        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "interval level must lie in (0, 1), got {level}"
            )));
        }

        let sigma2 = sse / self.n as f64;
        let z = quantile_normal((1.0 + level) / 2.0);
        let beta = params.beta.unwrap_or(0.0);
        let m = self.seasonal_period;

        let mut predictions = Vec::with_capacity(horizon);
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        let mut weight_sum = 0.0;

        for h in 1..=horizon {
            if h > 1 {
                let j = h - 1;
                let seasonal_hit = if j % m == 0 { params.gamma } else { 0.0 };
                let c = params.alpha * (1.0 + beta * Self::damped_sum(params.phi, j))
                    + seasonal_hit;
                weight_sum += c * c;
            }

            let pred = self.point_forecast(state, params.phi, h);
            let se = (sigma2 * (1.0 + weight_sum)).sqrt();
            predictions.push(pred);
            lower.push(pred - z * se);
            upper.push(pred + z * se);
        }

        Ok(Forecast::from_values_with_intervals(
            predictions,
            lower,
            upper,
        ))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        let damped = self.is_damped();
        match (self.trend_type, self.seasonal_type, damped) {
            (TrendType::None, SeasonalType::Additive, _) => "HoltWinters(none, additive)",
            (TrendType::None, SeasonalType::Multiplicative, _) => {
                "HoltWinters(none, multiplicative)"
            }
            (TrendType::Additive, SeasonalType::Additive, false) => "HoltWinters(additive)",
            (TrendType::Additive, SeasonalType::Multiplicative, false) => {
                "HoltWinters(multiplicative)"
            }
            (TrendType::Additive, SeasonalType::Additive, true) => {
                "HoltWinters(additive, damped)"
            }
            (TrendType::Additive, SeasonalType::Multiplicative, true) => {
                "HoltWinters(multiplicative, damped)"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    const PATTERN: [f64; 12] = [
        -30.0, -20.0, -5.0, 10.0, 25.0, 40.0, 35.0, 15.0, 0.0, -15.0, -25.0, -30.0,
    ];

    fn make_dates(n: usize) -> Vec<NaiveDate> {
        (0..n)
            .map(|i| NaiveDate::from_ymd_opt(2000 + (i / 12) as i32, (i % 12) as u32 + 1, 1).unwrap())
            .collect()
    }

    fn make_series(values: Vec<f64>) -> TimeSeries {
        TimeSeries::new(make_dates(values.len()), values).unwrap()
    }

    fn exact_series(n: usize, level: f64, slope: f64) -> Vec<f64> {
        (0..n)
            .map(|t| level + slope * t as f64 + PATTERN[t % 12])
            .collect()
    }

    fn noisy_series(n: usize) -> Vec<f64> {
        (0..n)
            .map(|t| 200.0 + 0.5 * t as f64 + PATTERN[t % 12] + 4.0 * (t as f64 * 1.7).sin())
            .collect()
    }

    #[test]
    fn hw_additive_basic() {
        let ts = make_series(noisy_series(60));
        let mut model = HoltWinters::additive(12);
        model.fit(&ts).unwrap();

        let forecast = model.predict(12).unwrap();
        assert_eq!(forecast.horizon(), 12);
        assert!(forecast.primary().iter().all(|v| v.is_finite()));

        let params = model.params().unwrap();
        assert!(params.alpha > 0.0 && params.alpha < 1.0);
        assert!(params.beta.is_some());
        assert_relative_eq!(params.phi, 1.0);
    }

    #[test]
    fn hw_multiplicative_basic() {
        let ts = make_series(noisy_series(60));
        let mut model = HoltWinters::multiplicative(12);
        model.fit(&ts).unwrap();

        let forecast = model.predict(24).unwrap();
        assert_eq!(forecast.horizon(), 24);
        assert!(forecast.primary().iter().all(|v| v.is_finite() && *v > 0.0));

        let seasonals = model.seasonals().unwrap();
        assert_eq!(seasonals.len(), 12);
    }

    #[test]
    fn hw_multiplicative_initial_seasonals_positive() {
        // An outbreak year followed by a quiet one.
        let values: Vec<f64> = (0..48)
            .map(|t| {
                if t < 24 {
                    1000.0 * 0.82_f64.powi(t as i32) + 5.0
                } else {
                    (10 + t % 12) as f64
                }
            })
            .collect();
        let peak = values[..12].iter().copied().fold(f64::MIN, f64::max);
        let ts = make_series(values);
        let mut model = HoltWinters::multiplicative(12).damping(Damping::Estimated);
        model.fit(&ts).unwrap();

        let summary = model.summary().unwrap();
        let initial: Vec<f64> = summary
            .parameters
            .iter()
            .filter(|p| p.name.starts_with("initial_seasons."))
            .map(|p| p.value)
            .collect();
        assert_eq!(initial.len(), 12);
        assert!(initial.iter().all(|s| *s > 0.0), "{initial:?}");
        assert_relative_eq!(initial.iter().sum::<f64>(), 12.0, epsilon = 1e-9);

        let forecast = model.predict(24).unwrap();
        assert!(forecast
            .primary()
            .iter()
            .all(|v| v.is_finite() && *v < peak));
    }

    #[test]
    fn hw_exact_series_is_extrapolated() {
        let values = exact_series(72, 100.0, 2.0);
        let ts = make_series(values);
        let mut model = HoltWinters::additive(12);
        model.fit(&ts).unwrap();

        assert_relative_eq!(model.sse().unwrap(), 0.0, epsilon = 1e-12);
        let forecast = model.predict(24).unwrap();
        for (h, pred) in forecast.primary().iter().enumerate() {
            let t = 72 + h;
            let expected = 100.0 + 2.0 * t as f64 + PATTERN[t % 12];
            assert_relative_eq!(*pred, expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn hw_constant_series_forecasts_constant() {
        let ts = make_series(vec![5.0; 48]);
        for mut model in [
            HoltWinters::additive(12),
            HoltWinters::multiplicative(12).damping(Damping::Fixed(0.98)),
        ] {
            model.fit(&ts).unwrap();
            let forecast = model.predict(60).unwrap();
            for pred in forecast.primary() {
                assert_relative_eq!(*pred, 5.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn hw_fitted_and_residuals() {
        let values = noisy_series(48);
        let ts = make_series(values.clone());
        let mut model = HoltWinters::additive(12);

        assert!(!model.is_fitted());
        model.fit(&ts).unwrap();
        assert!(model.is_fitted());

        let fitted = model.fitted_values().unwrap();
        let residuals = model.residuals().unwrap();
        assert_eq!(fitted.len(), 48);
        assert_eq!(residuals.len(), 48);
        for i in 0..48 {
            assert_relative_eq!(values[i] - fitted[i], residuals[i], epsilon = 1e-10);
        }
        let sse: f64 = residuals.iter().map(|r| r * r).sum();
        assert_relative_eq!(sse, model.sse().unwrap(), epsilon = 1e-8);
    }

    #[test]
    fn hw_damping_flattens_trend() {
        let ts = make_series(exact_series(72, 100.0, 2.0));

        let mut undamped = HoltWinters::additive(12);
        let mut damped = HoltWinters::additive(12).damping(Damping::Fixed(0.98));
        undamped.fit(&ts).unwrap();
        damped.fit(&ts).unwrap();

        let a = undamped.predict(60).unwrap();
        let b = damped.predict(60).unwrap();
        assert!(b.primary()[59] < a.primary()[59]);
        assert!(damped.is_damped());
        assert_relative_eq!(damped.params().unwrap().phi, 0.98);
    }

    #[test]
    fn hw_estimated_damping_within_bounds() {
        let ts = make_series(noisy_series(72));
        let mut model = HoltWinters::additive(12).damping(Damping::Estimated);
        model.fit(&ts).unwrap();

        let phi = model.params().unwrap().phi;
        assert!((PHI_BOUNDS.0..=PHI_BOUNDS.1).contains(&phi));
        let summary = model.summary().unwrap();
        assert!(summary.parameter("phi").unwrap().estimated);
    }

    #[test]
    fn hw_damped_sum() {
        assert_relative_eq!(HoltWinters::damped_sum(1.0, 5), 5.0);
        assert_relative_eq!(HoltWinters::damped_sum(0.5, 2), 0.75, epsilon = 1e-12);
        assert_relative_eq!(HoltWinters::damped_sum(0.9, 0), 0.0);
    }

    #[test]
    fn hw_fixed_params_are_kept() {
        let ts = make_series(noisy_series(48));
        let mut model = HoltWinters::additive(12).with_params(0.4, 0.2, 0.3);
        model.fit(&ts).unwrap();

        let params = model.params().unwrap();
        assert_relative_eq!(params.alpha, 0.4);
        assert_eq!(params.beta, Some(0.2));
        assert_relative_eq!(params.gamma, 0.3);

        let summary = model.summary().unwrap();
        assert!(!summary.parameter("alpha").unwrap().estimated);
        assert_eq!(summary.iterations, 0);
        assert!(summary.converged);
    }

    #[test]
    fn hw_without_trend() {
        let ts = make_series(noisy_series(48));
        let mut model = HoltWinters::additive(12).trend(TrendType::None);
        model.fit(&ts).unwrap();

        assert!(model.params().unwrap().beta.is_none());
        assert_relative_eq!(model.trend_state().unwrap(), 0.0);
        let summary = model.summary().unwrap();
        assert!(summary.parameter("beta").is_none());
        assert!(summary.parameter("b.0").is_none());
    }

    #[test]
    fn hw_confidence_intervals() {
        let ts = make_series(noisy_series(60));
        let mut model = HoltWinters::additive(12);
        model.fit(&ts).unwrap();

        let forecast = model.predict_with_intervals(24, 0.95).unwrap();
        assert!(forecast.has_intervals());

        let lower = forecast.lower().unwrap();
        let upper = forecast.upper().unwrap();
        let preds = forecast.primary();
        for i in 0..24 {
            assert!(lower[i] < preds[i]);
            assert!(upper[i] > preds[i]);
        }
        assert!(upper[23] - lower[23] >= upper[0] - lower[0]);

        assert!(matches!(
            model.predict_with_intervals(5, 1.5),
            Err(ForecastError::InvalidParameter(_))
        ));
    }

    #[test]
    fn hw_summary_reports_initial_states() {
        let ts = make_series(noisy_series(48));
        let mut model = HoltWinters::additive(12);
        model.fit(&ts).unwrap();

        let summary = model.summary().unwrap();
        assert_eq!(summary.nobs, 48);
        assert_eq!(summary.seasonal_periods, 12);
        assert!(summary.parameter("initial_level").is_some());
        assert!(summary.parameter("initial_seasons.11").is_some());
        // alpha, beta, gamma + level, trend, 12 seasonals
        assert_eq!(summary.n_params, 17);
        assert!(summary.criteria.aic.is_finite());
    }

    #[test]
    fn hw_insufficient_data() {
        let ts = make_series((0..20).map(|i| i as f64 + 1.0).collect());
        let mut model = HoltWinters::additive(12);
        assert!(matches!(
            model.fit(&ts),
            Err(ForecastError::InsufficientData {
                needed: 24,
                got: 20
            })
        ));
    }

    #[test]
    fn hw_rejects_bad_input() {
        let mut values = noisy_series(48);
        values[10] = -1.0;
        let ts = make_series(values.clone());
        assert!(matches!(
            HoltWinters::multiplicative(12).fit(&ts),
            Err(ForecastError::InvalidParameter(_))
        ));

        values[10] = f64::NAN;
        let ts = make_series(values);
        assert_eq!(
            HoltWinters::additive(12).fit(&ts),
            Err(ForecastError::MissingValues)
        );

        let ts = make_series(noisy_series(48));
        assert!(HoltWinters::additive(1).fit(&ts).is_err());
        assert!(HoltWinters::additive(12)
            .damping(Damping::Fixed(1.5))
            .fit(&ts)
            .is_err());
        assert!(HoltWinters::additive(12)
            .trend(TrendType::None)
            .damping(Damping::Estimated)
            .fit(&ts)
            .is_err());
    }

    #[test]
    fn hw_requires_fit_before_predict() {
        let model = HoltWinters::additive(12);
        assert_eq!(model.predict(5).unwrap_err(), ForecastError::FitRequired);
        assert_eq!(model.summary().unwrap_err(), ForecastError::FitRequired);
    }

    #[test]
    fn hw_zero_horizon() {
        let ts = make_series(noisy_series(48));
        let mut model = HoltWinters::additive(12);
        model.fit(&ts).unwrap();
        assert!(model.predict(0).unwrap().is_empty());
    }

    #[test]
    fn hw_name_reflects_type() {
        assert_eq!(HoltWinters::additive(12).name(), "HoltWinters(additive)");
        assert_eq!(
            HoltWinters::multiplicative(12)
                .damping(Damping::Fixed(0.98))
                .name(),
            "HoltWinters(multiplicative, damped)"
        );
        assert_eq!(
            HoltWinters::additive(12).damping(Damping::Fixed(1.0)).name(),
            "HoltWinters(additive)"
        );
    }

    #[test]
    fn hw_default() {
        let model = HoltWinters::default();
        assert_eq!(model.seasonal_period(), 12);
        assert_eq!(model.trend_type(), TrendType::Additive);
        assert_eq!(model.seasonal_type(), SeasonalType::Additive);
        assert_eq!(model.damping_kind(), Damping::None);
    }
}
