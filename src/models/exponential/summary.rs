//! Fit summary for exponential smoothing models.

use crate::models::exponential::holt_winters::{SeasonalType, TrendType};
use std::f64::consts::PI;
use std::fmt;

const RULE_WIDTH: usize = 80;

/// Information criteria derived from the in-sample SSE.
///
/// Uses the Gaussian likelihood with the variance profiled out:
/// `AIC = n ln(SSE/n) + 2k`, `BIC = n ln(SSE/n) + k ln n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InformationCriteria {
    pub log_likelihood: f64,
    pub aic: f64,
    pub bic: f64,
    /// NaN when `n - k - 1 <= 0`.
    pub aicc: f64,
}

impl InformationCriteria {
    pub fn from_sse(nobs: usize, sse: f64, n_params: usize) -> Self {
        let n = nobs as f64;
        let k = n_params as f64;
        let scaled = (sse / n).ln();

        let aic = n * scaled + 2.0 * k;
        let bic = n * scaled + k * n.ln();
        let aicc = if n - k - 1.0 > 0.0 {
            aic + 2.0 * k * (k + 1.0) / (n - k - 1.0)
        } else {
            f64::NAN
        };
        let log_likelihood = -n / 2.0 * ((2.0 * PI * sse / n).ln() + 1.0);

        Self {
            log_likelihood,
            aic,
            bic,
            aicc,
        }
    }
}

/// One row of the parameter table.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamEstimate {
    pub name: String,
    pub symbol: String,
    pub value: f64,
    /// Whether the optimiser chose this value.
    pub estimated: bool,
}

impl ParamEstimate {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        value: f64,
        estimated: bool,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            value,
            estimated,
        }
    }
}

/// Summary of a fitted Holt-Winters model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub model: String,
    pub nobs: usize,
    pub sse: f64,
    /// Free smoothing parameters plus initial states.
    pub n_params: usize,
    pub criteria: InformationCriteria,
    pub trend: TrendType,
    pub seasonal: SeasonalType,
    pub damped: bool,
    pub seasonal_periods: usize,
    pub parameters: Vec<ParamEstimate>,
    pub iterations: usize,
    pub converged: bool,
}

impl ModelSummary {
    /// Look up a parameter by name or symbol.
    pub fn parameter(&self, key: &str) -> Option<&ParamEstimate> {
        self.parameters
            .iter()
            .find(|p| p.name == key || p.symbol == key)
    }
}

fn trend_label(trend: TrendType) -> &'static str {
    match trend {
        TrendType::None => "None",
        TrendType::Additive => "Additive",
    }
}

fn seasonal_label(seasonal: SeasonalType) -> &'static str {
    match seasonal {
        SeasonalType::Additive => "Additive",
        SeasonalType::Multiplicative => "Multiplicative",
    }
}

fn bool_label(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let double = "=".repeat(RULE_WIDTH);
        let single = "-".repeat(RULE_WIDTH);
        let c = &self.criteria;

        writeln!(f, "{:^width$}", "Holt-Winters Model Results", width = RULE_WIDTH)?;
        writeln!(f, "{double}")?;
        writeln!(f, "{:<18}{:>22}   {:<16}{:>21.3}", "Model:", self.model, "SSE", self.sse)?;
        writeln!(f, "{:<18}{:>22}   {:<16}{:>21.3}", "No. Observations:", self.nobs, "AIC", c.aic)?;
        writeln!(
            f,
            "{:<18}{:>22}   {:<16}{:>21.3}",
            "Trend:",
            trend_label(self.trend),
            "BIC",
            c.bic
        )?;
        writeln!(
            f,
            "{:<18}{:>22}   {:<16}{:>21.3}",
            "Seasonal:",
            seasonal_label(self.seasonal),
            "AICc",
            c.aicc
        )?;
        writeln!(
            f,
            "{:<18}{:>22}   {:<16}{:>21.3}",
            "Seasonal Periods:", self.seasonal_periods, "Log-Likelihood", c.log_likelihood
        )?;
        writeln!(
            f,
            "{:<18}{:>22}   {:<16}{:>21}",
            "Damped:",
            bool_label(self.damped),
            "Converged",
            format!("{} ({} iter)", bool_label(self.converged), self.iterations)
        )?;
        writeln!(f, "{double}")?;
        writeln!(f, "{:<24}{:>18}{:>18}{:>20}", "", "coeff", "code", "optimized")?;
        writeln!(f, "{single}")?;
        for p in &self.parameters {
            writeln!(
                f,
                "{:<24}{:>18.6}{:>18}{:>20}",
                p.name,
                p.value,
                p.symbol,
                bool_label(p.estimated)
            )?;
        }
        write!(f, "{single}")
    }
}
