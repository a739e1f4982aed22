//! The end-to-end analysis run.
//!
//! Steps run strictly in order: load, describe, preview, plot the raw
//! series, decompose (additive then multiplicative), rescale, fit on the
//! training partition and forecast over the test period, then reload and
//! fit damped additive and multiplicative models on the full series.

use crate::config::AnalysisConfig;
use crate::core::{Forecast, TimeSeries};
use crate::data::Dataset;
use crate::error::{ForecastError, LoadError};
use crate::models::exponential::{Damping, HoltWinters, ModelSummary};
use crate::models::Forecaster;
use crate::plot::{decomposition_figure, Figure, Line};
use crate::report;
use crate::seasonality::{seasonal_decompose, DecomposeModel};
use crate::utils::{calculate_metrics, AccuracyMetrics};
use std::io::{self, Write};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that stop an analysis run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(ForecastError),

    #[error("failed to load data: {0}")]
    Load(#[from] LoadError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
}

/// What a completed run produced, beyond the text it wrote.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    /// Seasonal strength of the additive and multiplicative decompositions.
    pub seasonal_strength: (f64, f64),
    /// Forecast from the model fitted on the training partition, dated.
    pub test_forecast: Forecast,
    /// Accuracy over the overlap of `test_forecast` and the test partition.
    pub accuracy: Option<AccuracyMetrics>,
    pub additive_forecast: Forecast,
    pub multiplicative_forecast: Forecast,
    pub additive_summary: ModelSummary,
    pub multiplicative_summary: ModelSummary,
}

/// Run the full analysis, writing the report and charts to `out`.
pub fn run<W: Write>(
    config: &AnalysisConfig,
    out: &mut W,
) -> Result<AnalysisOutcome, PipelineError> {
    config.validate().map_err(PipelineError::Config)?;

    info!(input = %config.input.display(), "loading dataset");
    let mut dataset = Dataset::from_csv_with(&config.input, config.train_size, &config.csv)?;
    let rows = dataset.data().len();
    let train_rows = dataset.train().len();
    let test_rows = dataset.test().len();
    info!(rows, train_rows, test_rows, "dataset ready");

    report::write_heading(out, "Summary statistics")?;
    report::write_describe(out, dataset.data())?;
    report::write_heading(out, "First rows")?;
    report::write_head(out, dataset.data())?;
    report::write_heading(out, "Last rows")?;
    report::write_tail(out, dataset.data())?;

    if config.plots {
        let figure = Figure::new("Dengue cases")
            .y_label("cases")
            .line(Line::from_series("cases", dataset.data()));
        write_chart(out, &figure, config)?;
    }

    info!(period = config.period, "decomposing series");
    let values = dataset.data().values();
    let mut strengths = [0.0; 2];
    for (slot, model) in strengths
        .iter_mut()
        .zip([DecomposeModel::Additive, DecomposeModel::Multiplicative])
    {
        let decomposition = seasonal_decompose(values, config.period, model)?;
        let strength = decomposition.seasonal_strength();
        *slot = strength;

        let title = format!("{} decomposition", capitalize(model.name()));
        report::write_heading(out, &title)?;
        writeln!(
            out,
            "seasonal strength {:.3}, trend strength {:.3}",
            strength,
            decomposition.trend_strength()
        )?;
        if config.plots {
            let panels = decomposition_figure(&title, dataset.data().timestamps(), &decomposition)?;
            write!(out, "{}", panels.render(config.chart_width, config.chart_height))?;
        }
    }

    dataset.set_scale(config.scale)?;
    info!(scale = dataset.scale(), "counts rescaled");

    // Model evaluated against the held-out partition.
    let mut model = HoltWinters::additive(config.period);
    let test_forecast = fit_and_forecast(&mut model, dataset.train(), config)?;

    let overlap = test_forecast.horizon().min(test_rows);
    let accuracy = if overlap == 0 {
        warn!("test partition is empty; skipping accuracy");
        None
    } else {
        Some(calculate_metrics(
            &dataset.test().values()[..overlap],
            &test_forecast.primary()[..overlap],
        )?)
    };

    report::write_heading(out, &format!("{} on training data", model.name()))?;
    report::write_summary(out, &model.summary()?)?;
    if let Some(metrics) = &accuracy {
        report::write_heading(out, "Accuracy on test data")?;
        report::write_accuracy(out, metrics)?;
    }
    if config.plots {
        let figure = forecast_figure(
            "Forecast vs. test data",
            dataset.train(),
            Some(dataset.test()),
            &model,
            &test_forecast,
        )?;
        write_chart(out, &figure, config)?;
    }

    info!("reloading dataset for full-series models");
    let dataset = Dataset::from_csv_with(&config.input, config.train_size, &config.csv)?;
    let full = dataset.data();

    let mut additive =
        HoltWinters::additive(config.period).damping(Damping::Fixed(config.damping));
    let additive_forecast = fit_and_forecast(&mut additive, full, config)?;
    let additive_summary = additive.summary()?;
    if config.plots {
        let figure = forecast_figure(
            "Damped additive forecast",
            full,
            None,
            &additive,
            &additive_forecast,
        )?;
        write_chart(out, &figure, config)?;
    }

    let mut multiplicative =
        HoltWinters::multiplicative(config.period).damping(Damping::Estimated);
    let multiplicative_forecast = fit_and_forecast(&mut multiplicative, full, config)?;
    let multiplicative_summary = multiplicative.summary()?;
    if config.plots {
        let figure = forecast_figure(
            "Damped multiplicative forecast",
            full,
            None,
            &multiplicative,
            &multiplicative_forecast,
        )?;
        write_chart(out, &figure, config)?;
    }

    report::write_heading(out, "Additive model")?;
    report::write_summary(out, &additive_summary)?;
    report::write_heading(out, "Multiplicative model")?;
    report::write_summary(out, &multiplicative_summary)?;

    info!("analysis complete");
    Ok(AnalysisOutcome {
        rows,
        train_rows,
        test_rows,
        seasonal_strength: (strengths[0], strengths[1]),
        test_forecast,
        accuracy,
        additive_forecast,
        multiplicative_forecast,
        additive_summary,
        multiplicative_summary,
    })
}

/// Fit `model` on `series` and forecast `config.horizon` dated steps.
fn fit_and_forecast(
    model: &mut HoltWinters,
    series: &TimeSeries,
    config: &AnalysisConfig,
) -> Result<Forecast, ForecastError> {
    model.fit(series)?;
    let forecast = model
        .predict_with_intervals(config.horizon, config.interval_level)?
        .with_timestamps(series.future_dates(config.horizon)?)?;
    if let Some(params) = model.params() {
        info!(
            model = model.name(),
            alpha = params.alpha,
            beta = params.beta,
            gamma = params.gamma,
            phi = params.phi,
            sse = model.sse(),
            "model fitted"
        );
    }
    Ok(forecast)
}

/// History, in-sample predictions, forecast and its interval.
fn forecast_figure(
    title: &str,
    history: &TimeSeries,
    actual: Option<&TimeSeries>,
    model: &HoltWinters,
    forecast: &Forecast,
) -> Result<Figure, ForecastError> {
    let mut figure = Figure::new(title)
        .y_label(history.label().unwrap_or("value"))
        .line(Line::from_series("observed", history));
    if let Some(actual) = actual {
        figure = figure.line(Line::from_series("test", actual));
    }
    if let Some(fitted) = model.fitted_values() {
        figure = figure.line(Line::from_parts("fitted", history.timestamps(), fitted));
    }
    figure = figure.line(Line::from_forecast("forecast", forecast)?);
    if let (Some(dates), Some(lower), Some(upper)) =
        (forecast.timestamps(), forecast.lower(), forecast.upper())
    {
        figure = figure
            .line(Line::from_parts("lower", dates, lower))
            .line(Line::from_parts("upper", dates, upper));
    }
    Ok(figure)
}

fn write_chart<W: Write>(out: &mut W, figure: &Figure, config: &AnalysisConfig) -> io::Result<()> {
    writeln!(out)?;
    write!(out, "{}", figure.render(config.chart_width, config.chart_height))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
