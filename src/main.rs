//! # epicast
//!
//! Command-line entry point: decompose a monthly case-count series and
//! forecast it with Holt-Winters models.

use anyhow::Context;
use clap::Parser;
use epicast::config::AnalysisConfig;
use epicast::data::CsvOptions;
use epicast::pipeline;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "epicast")]
#[command(about = "Seasonal decomposition and Holt-Winters forecasts of case counts", long_about = None)]
struct Cli {
    /// Input CSV with a date column and a case-count column
    #[arg(short, long, default_value = "dataset/dengue_cases.csv")]
    input: PathBuf,

    /// Share of rows used for training
    #[arg(long, default_value_t = 0.8)]
    train_size: f64,

    /// Divisor applied to the counts before modelling
    #[arg(long, default_value_t = 1000.0)]
    scale: f64,

    /// Number of steps to forecast
    #[arg(long, default_value_t = 60)]
    horizon: usize,

    /// Seasonal period in observations
    #[arg(short, long, default_value_t = 12)]
    period: usize,

    /// Damping coefficient of the full-series additive model
    #[arg(long, default_value_t = 0.98)]
    damping: f64,

    /// Date column header (default: detected)
    #[arg(long)]
    date_column: Option<String>,

    /// Value column header (default: `cases` or first numeric column)
    #[arg(long)]
    value_column: Option<String>,

    /// chrono date format, e.g. %Y-%m-%d (default: detected)
    #[arg(long)]
    date_format: Option<String>,

    /// Skip the text charts
    #[arg(long)]
    no_plots: bool,

    /// Chart width in characters
    #[arg(long, default_value_t = 100)]
    width: u16,

    /// Chart height in lines
    #[arg(long, default_value_t = 24)]
    height: u16,
}

impl From<Cli> for AnalysisConfig {
    fn from(cli: Cli) -> Self {
        AnalysisConfig {
            input: cli.input,
            csv: CsvOptions {
                date_column: cli.date_column,
                value_column: cli.value_column,
                date_format: cli.date_format,
                ..Default::default()
            },
            train_size: cli.train_size,
            scale: cli.scale,
            horizon: cli.horizon,
            period: cli.period,
            damping: cli.damping,
            plots: !cli.no_plots,
            chart_width: cli.width,
            chart_height: cli.height,
            ..Default::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "epicast=info".into()),
        )
        .init();

    let config = AnalysisConfig::from(Cli::parse());
    let input = config.input.display().to_string();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    pipeline::run(&config, &mut out).with_context(|| format!("analysis of {input} failed"))?;
    out.flush()?;

    Ok(())
}
