//! Line charts rendered to text through ratatui's `Chart` widget.

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::seasonality::Decomposition;
use chrono::{Datelike, NaiveDate};
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget};

const PALETTE: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::Red,
    Color::Blue,
];

/// A named series of dated points.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub name: String,
    pub points: Vec<(NaiveDate, f64)>,
}

impl Line {
    pub fn new(name: impl Into<String>, points: Vec<(NaiveDate, f64)>) -> Self {
        Self {
            name: name.into(),
            points,
        }
    }

    pub fn from_series(name: impl Into<String>, series: &TimeSeries) -> Self {
        Self::new(name, series.iter().collect())
    }

    /// Pair `dates` with `values`; extra entries on either side are dropped.
    pub fn from_parts(name: impl Into<String>, dates: &[NaiveDate], values: &[f64]) -> Self {
        Self::new(name, dates.iter().copied().zip(values.iter().copied()).collect())
    }

    /// Forecast points; fails when the forecast carries no dates.
    pub fn from_forecast(name: impl Into<String>, forecast: &Forecast) -> Result<Self> {
        let dates = forecast.timestamps().ok_or_else(|| {
            ForecastError::TimestampError("forecast has no dates to plot against".to_string())
        })?;
        Ok(Self::from_parts(name, dates, forecast.primary()))
    }

    fn finite_points(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .filter(|(_, v)| v.is_finite())
            .map(|(d, v)| (day_number(*d), *v))
            .collect()
    }
}

/// A titled chart with one or more lines over a date axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// `chrono` format for the x-axis labels.
    pub date_format: String,
    pub lines: Vec<Line>,
}

impl Figure {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: "Date".to_string(),
            y_label: String::new(),
            date_format: "%Y-%m".to_string(),
            lines: Vec::new(),
        }
    }

    pub fn x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = label.into();
        self
    }

    pub fn y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = label.into();
        self
    }

    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    pub fn line(mut self, line: Line) -> Self {
        self.lines.push(line);
        self
    }

    /// Render to a `width` x `height` block of text.
    pub fn render(&self, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        self.render_into(area, &mut buf);
        buffer_to_string(&buf)
    }

    fn render_into(&self, area: Rect, buf: &mut Buffer) {
        // Datasets borrow their points, so these must outlive the chart.
        let points: Vec<Vec<(f64, f64)>> = self.lines.iter().map(Line::finite_points).collect();

        let datasets: Vec<Dataset> = self
            .lines
            .iter()
            .zip(&points)
            .enumerate()
            .map(|(i, (line, data))| {
                Dataset::default()
                    .name(line.name.clone())
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(PALETTE[i % PALETTE.len()]))
                    .data(data)
            })
            .collect();

        let (x_min, x_max) = padded_bounds(points.iter().flatten().map(|p| p.0), 0.0);
        let (y_min, y_max) = padded_bounds(points.iter().flatten().map(|p| p.1), 0.05);

        let x_labels: Vec<Span> = [x_min, (x_min + x_max) / 2.0, x_max]
            .into_iter()
            .map(|x| Span::raw(self.format_day(x)))
            .collect();
        let y_labels: Vec<Span> = [y_min, (y_min + y_max) / 2.0, y_max]
            .into_iter()
            .map(|y| Span::raw(format_value(y, y_max - y_min)))
            .collect();

        Chart::new(datasets)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", self.title)),
            )
            .x_axis(
                Axis::default()
                    .title(self.x_label.clone())
                    .style(Style::default().fg(Color::Gray))
                    .bounds([x_min, x_max])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title(self.y_label.clone())
                    .style(Style::default().fg(Color::Gray))
                    .bounds([y_min, y_max])
                    .labels(y_labels),
            )
            .render(area, buf);
    }

    fn format_day(&self, x: f64) -> String {
        NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
            .map(|d| d.format(&self.date_format).to_string())
            .unwrap_or_default()
    }
}

/// Figures stacked vertically, sharing the height equally.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Panels {
    pub figures: Vec<Figure>,
}

impl Panels {
    pub fn new(figures: Vec<Figure>) -> Self {
        Self { figures }
    }

    /// Render with each panel `panel_height` rows tall.
    pub fn render(&self, width: u16, panel_height: u16) -> String {
        let count = self.figures.len() as u16;
        let area = Rect::new(0, 0, width, panel_height.saturating_mul(count));
        let mut buf = Buffer::empty(area);

        let constraints = vec![Constraint::Length(panel_height); self.figures.len()];
        let rows = Layout::vertical(constraints).split(area);
        for (figure, row) in self.figures.iter().zip(rows.iter()) {
            figure.render_into(*row, &mut buf);
        }
        buffer_to_string(&buf)
    }
}

/// Observed, trend, seasonal and residual panels of a decomposition.
pub fn decomposition_figure(
    title: &str,
    dates: &[NaiveDate],
    decomposition: &Decomposition,
) -> Result<Panels> {
    if dates.len() != decomposition.observed.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: decomposition.observed.len(),
            got: dates.len(),
        });
    }

    let panel = |name: &str, values: &[f64]| {
        Figure::new(format!("{title}: {name}"))
            .y_label(name)
            .line(Line::from_parts(name, dates, values))
    };

    Ok(Panels::new(vec![
        panel("Observed", &decomposition.observed),
        panel("Trend", &decomposition.trend),
        panel("Seasonal", &decomposition.seasonal),
        panel("Residual", &decomposition.residual),
    ]))
}

fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

/// Min and max of `values`, widened by `pad` of the range, never degenerate.
fn padded_bounds(values: impl Iterator<Item = f64>, pad: f64) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let range = hi - lo;
    if range < 1e-12 {
        let half = (lo.abs() * 0.05).max(0.5);
        return (lo - half, hi + half);
    }
    (lo - range * pad, hi + range * pad)
}

fn format_value(value: f64, range: f64) -> String {
    if range < 10.0 {
        format!("{value:.2}")
    } else {
        format!("{value:.0}")
    }
}

fn buffer_to_string(buf: &Buffer) -> String {
    let area = buf.area;
    let mut out = String::with_capacity(usize::from(area.width + 1) * usize::from(area.height));
    for y in area.top()..area.bottom() {
        let row: String = (area.left()..area.right())
            .map(|x| buf.cell((x, y)).map_or(" ", |cell| cell.symbol()))
            .collect();
        out.push_str(row.trim_end());
        out.push('\n');
    }
    out
}
