//! Plain-text report sections.
//!
//! Every writer takes any `io::Write`, so the report can go to stdout, a
//! file, or a buffer in tests.

use crate::core::TimeSeries;
use crate::models::exponential::ModelSummary;
use crate::utils::{AccuracyMetrics, Describe};
use std::io::{self, Write};

/// Rows shown by `write_head` and `write_tail`.
pub const PREVIEW_ROWS: usize = 5;

/// Summary statistics of the series values, ignoring NaN.
pub fn describe(series: &TimeSeries) -> Describe {
    Describe::of(series.values())
}

/// Section heading underlined to its width.
pub fn write_heading<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(title.chars().count()))
}

pub fn write_describe<W: Write>(out: &mut W, series: &TimeSeries) -> io::Result<()> {
    let name = series.label().unwrap_or("value");
    writeln!(out, "{:<6} {:>14}", "", name)?;
    write!(out, "{}", describe(series))
}

/// First `PREVIEW_ROWS` rows as `date  value`.
pub fn write_head<W: Write>(out: &mut W, series: &TimeSeries) -> io::Result<()> {
    write_rows(out, &series.head(PREVIEW_ROWS))
}

/// Last `PREVIEW_ROWS` rows as `date  value`.
pub fn write_tail<W: Write>(out: &mut W, series: &TimeSeries) -> io::Result<()> {
    write_rows(out, &series.tail(PREVIEW_ROWS))
}

fn write_rows<W: Write>(out: &mut W, series: &TimeSeries) -> io::Result<()> {
    let name = series.label().unwrap_or("value");
    writeln!(out, "{:<10}  {:>12}", "date", name)?;
    for (date, value) in series.iter() {
        writeln!(out, "{}  {:>12}", date.format("%Y-%m-%d"), format_cell(value))?;
    }
    Ok(())
}

/// Integral values print without decimals, like the raw counts.
fn format_cell(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.6}")
    }
}

pub fn write_summary<W: Write>(out: &mut W, summary: &ModelSummary) -> io::Result<()> {
    writeln!(out, "{summary}")
}

pub fn write_accuracy<W: Write>(out: &mut W, metrics: &AccuracyMetrics) -> io::Result<()> {
    write!(out, "{metrics}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn series(values: Vec<f64>) -> TimeSeries {
        let dates = (0..values.len())
            .map(|i| NaiveDate::from_ymd_opt(2020, 1, 1 + i as u32).unwrap())
            .collect();
        TimeSeries::new(dates, values).unwrap().with_label("cases")
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn head_and_tail_show_five_rows() {
        let ts = series((1..=8).map(f64::from).collect());

        let head = render(|out| write_head(out, &ts));
        let lines: Vec<&str> = head.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].contains("cases"));
        assert!(lines[1].starts_with("2020-01-01"));
        assert!(lines[1].ends_with('1'));

        let tail = render(|out| write_tail(out, &ts));
        assert!(tail.lines().last().unwrap().starts_with("2020-01-08"));
        assert!(!tail.contains("2020-01-03"));
    }

    #[test]
    fn short_series_previews_everything() {
        let ts = series(vec![1.5, f64::NAN]);
        let head = render(|out| write_head(out, &ts));
        assert_eq!(head.lines().count(), 3);
        assert!(head.contains("1.500000"));
        assert!(head.contains("NaN"));
    }

    #[test]
    fn describe_table() {
        let ts = series(vec![1.0, 2.0, 3.0, 4.0]);
        let stats = describe(&ts);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.max, 4.0);

        let text = render(|out| write_describe(out, &ts));
        assert!(text.contains("count"));
        assert!(text.contains("75%"));
        assert_eq!(text.lines().count(), 9);
    }

    #[test]
    fn heading_is_underlined() {
        let text = render(|out| write_heading(out, "Forecast"));
        assert_eq!(text, "\nForecast\n--------\n");
    }
}
