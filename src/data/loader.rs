//! CSV reader for dated case counts.

use crate::core::TimeSeries;
use crate::error::LoadError;
use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

const DATE_HEADERS: [&str; 5] = ["date", "month", "period", "time", "ds"];
const VALUE_HEADER: &str = "cases";

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const MONTH_FORMATS: [&str; 2] = ["%Y-%m", "%Y/%m"];

/// How to find and parse the date and value columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvOptions {
    /// Header of the date column; detected when None.
    pub date_column: Option<String>,
    /// Header of the value column; detected when None.
    pub value_column: Option<String>,
    /// `chrono` format of the date cells; detected when None.
    pub date_format: Option<String>,
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            date_column: None,
            value_column: None,
            date_format: None,
            delimiter: b',',
        }
    }
}

/// A date layout, either a full date/datetime or a year-month form.
#[derive(Debug, Clone, PartialEq)]
enum DateLayout {
    Date(String),
    DateTime(String),
    /// Year and month only; the day is the first of the month.
    Month(String),
}

impl DateLayout {
    fn parse(&self, raw: &str) -> Option<NaiveDate> {
        match self {
            DateLayout::Date(fmt) => NaiveDate::parse_from_str(raw, fmt).ok(),
            DateLayout::DateTime(fmt) => NaiveDateTime::parse_from_str(raw, fmt)
                .ok()
                .map(|dt| dt.date()),
            DateLayout::Month(fmt) => {
                NaiveDate::parse_from_str(&format!("{raw}-01"), &format!("{fmt}-%d")).ok()
            }
        }
    }

    fn candidates() -> impl Iterator<Item = DateLayout> {
        DATE_FORMATS
            .iter()
            .map(|f| DateLayout::Date(f.to_string()))
            .chain(DATETIME_FORMATS.iter().map(|f| DateLayout::DateTime(f.to_string())))
            .chain(MONTH_FORMATS.iter().map(|f| DateLayout::Month(f.to_string())))
    }

    /// Layout for an explicit format, picked by whichever reading of it
    /// accepts `sample`.
    fn explicit(fmt: &str, sample: &str) -> Option<DateLayout> {
        [
            DateLayout::Date(fmt.to_string()),
            DateLayout::DateTime(fmt.to_string()),
            DateLayout::Month(fmt.to_string()),
        ]
        .into_iter()
        .find(|layout| layout.parse(sample).is_some())
    }

    fn detect(sample: &str) -> Option<DateLayout> {
        Self::candidates().find(|layout| layout.parse(sample).is_some())
    }
}

/// Read a series from a CSV file on disk.
pub fn read_series_from_path(path: &Path, options: &CsvOptions) -> Result<TimeSeries, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    read_series(BufReader::new(file), options)
}

/// Read a series from any CSV source.
///
/// Rows are sorted by date (stable for equal dates). Empty value cells
/// become NaN.
pub fn read_series<R: Read>(source: R, options: &CsvOptions) -> Result<TimeSeries, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers()?.clone();
    let records = reader
        .records()
        .collect::<std::result::Result<Vec<StringRecord>, csv::Error>>()?;
    let first = records.first().ok_or(LoadError::Empty)?;

    let date_idx = date_column(&headers, options.date_column.as_deref())?;
    let value_idx = value_column(&headers, first, date_idx, options.value_column.as_deref())?;

    let sample = first.get(date_idx).unwrap_or_default();
    let layout = match options.date_format.as_deref() {
        Some(fmt) => DateLayout::explicit(fmt, sample),
        None => DateLayout::detect(sample),
    }
    .ok_or_else(|| LoadError::DateParse {
        row: 1,
        value: sample.to_string(),
    })?;

    debug!(
        date_column = headers.get(date_idx).unwrap_or_default(),
        value_column = headers.get(value_idx).unwrap_or_default(),
        layout = ?layout,
        rows = records.len(),
        "csv layout resolved"
    );

    let mut rows = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let row = i + 1;
        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = layout.parse(raw_date).ok_or_else(|| LoadError::DateParse {
            row,
            value: raw_date.to_string(),
        })?;

        let raw_value = record.get(value_idx).unwrap_or_default();
        let value = if raw_value.is_empty() {
            f64::NAN
        } else {
            raw_value
                .parse::<f64>()
                .map_err(|_| LoadError::ValueParse {
                    row,
                    value: raw_value.to_string(),
                })?
        };
        rows.push((date, row, value));
    }

    rows.sort_by_key(|(date, row, _)| (*date, *row));
    if let Some(pair) = rows.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        let (date, row, _) = pair[1];
        return Err(LoadError::DuplicateDate {
            row,
            value: date.to_string(),
        });
    }
    let (timestamps, values): (Vec<NaiveDate>, Vec<f64>) =
        rows.into_iter().map(|(date, _, value)| (date, value)).unzip();

    let label = headers.get(value_idx).unwrap_or(VALUE_HEADER).to_string();
    Ok(TimeSeries::new(timestamps, values)?.with_label(label))
}

fn find_header(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.eq_ignore_ascii_case(name))
}

fn date_column(headers: &StringRecord, requested: Option<&str>) -> Result<usize, LoadError> {
    if let Some(name) = requested {
        return find_header(headers, name).ok_or_else(|| LoadError::MissingColumn(name.to_string()));
    }
    if headers.is_empty() {
        return Err(LoadError::MissingColumn("date".to_string()));
    }
    Ok(DATE_HEADERS
        .iter()
        .find_map(|name| find_header(headers, name))
        .unwrap_or(0))
}

fn value_column(
    headers: &StringRecord,
    first: &StringRecord,
    date_idx: usize,
    requested: Option<&str>,
) -> Result<usize, LoadError> {
    if let Some(name) = requested {
        return find_header(headers, name).ok_or_else(|| LoadError::MissingColumn(name.to_string()));
    }
    if let Some(idx) = find_header(headers, VALUE_HEADER) {
        return Ok(idx);
    }
    first
        .iter()
        .enumerate()
        .find(|(i, field)| *i != date_idx && field.parse::<f64>().is_ok())
        .map(|(i, _)| i)
        .ok_or_else(|| LoadError::MissingColumn(VALUE_HEADER.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn read(text: &str) -> Result<TimeSeries, LoadError> {
        read_series(text.as_bytes(), &CsvOptions::default())
    }

    #[test]
    fn reads_iso_dates_and_cases() {
        let ts = read("date,cases\n2020-01-01,10\n2020-02-01,12.5\n").unwrap();
        assert_eq!(ts.len(), 2);
        assert_eq!(ts.timestamps()[1], NaiveDate::from_ymd_opt(2020, 2, 1).unwrap());
        assert_relative_eq!(ts.values()[1], 12.5);
        assert_eq!(ts.label(), Some("cases"));
    }

    #[test]
    fn detects_columns_without_names() {
        let ts = read("region,when,count\nnorth,2021/03/01,4\nnorth,2021/04/01,6\n");
        // "when" is not a known date header, so column 0 is tried and fails.
        assert!(matches!(ts, Err(LoadError::DateParse { row: 1, .. })));

        let options = CsvOptions {
            date_column: Some("when".to_string()),
            ..Default::default()
        };
        let ts = read_series(
            "region,when,count\nnorth,2021/03/01,4\nnorth,2021/04/01,6\n".as_bytes(),
            &options,
        )
        .unwrap();
        assert_eq!(ts.values(), &[4.0, 6.0]);
        assert_eq!(ts.label(), Some("count"));
    }

    #[test]
    fn month_only_dates() {
        let ts = read("Month,Cases\n1998-01,100\n1998-02,120\n").unwrap();
        assert_eq!(ts.first_date(), NaiveDate::from_ymd_opt(1998, 1, 1));
        assert_eq!(ts.last_date(), NaiveDate::from_ymd_opt(1998, 2, 1));
    }

    #[test]
    fn explicit_format_and_delimiter() {
        let options = CsvOptions {
            date_format: Some("%m/%d/%Y".to_string()),
            delimiter: b';',
            ..Default::default()
        };
        let ts = read_series("date;cases\n03/15/2020;7\n".as_bytes(), &options).unwrap();
        assert_eq!(ts.timestamps()[0], NaiveDate::from_ymd_opt(2020, 3, 15).unwrap());
    }

    #[test]
    fn rows_are_sorted_by_date() {
        let ts = read("date,cases\n2020-03-01,3\n2020-01-01,1\n2020-02-01,2\n").unwrap();
        assert_eq!(ts.values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn empty_cells_become_nan() {
        let ts = read("date,cases\n2020-01-01,\n2020-02-01,2\n").unwrap();
        assert!(ts.values()[0].is_nan());
        assert!(ts.has_missing_values());
    }

    #[test]
    fn reports_bad_rows() {
        assert_eq!(
            read("date,cases\n2020-01-01,1\nnot-a-date,2\n").unwrap_err(),
            LoadError::DateParse {
                row: 2,
                value: "not-a-date".to_string()
            }
        );
        assert_eq!(
            read("date,cases\n2020-01-01,abc\n").unwrap_err(),
            LoadError::ValueParse {
                row: 1,
                value: "abc".to_string()
            }
        );
    }

    #[test]
    fn duplicate_dates_are_rejected() {
        let text = "date,cases\n2020-02-01,1\n2020-01-01,2\n2020-02-01,3\n";
        assert_eq!(
            read(text).unwrap_err(),
            LoadError::DuplicateDate {
                row: 3,
                value: "2020-02-01".to_string()
            }
        );

        // Month-only dates collapse onto the first of the month.
        assert!(matches!(
            read("month,cases\n2020-01,1\n2020-01,2\n"),
            Err(LoadError::DuplicateDate { row: 2, .. })
        ));
    }

    #[test]
    fn reports_missing_pieces() {
        assert_eq!(read("date,cases\n").unwrap_err(), LoadError::Empty);

        let options = CsvOptions {
            value_column: Some("deaths".to_string()),
            ..Default::default()
        };
        assert_eq!(
            read_series("date,cases\n2020-01-01,1\n".as_bytes(), &options).unwrap_err(),
            LoadError::MissingColumn("deaths".to_string())
        );

        let err = read_series_from_path(Path::new("/nonexistent/cases.csv"), &CsvOptions::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
