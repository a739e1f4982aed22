//! TimeSeries data structure for dated case counts.

use crate::error::{ForecastError, Result};
use chrono::{Datelike, Duration, Months, NaiveDate};
use std::collections::HashMap;

/// Sampling frequency of a dated series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
    /// Fixed spacing in days that matches none of the calendar frequencies.
    Days(i64),
}

impl Frequency {
    /// Typical seasonal period for this frequency, if it has one.
    pub fn seasonal_period(&self) -> Option<usize> {
        match self {
            Frequency::Daily => Some(7),
            Frequency::Weekly => Some(52),
            Frequency::Monthly => Some(12),
            Frequency::Quarterly => Some(4),
            Frequency::Yearly | Frequency::Days(_) => None,
        }
    }

    /// Date `steps` periods after `date`.
    ///
    /// Month-based frequencies keep month-end dates on the month end.
    pub fn advance(&self, date: NaiveDate, steps: u32) -> Option<NaiveDate> {
        match self {
            Frequency::Daily => date.checked_add_signed(Duration::days(steps as i64)),
            Frequency::Weekly => date.checked_add_signed(Duration::weeks(steps as i64)),
            Frequency::Monthly => add_months(date, steps),
            Frequency::Quarterly => add_months(date, steps.checked_mul(3)?),
            Frequency::Yearly => add_months(date, steps.checked_mul(12)?),
            Frequency::Days(d) => date.checked_add_signed(Duration::days(d * steps as i64)),
        }
    }

    /// Approximate length of one step in days, for ordering frequencies.
    fn nominal_days(&self) -> i64 {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
            Frequency::Monthly => 30,
            Frequency::Quarterly => 91,
            Frequency::Yearly => 365,
            Frequency::Days(d) => *d,
        }
    }

    fn between(a: NaiveDate, b: NaiveDate) -> Frequency {
        match months_between(a, b) {
            Some(1) => return Frequency::Monthly,
            Some(3) => return Frequency::Quarterly,
            Some(12) => return Frequency::Yearly,
            _ => {}
        }
        match (b - a).num_days() {
            1 => Frequency::Daily,
            7 => Frequency::Weekly,
            d => Frequency::Days(d),
        }
    }
}

fn is_month_end(date: NaiveDate) -> bool {
    date.succ_opt().map(|next| next.month() != date.month()).unwrap_or(true)
}

fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let shifted = date.checked_add_months(Months::new(months))?;
    if is_month_end(date) {
        let first = shifted.with_day(1)?;
        first.checked_add_months(Months::new(1))?.pred_opt()
    } else {
        Some(shifted)
    }
}

/// Whole months from `a` to `b` when both sit on the same day of month
/// (or both on a month end).
fn months_between(a: NaiveDate, b: NaiveDate) -> Option<i32> {
    let same_anchor = a.day() == b.day() || (is_month_end(a) && is_month_end(b));
    if !same_anchor {
        return None;
    }
    let months = (b.year() - a.year()) * 12 + b.month() as i32 - a.month() as i32;
    (months > 0).then_some(months)
}

/// A univariate series of dated observations.
///
/// Dates are monotonically non-decreasing; every date has exactly one value.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<NaiveDate>,
    values: Vec<f64>,
    label: Option<String>,
}

impl TimeSeries {
    /// Create a new series, validating ordering and lengths.
    pub fn new(timestamps: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        if let Some(pos) = timestamps.windows(2).position(|w| w[1] < w[0]) {
            return Err(ForecastError::TimestampError(format!(
                "dates must be non-decreasing ({} follows {})",
                timestamps[pos + 1],
                timestamps[pos]
            )));
        }

        Ok(Self {
            timestamps,
            values,
            label: None,
        })
    }

    /// Attach a column label (e.g. `cases`).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDate] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.timestamps.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.timestamps.last().copied()
    }

    /// Iterate over `(date, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// Check if the series holds NaN or infinite values.
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Divide every value by `divisor` in place; dates are untouched.
    pub fn divide_by(&mut self, divisor: f64) -> Result<()> {
        if !divisor.is_finite() || divisor <= 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "scale factor must be finite and positive, got {divisor}"
            )));
        }
        for v in self.values.iter_mut() {
            *v /= divisor;
        }
        Ok(())
    }

    /// Extract rows `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end {
            return Err(ForecastError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::IndexOutOfBounds {
                index: end,
                size: self.len(),
            });
        }

        Ok(TimeSeries {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
            label: self.label.clone(),
        })
    }

    /// Split into the rows before `index` and the rows from `index` on.
    pub fn split_at(&self, index: usize) -> Result<(TimeSeries, TimeSeries)> {
        Ok((self.slice(0, index)?, self.slice(index, self.len())?))
    }

    /// Append `other` after this series.
    pub fn concat(&self, other: &TimeSeries) -> Result<TimeSeries> {
        let mut timestamps = self.timestamps.clone();
        timestamps.extend_from_slice(&other.timestamps);
        let mut values = self.values.clone();
        values.extend_from_slice(&other.values);

        let mut joined = TimeSeries::new(timestamps, values)?;
        joined.label = self.label.clone().or_else(|| other.label.clone());
        Ok(joined)
    }

    /// First `n` rows (fewer if the series is shorter).
    pub fn head(&self, n: usize) -> TimeSeries {
        let end = n.min(self.len());
        TimeSeries {
            timestamps: self.timestamps[..end].to_vec(),
            values: self.values[..end].to_vec(),
            label: self.label.clone(),
        }
    }

    /// Last `n` rows (fewer if the series is shorter).
    pub fn tail(&self, n: usize) -> TimeSeries {
        let start = self.len().saturating_sub(n);
        TimeSeries {
            timestamps: self.timestamps[start..].to_vec(),
            values: self.values[start..].to_vec(),
            label: self.label.clone(),
        }
    }

    /// Replace the values, keeping dates and label.
    pub fn with_values(&self, values: Vec<f64>) -> Result<TimeSeries> {
        let mut series = TimeSeries::new(self.timestamps.clone(), values)?;
        series.label = self.label.clone();
        Ok(series)
    }

    /// Infer the modal spacing of the dates.
    ///
    /// `tolerance` is the minimum share of gaps that must agree on the mode.
    /// Equally common spacings resolve to the shorter one.
    pub fn infer_frequency(&self, tolerance: f64) -> Result<Frequency> {
        if self.len() < 2 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: self.len(),
            });
        }

        let mut counts: HashMap<Frequency, usize> = HashMap::new();
        for w in self.timestamps.windows(2) {
            *counts.entry(Frequency::between(w[0], w[1])).or_insert(0) += 1;
        }

        let total = self.len() - 1;
        let (modal, count) = counts
            .into_iter()
            .max_by(|(fa, ca), (fb, cb)| {
                ca.cmp(cb)
                    .then_with(|| fb.nominal_days().cmp(&fa.nominal_days()))
            })
            .ok_or(ForecastError::TimestampError("no spacing data".to_string()))?;

        if (count as f64 / total as f64) < tolerance {
            return Err(ForecastError::TimestampError(
                "no dominant spacing between dates".to_string(),
            ));
        }
        if modal == Frequency::Days(0) {
            return Err(ForecastError::TimestampError(
                "dates are duplicated".to_string(),
            ));
        }

        Ok(modal)
    }

    /// Dates for the `horizon` periods following the last observation.
    pub fn future_dates(&self, horizon: usize) -> Result<Vec<NaiveDate>> {
        let last = self.last_date().ok_or(ForecastError::EmptyData)?;
        let freq = self.infer_frequency(0.5)?;

        (1..=horizon)
            .map(|h| {
                u32::try_from(h)
                    .ok()
                    .and_then(|steps| freq.advance(last, steps))
                    .ok_or_else(|| {
                        ForecastError::TimestampError(format!(
                            "date overflow {h} steps after {last}"
                        ))
                    })
            })
            .collect()
    }
}
