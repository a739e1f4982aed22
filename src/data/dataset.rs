//! Case-count dataset with a chronological train/test split.

use crate::core::TimeSeries;
use crate::data::loader::{read_series, read_series_from_path, CsvOptions};
use crate::error::{ForecastError, LoadError, Result};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// A loaded series together with its train and test partitions.
///
/// The train partition holds the first `floor(train_size * n)` rows and the
/// test partition the rest, so train ++ test is the full series.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    data: TimeSeries,
    train: TimeSeries,
    test: TimeSeries,
    train_size: f64,
    /// Product of every factor passed to `set_scale`.
    scale: f64,
}

impl Dataset {
    /// Load `path` with column and date-format detection.
    pub fn from_csv(
        path: impl AsRef<Path>,
        train_size: f64,
    ) -> std::result::Result<Self, LoadError> {
        Self::from_csv_with(path, train_size, &CsvOptions::default())
    }

    pub fn from_csv_with(
        path: impl AsRef<Path>,
        train_size: f64,
        options: &CsvOptions,
    ) -> std::result::Result<Self, LoadError> {
        let path = path.as_ref();
        let series = read_series_from_path(path, options)?;
        info!(path = %path.display(), rows = series.len(), "dataset loaded");
        Ok(Self::from_series(series, train_size)?)
    }

    pub fn from_reader<R: Read>(
        source: R,
        train_size: f64,
        options: &CsvOptions,
    ) -> std::result::Result<Self, LoadError> {
        let series = read_series(source, options)?;
        Ok(Self::from_series(series, train_size)?)
    }

    /// Split an existing series.
    pub fn from_series(series: TimeSeries, train_size: f64) -> Result<Self> {
        if !(train_size > 0.0 && train_size < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "train size must lie in (0, 1), got {train_size}"
            )));
        }

        let train_len = (train_size * series.len() as f64).floor() as usize;
        let (train, test) = series.split_at(train_len)?;
        debug!(
            train = train.len(),
            test = test.len(),
            "dataset partitioned"
        );

        Ok(Self {
            data: series,
            train,
            test,
            train_size,
            scale: 1.0,
        })
    }

    /// The full series.
    pub fn data(&self) -> &TimeSeries {
        &self.data
    }

    pub fn train(&self) -> &TimeSeries {
        &self.train
    }

    pub fn test(&self) -> &TimeSeries {
        &self.test
    }

    pub fn train_size(&self) -> f64 {
        self.train_size
    }

    /// Cumulative divisor applied by `set_scale`; 1 when unscaled.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Divide the data and both partitions by `factor`.
    ///
    /// On error nothing is modified.
    pub fn set_scale(&mut self, factor: f64) -> Result<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ForecastError::InvalidParameter(format!(
                "scale factor must be finite and positive, got {factor}"
            )));
        }
        self.data.divide_by(factor)?;
        self.train.divide_by(factor)?;
        self.test.divide_by(factor)?;
        self.scale *= factor;
        debug!(factor, scale = self.scale, "dataset rescaled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Frequency;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn monthly(n: usize) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(1998, 1, 1).unwrap();
        let dates = (0..n)
            .map(|i| Frequency::Monthly.advance(start, i as u32).unwrap())
            .collect();
        let values = (0..n).map(|i| (i as f64 + 1.0) * 10.0).collect();
        TimeSeries::new(dates, values).unwrap()
    }

    #[test]
    fn split_respects_train_size() {
        let ds = Dataset::from_series(monthly(300), 0.8).unwrap();
        assert_eq!(ds.train().len(), 240);
        assert_eq!(ds.test().len(), 60);
        assert_eq!(
            ds.train().last_date(),
            NaiveDate::from_ymd_opt(2017, 12, 1)
        );
        assert_eq!(ds.test().first_date(), NaiveDate::from_ymd_opt(2018, 1, 1));
        assert_eq!(&ds.train().concat(ds.test()).unwrap(), ds.data());
    }

    #[test]
    fn split_floors_fractional_rows() {
        let ds = Dataset::from_series(monthly(7), 0.5).unwrap();
        assert_eq!(ds.train().len(), 3);
        assert_eq!(ds.test().len(), 4);
    }

    #[test]
    fn rejects_train_size_outside_unit_interval() {
        for bad in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            assert!(matches!(
                Dataset::from_series(monthly(10), bad),
                Err(ForecastError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn set_scale_divides_every_partition() {
        let mut ds = Dataset::from_series(monthly(10), 0.8).unwrap();
        ds.set_scale(10.0).unwrap();

        assert_relative_eq!(ds.data().values()[9], 10.0);
        assert_relative_eq!(ds.train().values()[0], 1.0);
        assert_relative_eq!(ds.test().values()[1], 10.0);
        assert_relative_eq!(ds.scale(), 10.0);

        ds.set_scale(0.1).unwrap();
        assert_relative_eq!(ds.data().values()[9], 100.0, epsilon = 1e-9);
        assert_relative_eq!(ds.scale(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn set_scale_rejects_bad_factor() {
        let mut ds = Dataset::from_series(monthly(10), 0.8).unwrap();
        let before = ds.clone();
        for bad in [0.0, -3.0, f64::INFINITY, f64::NAN] {
            assert!(ds.set_scale(bad).is_err());
        }
        assert_eq!(ds, before);
    }

    #[test]
    fn from_reader_wraps_split_errors() {
        let err = Dataset::from_reader(
            "date,cases\n2020-01-01,1\n".as_bytes(),
            2.0,
            &CsvOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LoadError::Series(ForecastError::InvalidParameter(_))
        ));
    }
}
