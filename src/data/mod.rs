//! Loading case counts from CSV and partitioning them for evaluation.

mod dataset;
mod loader;

pub use dataset::Dataset;
pub use loader::{read_series, read_series_from_path, CsvOptions};
