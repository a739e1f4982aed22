//! Text charts for the analysis report.
//!
//! Charts are drawn with ratatui widgets into an off-screen buffer and
//! returned as plain text, so they can be written to any output stream.

mod chart;

pub use chart::{decomposition_figure, Figure, Line, Panels};
