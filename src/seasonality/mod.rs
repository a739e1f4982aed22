//! Seasonal decomposition.
//!
//! Classical moving-average decomposition into trend, seasonal and residual
//! components, in additive or multiplicative form.

mod decompose;

pub use decompose::{seasonal_decompose, ClassicalDecomposition, DecomposeModel, Decomposition};
