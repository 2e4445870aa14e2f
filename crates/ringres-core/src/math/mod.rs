//! Mathematical helpers
//!
//! - `stats` - Median and mean over magnitude and result columns

pub mod stats;

pub use stats::{mean, mean_defined, median};
