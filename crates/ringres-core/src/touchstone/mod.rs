//! Touchstone file I/O module
//!
//! Provides reading of Touchstone (.snp / .ts) files.

pub mod parser;

pub use parser::{OptionLine, ParameterType, SParamFormat, Touchstone, TouchstoneError};
