//! ringres-core: Substrate extraction from ring resonator measurements
//!
//! Extracts effective permittivity, substrate permittivity and loss tangent
//! from the transmission response of a microstrip ring resonator.
//!
//! ## Modules
//!
//! - `frequency` - Frequency vector with display unit
//! - `touchstone` - Touchstone file reading
//! - `network` - N-port S-parameter container and trace selection
//! - `trace` - Validated magnitude-vs-frequency trace
//! - `math` - Statistics helpers
//! - `extraction` - Peak detection, loss estimation, permittivity and the pipeline driver

pub mod constants;
pub mod error;
pub mod extraction;
pub mod frequency;
pub mod math;
pub mod network;
pub mod touchstone;
pub mod trace;

pub use error::{ExtractionError, Result};
pub use extraction::{
    ExtractionOptions, ExtractionReport, ExtractionResult, PhysicalParameters, Pipeline,
    PipelineState,
};
pub use frequency::Frequency;
pub use network::Network;
pub use trace::Trace;
