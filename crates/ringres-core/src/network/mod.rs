//! Network module - N-port S-parameter representation
//!
//! Provides the Network struct loaded from Touchstone data and the
//! derived magnitude views used to select a measurement trace.

mod core;
mod derived;

pub use self::core::Network;
