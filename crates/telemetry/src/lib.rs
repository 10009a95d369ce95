//! Tracing setup for the search gate.

pub mod tracing_setup;

pub use tracing_setup::*;
