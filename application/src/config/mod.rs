//! Application-level configuration.
//!
//! - [`ExecutionParams`]: per-run call control (timeouts, synthesis options)

pub mod execution_params;

pub use execution_params::ExecutionParams;
