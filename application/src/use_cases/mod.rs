//! Use cases (application services)
//!
//! - [`dispatch`]: parallel fan-out of one prompt to every target model
//! - [`aggregate`]: streaming synthesis of the successful results
//! - [`run_fusion`]: both phases end to end

pub mod aggregate;
pub mod dispatch;
pub mod run_fusion;
mod shared;

#[cfg(test)]
pub(crate) mod test_support;
