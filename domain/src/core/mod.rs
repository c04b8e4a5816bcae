//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: opaque identifier of a backend model
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
pub mod string;
