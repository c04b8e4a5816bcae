//! Progress display for fusion runs

pub mod reporter;
