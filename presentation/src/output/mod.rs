//! Result rendering

pub mod console;
