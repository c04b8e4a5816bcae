//! Prompt domain
//!
//! Templates for the reference and aggregation calls.

mod template;

pub use template::PromptTemplate;
