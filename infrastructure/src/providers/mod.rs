//! LLM provider adapters
//!
//! Each adapter implements the application layer's `LlmGateway` port.

pub mod openai_compat;

pub use openai_compat::{OpenAiCompatConfig, OpenAiCompatGateway};
