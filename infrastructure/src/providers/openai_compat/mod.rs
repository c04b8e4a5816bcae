//! OpenAI-compatible chat completions adapter
//!
//! Speaks the `/v1/chat/completions` protocol shared by Together AI,
//! OpenAI, vLLM and others. Streaming responses arrive as server-sent
//! events and are forwarded into the gateway's `StreamHandle` channel.

mod error;
mod gateway;
mod types;

pub use gateway::{OpenAiCompatConfig, OpenAiCompatGateway};
