//! Application layer for agent-fusion
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    llm_gateway::{GatewayError, LlmGateway, StreamHandle},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::aggregate::{AggregateError, AggregateStream, AggregateUseCase};
pub use use_cases::dispatch::{DispatchError, DispatchUseCase};
pub use use_cases::run_fusion::{RunFusionError, RunFusionUseCase};
