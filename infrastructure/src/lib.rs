//! Infrastructure layer for agent-fusion
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileAggregationConfig, FileConfig, FileGenerationConfig, FileModelsConfig,
    FileOutputConfig, FileProviderConfig, FileReplConfig,
};
pub use providers::{OpenAiCompatConfig, OpenAiCompatGateway};
