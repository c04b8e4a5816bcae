//! Domain layer for agent-fusion
//!
//! This crate contains the value objects of the fan-out/aggregate engine.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Fan-out**: one prompt is sent to several target [`Model`]s at once,
//!   producing one [`FanOutResult`] per target in request order.
//! - **Aggregation**: the successful results are synthesized by an aggregator
//!   model; its streamed output grows an [`AggregateSession`].

pub mod config;
pub mod core;
pub mod fusion;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::{error::DomainError, model::Model, string::truncate};
pub use fusion::{
    AggregateSession, AggregateState, ErrorInfo, ErrorKind, FanOutResult, FusionResult,
    QueryRequest,
};
pub use prompt::PromptTemplate;
pub use session::{
    entities::{Message, Role},
    options::GenerationOptions,
    stream::StreamEvent,
};
