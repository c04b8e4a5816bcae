//! Execution parameters for use case call control
//!
//! [`ExecutionParams`] groups the static parameters that control how the
//! dispatch and aggregate use cases issue their calls. These are
//! application-layer concerns, not part of a [`QueryRequest`](fusion_domain::QueryRequest).

use fusion_domain::GenerationOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Call control parameters shared by dispatch and aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Upper bound on each fan-out call. `None` waits as long as the
    /// gateway does.
    pub target_timeout: Option<Duration>,
    /// Options for the synthesis call. `stream` is always forced on.
    pub aggregator_options: GenerationOptions,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            target_timeout: Some(Duration::from_secs(180)),
            aggregator_options: GenerationOptions::aggregator_defaults(),
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_target_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.target_timeout = timeout;
        self
    }

    pub fn with_aggregator_options(mut self, options: GenerationOptions) -> Self {
        self.aggregator_options = options.streaming(true);
        self
    }
}
