//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod aggregation;
mod generation;
mod models;
mod output;
mod provider;
mod repl;

pub use aggregation::FileAggregationConfig;
pub use generation::FileGenerationConfig;
pub use models::FileModelsConfig;
pub use output::FileOutputConfig;
pub use provider::FileProviderConfig;
pub use repl::FileReplConfig;

use fusion_application::ExecutionParams;
use fusion_domain::{ConfigIssue, GenerationOptions, Model};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Reference and aggregator model selection
    pub models: FileModelsConfig,
    /// Aggregator framing
    pub aggregation: FileAggregationConfig,
    /// Sampling options for the reference calls
    pub generation: FileGenerationConfig,
    /// OpenAI-compatible endpoint and credentials
    pub provider: FileProviderConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// REPL settings
    pub repl: FileReplConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.models.parse_references().1);
        issues.extend(self.models.parse_aggregator().1);
        issues.extend(self.aggregation.validate());
        issues.extend(self.generation.validate());
        issues.extend(self.provider.validate());

        issues
    }

    /// Reference models, falling back to the built-in set.
    pub fn reference_models(&self) -> Vec<Model> {
        match self.models.parse_references().0 {
            Some(models) if !models.is_empty() => models,
            _ => Model::default_references(),
        }
    }

    /// Aggregator model, falling back to the built-in default.
    pub fn aggregator_model(&self) -> Model {
        self.models
            .parse_aggregator()
            .0
            .unwrap_or_else(Model::default_aggregator)
    }

    /// Options for the fan-out calls
    pub fn reference_options(&self) -> GenerationOptions {
        GenerationOptions::default()
            .with_temperature(self.generation.temperature)
            .with_max_tokens(self.generation.max_tokens)
    }

    /// Call control for the use cases
    pub fn execution_params(&self) -> ExecutionParams {
        let mut aggregator_options = GenerationOptions::aggregator_defaults();
        if let Some(max_tokens) = self.aggregation.max_tokens {
            aggregator_options = aggregator_options.with_max_tokens(max_tokens);
        }
        ExecutionParams::default()
            .with_target_timeout(self.generation.target_timeout())
            .with_aggregator_options(aggregator_options)
    }
}
