//! Configuration file loading for agent-fusion
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `AGENT_FUSION_*` environment variables (`__` separates nested keys)
//! 2. `--config <path>` specified file
//! 3. Project root: `./agent-fusion.toml` or `./.agent-fusion.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/agent-fusion/config.toml`
//! 5. Default values
//!
//! CLI flags are applied on top by the binary.

mod file_config;
mod loader;

pub use file_config::{
    FileAggregationConfig, FileConfig, FileGenerationConfig, FileModelsConfig, FileOutputConfig,
    FileProviderConfig, FileReplConfig,
};
pub use loader::ConfigLoader;
