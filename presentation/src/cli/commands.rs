//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for fusion results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every reference response, then the aggregated answer
    Full,
    /// Only the aggregated answer
    Synthesis,
    /// JSON output
    Json,
}

impl From<OutputFormat> for fusion_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => fusion_domain::OutputFormat::Full,
            OutputFormat::Synthesis => fusion_domain::OutputFormat::Synthesis,
            OutputFormat::Json => fusion_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for agent-fusion
#[derive(Parser, Debug)]
#[command(name = "agent-fusion")]
#[command(author, version, about = "Mixture-of-Agents - Ask several LLMs, fuse their answers")]
#[command(long_about = r#"
Agent Fusion sends your question to several reference models at once and
has an aggregator model synthesize their answers into one response.

The process has two phases:
1. Fan-out: All reference models answer your question in parallel
2. Aggregation: The aggregator streams a single synthesized answer

Configuration files are loaded from (in priority order):
1. --config <path>          Explicit config file
2. ./agent-fusion.toml      Project-level config
3. ~/.config/agent-fusion/config.toml   Global config

The API key is read from TOGETHER_API_KEY unless [provider] says otherwise.

Example:
  agent-fusion "What's the best way to handle errors in Rust?"
  agent-fusion -m Qwen/Qwen2.5-7B-Instruct-Turbo -m mistralai/Mistral-7B-Instruct-v0.3 "Explain RAII"
  agent-fusion --chat -o full
"#)]
pub struct Cli {
    /// The question to ask (not required in chat mode)
    pub question: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Reference models to query (can be specified multiple times)
    #[arg(short, long, value_name = "MODEL")]
    pub model: Vec<String>,

    /// Model that synthesizes the final answer
    #[arg(long, value_name = "MODEL")]
    pub aggregator: Option<String>,

    /// System instructions for the aggregator
    #[arg(long, value_name = "TEXT")]
    pub instructions: Option<String>,

    /// Sampling temperature for the reference calls
    #[arg(long, value_name = "FLOAT")]
    pub temperature: Option<f32>,

    /// Token limit for each reference call
    #[arg(long, value_name = "N")]
    pub max_tokens: Option<u32>,

    /// Output format (default: from config, else synthesis)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write logs to a daily-rotated file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}
