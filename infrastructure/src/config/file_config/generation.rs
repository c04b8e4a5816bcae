//! Reference call options from TOML (`[generation]` section)

use fusion_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGenerationConfig {
    /// Sampling temperature for each reference call (default: 0.7)
    pub temperature: f32,
    /// Token limit for each reference call (default: 512)
    pub max_tokens: u32,
    /// Per-target time limit in seconds (default: 180; 0 waits indefinitely)
    pub target_timeout_seconds: u64,
}

impl Default for FileGenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 512,
            target_timeout_seconds: 180,
        }
    }
}

impl FileGenerationConfig {
    pub fn target_timeout(&self) -> Option<Duration> {
        (self.target_timeout_seconds > 0).then(|| Duration::from_secs(self.target_timeout_seconds))
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if !(0.0..=2.0).contains(&self.temperature) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "generation.temperature".to_string(),
                    value: f64::from(self.temperature),
                },
                format!(
                    "generation.temperature: {} is outside 0.0..=2.0",
                    self.temperature
                ),
            ));
        }
        if self.max_tokens == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "generation.max_tokens".to_string(),
                    value: 0.0,
                },
                "generation.max_tokens must be greater than zero",
            ));
        }
        issues
    }
}
