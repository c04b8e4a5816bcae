//! Aggregation configuration from TOML (`[aggregation]` section)

use fusion_domain::{ConfigIssue, ConfigIssueCode, PromptTemplate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAggregationConfig {
    /// System instructions for the aggregator (default: built-in synthesis prompt)
    pub instructions: Option<String>,
    /// Token limit for the synthesis (default: provider default)
    pub max_tokens: Option<u32>,
}

impl FileAggregationConfig {
    pub fn instructions(&self) -> &str {
        self.instructions
            .as_deref()
            .unwrap_or_else(|| PromptTemplate::aggregator_system())
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if matches!(self.instructions.as_deref(), Some(text) if text.trim().is_empty()) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::BlankText {
                    field: "aggregation.instructions".to_string(),
                },
                "aggregation.instructions is blank; the aggregator will get no framing",
            ));
        }
        if self.max_tokens == Some(0) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange {
                    field: "aggregation.max_tokens".to_string(),
                    value: 0.0,
                },
                "aggregation.max_tokens must be greater than zero",
            ));
        }
        issues
    }
}
