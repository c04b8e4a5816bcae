//! Provider configuration from TOML (`[provider]` section)

use fusion_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// OpenAI-compatible chat completions endpoint.
///
/// Defaults target Together AI; any server speaking the same protocol
/// (OpenAI, vLLM, Ollama's `/v1`) works by changing `base_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Base URL; `/v1/chat/completions` is appended.
    pub base_url: String,
    /// Environment variable name for the API key (default: "TOGETHER_API_KEY").
    pub api_key_env: String,
    /// Direct API key (prefer the env var).
    pub api_key: Option<String>,
    /// HTTP request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.together.xyz".to_string(),
            api_key_env: "TOGETHER_API_KEY".to_string(),
            api_key: None,
            timeout_seconds: 120,
        }
    }
}

impl FileProviderConfig {
    /// API key from the config file, else from the configured env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }

    pub(super) fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.base_url.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::BlankText {
                    field: "provider.base_url".to_string(),
                },
                "provider.base_url cannot be empty",
            ));
        }
        if self.api_key.is_some() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::BlankText {
                    field: "provider.api_key".to_string(),
                },
                format!(
                    "provider.api_key is set in a config file; prefer the {} environment variable",
                    self.api_key_env
                ),
            ));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_key_wins() {
        let config = FileProviderConfig {
            api_key: Some("sk-inline".into()),
            api_key_env: "AGENT_FUSION_TEST_UNSET_VARIABLE".into(),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_key().as_deref(), Some("sk-inline"));
        assert_eq!(config.validate().len(), 1);
    }

    #[test]
    fn test_missing_key_resolves_to_none() {
        let config = FileProviderConfig {
            api_key_env: "AGENT_FUSION_TEST_UNSET_VARIABLE".into(),
            ..Default::default()
        };
        assert!(config.resolve_api_key().is_none());
    }
}
