//! Model selection from TOML (`[models]` section)

use fusion_domain::{ConfigIssue, ConfigIssueCode, Model};
use serde::{Deserialize, Serialize};

/// Model selection from TOML
///
/// # Example
///
/// ```toml
/// [models]
/// references = ["mistralai/Mistral-7B-Instruct-v0.3", "Qwen/Qwen2.5-7B-Instruct-Turbo"]
/// aggregator = "mistralai/Mistral-7B-Instruct-v0.3"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelsConfig {
    /// Models queried in parallel during fan-out
    pub references: Option<Vec<String>>,
    /// Model that synthesizes the reference answers
    pub aggregator: Option<String>,
}

impl FileModelsConfig {
    /// Parse the reference list, collecting issues for empty names.
    pub fn parse_references(&self) -> (Option<Vec<Model>>, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let Some(names) = self.references.as_ref() else {
            return (None, issues);
        };

        if names.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyModelList {
                    field: "references".to_string(),
                },
                "models.references: at least one reference model is required",
            ));
        }

        let mut models = Vec::new();
        for name in names {
            match Model::try_new(name.as_str()) {
                Ok(model) => models.push(model),
                Err(_) => issues.push(ConfigIssue::error(
                    ConfigIssueCode::EmptyModelName {
                        field: "references".to_string(),
                    },
                    "models.references: model name cannot be empty in list",
                )),
            }
        }
        (Some(models), issues)
    }

    /// Parse the aggregator name, collecting an issue if it is empty.
    pub fn parse_aggregator(&self) -> (Option<Model>, Vec<ConfigIssue>) {
        match self.aggregator.as_deref() {
            None => (None, Vec::new()),
            Some(name) => match Model::try_new(name) {
                Ok(model) => (Some(model), Vec::new()),
                Err(_) => (
                    None,
                    vec![ConfigIssue::error(
                        ConfigIssueCode::EmptyModelName {
                            field: "aggregator".to_string(),
                        },
                        "models.aggregator: model name cannot be empty",
                    )],
                ),
            },
        }
    }
}
