//! Model value object representing a backend LLM

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// Opaque identifier of a backend model (Value Object)
///
/// Nothing is assumed about the structure of the identifier beyond
/// equality; `"Qwen/Qwen2.5-7B-Instruct-Turbo"` and `"gpt-4.1"` are both
/// just strings handed to the provider unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Model(String);

impl Model {
    /// Create a model identifier without validation.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a model identifier, rejecting empty or whitespace-only names.
    pub fn try_new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidModel(
                "model identifier cannot be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is blank and would be rejected by a provider.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Reference models queried during fan-out when none are configured.
    pub fn default_references() -> Vec<Model> {
        vec![
            Model::new("mistralai/Mistral-7B-Instruct-v0.3"),
            Model::new("mistralai/Mistral-Small-24B-Instruct-2501"),
            Model::new("Qwen/Qwen2.5-7B-Instruct-Turbo"),
        ]
    }

    /// Aggregator model used when none is configured.
    pub fn default_aggregator() -> Model {
        Model::new("mistralai/Mistral-7B-Instruct-v0.3")
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Model {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::try_new(s)
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        Model::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_display_is_identity() {
        let model = Model::new("Qwen/Qwen2.5-7B-Instruct-Turbo");
        assert_eq!(model.to_string(), "Qwen/Qwen2.5-7B-Instruct-Turbo");
        assert_eq!(model.as_str(), "Qwen/Qwen2.5-7B-Instruct-Turbo");
    }

    #[test]
    fn test_parse_rejects_blank() {
        assert!("".parse::<Model>().is_err());
        assert!("   ".parse::<Model>().is_err());
        assert_eq!("m1".parse::<Model>().unwrap(), Model::new("m1"));
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let json = serde_json::to_string(&Model::new("m1")).unwrap();
        assert_eq!(json, "\"m1\"");
        let model: Model = serde_json::from_str("\"m2\"").unwrap();
        assert_eq!(model, Model::new("m2"));
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Model::default_references().len(), 3);
        assert!(
            Model::default_references().contains(&Model::default_aggregator()),
            "default aggregator is also one of the references"
        );
    }
}
