//! Query request value object

use crate::core::error::DomainError;
use crate::core::model::Model;
use crate::prompt::PromptTemplate;
use crate::session::options::GenerationOptions;
use serde::{Deserialize, Serialize};

/// One fan-out/aggregate query (Value Object)
///
/// Construction does not validate; [`QueryRequest::validate`] is called by
/// the dispatcher so that an invalid request is rejected before any call
/// leaves the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    prompt: String,
    targets: Vec<Model>,
    aggregator: Model,
    instructions: String,
    reference_options: GenerationOptions,
}

impl QueryRequest {
    pub fn new(prompt: impl Into<String>, targets: Vec<Model>, aggregator: Model) -> Self {
        Self {
            prompt: prompt.into(),
            targets,
            aggregator,
            instructions: PromptTemplate::aggregator_system().to_string(),
            reference_options: GenerationOptions::reference_defaults(),
        }
    }

    /// Replace the framing instructions given to the aggregator model.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Replace the options used for each fan-out call.
    pub fn with_reference_options(mut self, options: GenerationOptions) -> Self {
        self.reference_options = options;
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn targets(&self) -> &[Model] {
        &self.targets
    }

    pub fn aggregator(&self) -> &Model {
        &self.aggregator
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn reference_options(&self) -> GenerationOptions {
        self.reference_options
    }

    /// Check the request invariants.
    ///
    /// Fails with [`DomainError::InvalidInput`] when the prompt is blank, the
    /// target list is empty, or any model identifier is blank.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.prompt.trim().is_empty() {
            return Err(DomainError::InvalidInput("prompt is empty".to_string()));
        }
        if self.targets.is_empty() {
            return Err(DomainError::InvalidInput(
                "no target models given".to_string(),
            ));
        }
        if let Some(pos) = self.targets.iter().position(Model::is_blank) {
            return Err(DomainError::InvalidInput(format!(
                "target model #{} has an empty identifier",
                pos + 1
            )));
        }
        if self.aggregator.is_blank() {
            return Err(DomainError::InvalidInput(
                "aggregator model has an empty identifier".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets() -> Vec<Model> {
        vec![Model::new("m1"), Model::new("m2")]
    }

    #[test]
    fn test_valid_request() {
        let request = QueryRequest::new("What is 2+2?", targets(), Model::new("agg"));
        assert!(request.validate().is_ok());
        assert_eq!(request.targets().len(), 2);
        assert_eq!(request.instructions(), PromptTemplate::aggregator_system());
        assert_eq!(
            request.reference_options(),
            GenerationOptions::reference_defaults()
        );
    }

    #[test]
    fn test_blank_prompt_rejected() {
        let request = QueryRequest::new("  \n", targets(), Model::new("agg"));
        assert!(matches!(
            request.validate(),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_empty_targets_rejected() {
        let request = QueryRequest::new("hi", vec![], Model::new("agg"));
        assert_eq!(
            request.validate(),
            Err(DomainError::InvalidInput("no target models given".to_string()))
        );
    }

    #[test]
    fn test_blank_target_rejected() {
        let request = QueryRequest::new(
            "hi",
            vec![Model::new("m1"), Model::new(" ")],
            Model::new("agg"),
        );
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("#2"));
    }

    #[test]
    fn test_builder_overrides() {
        let options = GenerationOptions::default().with_max_tokens(32);
        let request = QueryRequest::new("hi", targets(), Model::new("agg"))
            .with_instructions("combine")
            .with_reference_options(options);
        assert_eq!(request.instructions(), "combine");
        assert_eq!(request.reference_options().max_tokens, Some(32));
    }
}
