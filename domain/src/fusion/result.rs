//! Fan-out and run result value objects

use crate::core::model::Model;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of a per-target failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Credentials missing or rejected
    Auth,
    /// Provider refused the call because of rate limits
    RateLimit,
    /// Connection, DNS, TLS or timeout failure
    Network,
    /// Provider returned an error or an unusable response
    Provider,
    /// The call was abandoned before it settled
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Auth => "auth",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::Network => "network",
            ErrorKind::Provider => "provider",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a target call failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

/// Outcome of querying one target model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanOutResult {
    /// The model that was queried
    pub model: Model,
    /// Generated text (empty on failure)
    pub text: String,
    /// Whether the call returned text
    pub succeeded: bool,
    /// Failure details when `succeeded` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl FanOutResult {
    pub fn success(model: Model, text: impl Into<String>) -> Self {
        Self {
            model,
            text: text.into(),
            succeeded: true,
            error: None,
        }
    }

    pub fn failure(model: Model, error: ErrorInfo) -> Self {
        Self {
            model,
            text: String::new(),
            succeeded: false,
            error: Some(error),
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

/// Complete result of one fan-out/aggregate run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionResult {
    /// The user prompt
    pub prompt: String,
    /// Fan-out results in target order
    pub references: Vec<FanOutResult>,
    /// The model that produced the synthesis
    pub aggregator: Model,
    /// The fully streamed synthesis
    pub answer: String,
    pub completed_at: DateTime<Utc>,
}

impl FusionResult {
    pub fn new(
        prompt: impl Into<String>,
        references: Vec<FanOutResult>,
        aggregator: Model,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            references,
            aggregator,
            answer: answer.into(),
            completed_at: Utc::now(),
        }
    }

    pub fn successful(&self) -> impl Iterator<Item = &FanOutResult> {
        self.references.iter().filter(|r| r.succeeded)
    }

    pub fn failed(&self) -> impl Iterator<Item = &FanOutResult> {
        self.references.iter().filter(|r| !r.succeeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_has_no_error() {
        let result = FanOutResult::success(Model::new("m1"), "4");
        assert!(result.succeeded);
        assert_eq!(result.text, "4");
        assert_eq!(result.error_kind(), None);
    }

    #[test]
    fn test_failure_has_empty_text() {
        let result = FanOutResult::failure(
            Model::new("m2"),
            ErrorInfo::new(ErrorKind::Network, "connection reset"),
        );
        assert!(!result.succeeded);
        assert!(result.text.is_empty());
        assert_eq!(result.error_kind(), Some(ErrorKind::Network));
        assert_eq!(
            result.error.unwrap().to_string(),
            "network error: connection reset"
        );
    }

    #[test]
    fn test_failure_serializes_error_kind() {
        let result = FanOutResult::failure(
            Model::new("m2"),
            ErrorInfo::new(ErrorKind::RateLimit, "slow down"),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["error"]["kind"], "rate_limit");
        assert_eq!(json["succeeded"], false);

        let ok = serde_json::to_value(FanOutResult::success(Model::new("m1"), "x")).unwrap();
        assert!(ok.get("error").is_none());
    }

    #[test]
    fn test_fusion_result_partitions() {
        let result = FusionResult::new(
            "q",
            vec![
                FanOutResult::success(Model::new("a"), "1"),
                FanOutResult::failure(Model::new("b"), ErrorInfo::new(ErrorKind::Auth, "401")),
                FanOutResult::success(Model::new("c"), "2"),
            ],
            Model::new("agg"),
            "answer",
        );
        assert_eq!(result.successful().count(), 2);
        assert_eq!(result.failed().count(), 1);
    }
}
