//! Structured configuration issues.
//!
//! Config validation never stops at the first problem: it returns every
//! [`ConfigIssue`] found so the caller can report them together and decide
//! based on [`Severity`] whether to continue.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigIssueCode {
    /// A model name is empty or whitespace.
    EmptyModelName { field: String },
    /// A model list that must be non-empty is empty.
    EmptyModelList { field: String },
    /// A numeric value lies outside its accepted range.
    OutOfRange { field: String, value: f64 },
    /// A text value that must carry content is blank.
    BlankText { field: String },
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_severity() {
        let code = ConfigIssueCode::BlankText {
            field: "aggregation.instructions".to_string(),
        };
        assert!(ConfigIssue::error(code.clone(), "blank").is_error());
        assert!(!ConfigIssue::warning(code, "blank").is_error());
    }
}
