//! Aggregate session: transient state of one synthesis stream

use serde::{Deserialize, Serialize};

/// Lifecycle of an aggregation run
///
/// `NotStarted → Streaming → {Complete | Failed}`; a stream that ends before
/// any fragment goes straight from `NotStarted` to a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateState {
    NotStarted,
    Streaming,
    Complete,
    Failed,
}

impl AggregateState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AggregateState::Complete | AggregateState::Failed)
    }
}

/// Accumulated synthesis text plus its lifecycle state.
///
/// The text only ever grows, and only while the session is not terminal.
#[derive(Debug, Clone)]
pub struct AggregateSession {
    accumulated: String,
    state: AggregateState,
}

impl AggregateSession {
    pub fn new() -> Self {
        Self {
            accumulated: String::new(),
            state: AggregateState::NotStarted,
        }
    }

    pub fn state(&self) -> AggregateState {
        self.state
    }

    pub fn accumulated_text(&self) -> &str {
        &self.accumulated
    }

    pub fn into_text(self) -> String {
        self.accumulated
    }

    pub fn is_complete(&self) -> bool {
        self.state == AggregateState::Complete
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Append a fragment, entering `Streaming` on the first one.
    ///
    /// Returns `false` and leaves the text untouched once the session has
    /// ended.
    pub fn append(&mut self, fragment: &str) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = AggregateState::Streaming;
        self.accumulated.push_str(fragment);
        true
    }

    /// Mark end-of-stream. No-op on a terminal session.
    pub fn complete(&mut self) {
        if !self.state.is_terminal() {
            self.state = AggregateState::Complete;
        }
    }

    /// Mark a mid-stream failure. No-op on a terminal session.
    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.state = AggregateState::Failed;
        }
    }
}

impl Default for AggregateSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_fragment_enters_streaming() {
        let mut session = AggregateSession::new();
        assert_eq!(session.state(), AggregateState::NotStarted);
        assert!(session.append("The"));
        assert_eq!(session.state(), AggregateState::Streaming);
        assert!(session.append(" answer"));
        assert_eq!(session.accumulated_text(), "The answer");
    }

    #[test]
    fn test_complete_is_terminal() {
        let mut session = AggregateSession::new();
        session.append("done");
        session.complete();
        assert!(session.is_complete());
        assert!(!session.append(" more"));
        assert_eq!(session.accumulated_text(), "done");

        session.fail();
        assert_eq!(session.state(), AggregateState::Complete);
    }

    #[test]
    fn test_failed_keeps_partial_text() {
        let mut session = AggregateSession::new();
        session.append("partial");
        session.fail();
        assert_eq!(session.state(), AggregateState::Failed);
        assert!(!session.is_complete());
        session.complete();
        assert_eq!(session.state(), AggregateState::Failed);
        assert_eq!(session.into_text(), "partial");
    }

    #[test]
    fn test_empty_stream_completes_from_not_started() {
        let mut session = AggregateSession::new();
        session.complete();
        assert!(session.is_complete());
        assert!(session.accumulated_text().is_empty());
    }
}
