//! Streaming events for LLM responses.
//!
//! [`StreamEvent`] represents individual events in a streaming LLM response,
//! enabling real-time display of model output as it's generated.

/// An event in a streaming LLM response.
///
/// Bridges provider-level streaming (SSE chunks) to the application layer.
/// Exactly one terminal event (`Completed` or `Error`) ends a well-formed
/// stream; a channel that closes without one is treated as end-of-stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text chunk from the model.
    Delta(String),
    /// The complete response text (signals stream end).
    ///
    /// Producers that already emitted every chunk as `Delta` may send the
    /// full text here again; consumers only use it when no delta arrived.
    Completed(String),
    /// An error that occurred during streaming.
    Error(String),
}

impl StreamEvent {
    /// Returns the text content if this is a Delta or Completed event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) | StreamEvent::Completed(s) => Some(s),
            StreamEvent::Error(_) => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Completed(_) | StreamEvent::Error(_))
    }
}
