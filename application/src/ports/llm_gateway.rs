//! LLM Gateway port
//!
//! Defines the text-generation capability the engine consumes: a model
//! identifier plus an ordered message list in, generated text out, either in
//! one piece or as a stream of fragments.

use async_trait::async_trait;
use fusion_domain::{ErrorInfo, ErrorKind, GenerationOptions, Message, Model, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Timeout")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    /// Category used when this error is recorded on a fan-out result
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Auth(_) => ErrorKind::Auth,
            GatewayError::RateLimited(_) => ErrorKind::RateLimit,
            GatewayError::Network(_) | GatewayError::Timeout => ErrorKind::Network,
            GatewayError::Provider(_) | GatewayError::InvalidResponse(_) => ErrorKind::Provider,
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo::new(self.kind(), self.to_string())
    }
}

/// Gateway for LLM communication
///
/// This port defines how the application layer communicates with LLM providers.
/// Implementations (adapters) live in the infrastructure layer and must be
/// safe to call concurrently from many tasks.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Generate a complete response in one piece.
    async fn generate(
        &self,
        model: &Model,
        messages: &[Message],
        options: GenerationOptions,
    ) -> Result<String, GatewayError>;

    /// Generate a response as a stream of fragments.
    ///
    /// Default implementation calls `generate()` and wraps the result in a
    /// single `Completed` event, so non-streaming adapters work unchanged.
    async fn generate_streaming(
        &self,
        model: &Model,
        messages: &[Message],
        options: GenerationOptions,
    ) -> Result<StreamHandle, GatewayError> {
        let result = self.generate(model, messages, options).await?;
        let (tx, rx) = mpsc::channel(1);
        // Receiver may already be gone; nothing to deliver then
        let _ = tx.send(StreamEvent::Completed(result)).await;
        Ok(StreamHandle::new(rx))
    }
}

/// Handle for receiving streaming events from an LLM call.
///
/// Dropping the handle closes the channel, which tells the producing task to
/// stop.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Build a handle pre-filled with the given events.
    pub fn from_events(events: Vec<StreamEvent>) -> Self {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            // capacity covers every event
            let _ = tx.try_send(event);
        }
        Self::new(rx)
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => full_text.push_str(&chunk),
                StreamEvent::Completed(text) => {
                    if full_text.is_empty() {
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                StreamEvent::Error(e) => {
                    return Err(GatewayError::Provider(e));
                }
            }
        }
        // Channel closed without Completed; return what we have
        Ok(full_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGateway;

    #[async_trait]
    impl LlmGateway for FixedGateway {
        async fn generate(
            &self,
            _model: &Model,
            _messages: &[Message],
            _options: GenerationOptions,
        ) -> Result<String, GatewayError> {
            Ok("fixed".to_string())
        }
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(GatewayError::Auth("401".into()).kind(), ErrorKind::Auth);
        assert_eq!(
            GatewayError::RateLimited("429".into()).kind(),
            ErrorKind::RateLimit
        );
        assert_eq!(GatewayError::Timeout.kind(), ErrorKind::Network);
        assert_eq!(
            GatewayError::InvalidResponse("no choices".into()).kind(),
            ErrorKind::Provider
        );
    }

    #[test]
    fn test_error_info_keeps_message() {
        let info = GatewayError::Network("connection reset".into()).to_error_info();
        assert_eq!(info.kind, ErrorKind::Network);
        assert_eq!(info.message, "Network error: connection reset");
    }

    #[tokio::test]
    async fn test_default_streaming_wraps_generate() {
        let handle = FixedGateway
            .generate_streaming(&Model::new("m"), &[], GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(handle.collect_text().await.unwrap(), "fixed");
    }

    #[tokio::test]
    async fn test_collect_text_prefers_deltas() {
        let handle = StreamHandle::from_events(vec![
            StreamEvent::Delta("a".into()),
            StreamEvent::Delta("b".into()),
            StreamEvent::Completed("ab".into()),
        ]);
        assert_eq!(handle.collect_text().await.unwrap(), "ab");
    }

    #[tokio::test]
    async fn test_collect_text_surfaces_error() {
        let handle = StreamHandle::from_events(vec![
            StreamEvent::Delta("a".into()),
            StreamEvent::Error("boom".into()),
        ]);
        assert_eq!(
            handle.collect_text().await,
            Err(GatewayError::Provider("boom".into()))
        );
    }
}
