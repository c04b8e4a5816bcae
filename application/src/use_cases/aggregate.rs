//! Aggregate use case
//!
//! Synthesizes the successful fan-out results into one answer with a single
//! streaming call, exposed as a lazily-pulled [`AggregateStream`].

use crate::config::ExecutionParams;
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use fusion_domain::{
    AggregateSession, AggregateState, FanOutResult, Model, PromptTemplate, StreamEvent,
};
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Errors that end an aggregation run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregateError {
    #[error("No successful responses to aggregate")]
    NoViableInput,

    #[error("Synthesis failed: {0}")]
    SynthesisFailed(#[from] GatewayError),

    #[error("Synthesis stream interrupted: {message}")]
    StreamInterrupted { partial: String, message: String },

    #[error("Synthesis cancelled")]
    Cancelled { partial: String },
}

impl AggregateError {
    /// Text that had accumulated before the run ended, if any
    pub fn partial_text(&self) -> Option<&str> {
        match self {
            AggregateError::StreamInterrupted { partial, .. }
            | AggregateError::Cancelled { partial } => Some(partial),
            _ => None,
        }
    }
}

/// Use case for the streaming synthesis
pub struct AggregateUseCase {
    gateway: Arc<dyn LlmGateway>,
    params: ExecutionParams,
}

impl AggregateUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            gateway,
            params: ExecutionParams::default(),
        }
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    /// Open the synthesis stream.
    ///
    /// Fails with [`AggregateError::NoViableInput`] without calling the
    /// gateway when no result succeeded. Failed results never reach the
    /// synthesis prompt.
    pub async fn execute(
        &self,
        results: &[FanOutResult],
        instructions: &str,
        model: &Model,
    ) -> Result<AggregateStream, AggregateError> {
        let viable = results.iter().filter(|r| r.succeeded).count();
        if viable == 0 {
            warn!("All {} fan-out results failed; skipping synthesis", results.len());
            return Err(AggregateError::NoViableInput);
        }

        info!(
            "Synthesizing {} of {} responses with {}",
            viable,
            results.len(),
            model
        );

        let messages = PromptTemplate::aggregation_messages(instructions, results);
        let options = self.params.aggregator_options.streaming(true);
        let handle = self
            .gateway
            .generate_streaming(model, &messages, options)
            .await?;

        debug!("Synthesis stream opened for {}", model);
        Ok(AggregateStream::new(model.clone(), handle.receiver))
    }
}

/// Outcome of applying one stream event to the session
enum Step {
    Yield(String),
    Skip,
    End,
    Fail(AggregateError),
}

/// Lazy, finite, non-restartable sequence of synthesis fragments.
///
/// Every fragment handed out has already been appended to the owned
/// [`AggregateSession`], so the concatenation of pulled fragments always
/// equals [`accumulated_text`](Self::accumulated_text). Once the stream has
/// ended, been interrupted or been closed, further pulls yield nothing.
pub struct AggregateStream {
    model: Model,
    receiver: Option<mpsc::Receiver<StreamEvent>>,
    session: AggregateSession,
}

impl AggregateStream {
    fn new(model: Model, receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self {
            model,
            receiver: Some(receiver),
            session: AggregateSession::new(),
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn session(&self) -> &AggregateSession {
        &self.session
    }

    pub fn state(&self) -> AggregateState {
        self.session.state()
    }

    pub fn accumulated_text(&self) -> &str {
        self.session.accumulated_text()
    }

    /// Pull the next fragment.
    ///
    /// `Ok(None)` signals end-of-stream and is returned on every later pull.
    /// Cancel-safe: dropping the returned future before it resolves loses no
    /// fragment.
    pub async fn next_fragment(&mut self) -> Result<Option<String>, AggregateError> {
        loop {
            let Some(receiver) = self.receiver.as_mut() else {
                return Ok(None);
            };
            let event = receiver.recv().await;
            match self.apply(event) {
                Step::Yield(fragment) => return Ok(Some(fragment)),
                Step::Skip => continue,
                Step::End => return Ok(None),
                Step::Fail(error) => return Err(error),
            }
        }
    }

    /// Close the stream early. The text accumulated so far is final.
    pub fn close(&mut self) {
        if self.receiver.take().is_some() {
            debug!(
                "Synthesis stream for {} closed after {} bytes",
                self.model,
                self.session.accumulated_text().len()
            );
            self.session.fail();
        }
    }

    /// Drain the stream and return the full text.
    pub async fn collect_text(mut self) -> Result<String, AggregateError> {
        while self.next_fragment().await?.is_some() {}
        Ok(self.session.into_text())
    }

    pub fn into_session(self) -> AggregateSession {
        self.session
    }

    fn apply(&mut self, event: Option<StreamEvent>) -> Step {
        match event {
            Some(StreamEvent::Delta(chunk)) => {
                if chunk.is_empty() {
                    return Step::Skip;
                }
                self.session.append(&chunk);
                Step::Yield(chunk)
            }
            Some(StreamEvent::Completed(text)) => {
                self.receiver = None;
                // Non-streaming adapters deliver everything here
                let fallback = self.session.state() == AggregateState::NotStarted
                    && !text.is_empty();
                if fallback {
                    self.session.append(&text);
                }
                self.session.complete();
                if fallback { Step::Yield(text) } else { Step::End }
            }
            Some(StreamEvent::Error(message)) => {
                self.receiver = None;
                self.session.fail();
                warn!("Synthesis stream from {} interrupted: {}", self.model, message);
                Step::Fail(AggregateError::StreamInterrupted {
                    partial: self.session.accumulated_text().to_string(),
                    message,
                })
            }
            None => {
                // Producer went away without Completed or Error
                self.receiver = None;
                self.session.fail();
                let message = "stream ended without completion".to_string();
                warn!("Synthesis stream from {} {}", self.model, message);
                Step::Fail(AggregateError::StreamInterrupted {
                    partial: self.session.accumulated_text().to_string(),
                    message,
                })
            }
        }
    }
}

impl Stream for AggregateStream {
    type Item = Result<String, AggregateError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            let Some(receiver) = this.receiver.as_mut() else {
                return Poll::Ready(None);
            };
            let event = ready!(receiver.poll_recv(cx));
            match this.apply(event) {
                Step::Yield(fragment) => return Poll::Ready(Some(Ok(fragment))),
                Step::Skip => continue,
                Step::End => return Poll::Ready(None),
                Step::Fail(error) => return Poll::Ready(Some(Err(error))),
            }
        }
    }
}
