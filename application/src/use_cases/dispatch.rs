//! Dispatch use case
//!
//! Fans one prompt out to every target model concurrently and waits for all
//! of them to settle. A failing target is recorded, never fatal.

use crate::config::ExecutionParams;
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::shared::is_cancelled;
use fusion_domain::{
    DomainError, ErrorInfo, ErrorKind, FanOutResult, GenerationOptions, Message, Model,
    PromptTemplate, QueryRequest, truncate,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that abort a dispatch as a whole
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Dispatch cancelled")]
    Cancelled,
}

impl From<DomainError> for DispatchError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::Cancelled => DispatchError::Cancelled,
            DomainError::InvalidInput(msg) | DomainError::InvalidModel(msg) => {
                DispatchError::InvalidInput(msg)
            }
        }
    }
}

/// Use case for the parallel fan-out
pub struct DispatchUseCase {
    gateway: Arc<dyn LlmGateway>,
    params: ExecutionParams,
    cancellation_token: Option<CancellationToken>,
}

impl DispatchUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            gateway,
            params: ExecutionParams::default(),
            cancellation_token: None,
        }
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    /// Set a cancellation token; cancelling abandons still-pending targets
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        request: &QueryRequest,
    ) -> Result<Vec<FanOutResult>, DispatchError> {
        self.execute_with_progress(request, &NoProgress).await
    }

    /// Query every target and return one result per target, in target order.
    ///
    /// Rejects an invalid request before issuing any call. Returns only once
    /// every target has settled, or with [`DispatchError::Cancelled`] as soon
    /// as the cancellation token fires.
    pub async fn execute_with_progress(
        &self,
        request: &QueryRequest,
        progress: &dyn ProgressNotifier,
    ) -> Result<Vec<FanOutResult>, DispatchError> {
        request.validate()?;
        if is_cancelled(&self.cancellation_token) {
            return Err(DispatchError::Cancelled);
        }

        let targets = request.targets();
        info!(
            "Dispatching prompt to {} models: {}",
            targets.len(),
            truncate(request.prompt(), 100)
        );
        progress.on_dispatch_start(targets);

        let messages: Arc<[Message]> = PromptTemplate::reference_messages(request.prompt()).into();
        let options = request.reference_options();
        let timeout = self.params.target_timeout;

        let mut join_set = JoinSet::new();
        for (index, model) in targets.iter().cloned().enumerate() {
            let gateway = Arc::clone(&self.gateway);
            let messages = Arc::clone(&messages);

            join_set.spawn(async move {
                let result =
                    Self::query_target(gateway.as_ref(), &model, &messages, options, timeout)
                        .await;
                (index, model, result)
            });
        }

        let mut slots: Vec<Option<FanOutResult>> = vec![None; targets.len()];

        loop {
            let joined = match &self.cancellation_token {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        let pending = join_set.len();
                        join_set.abort_all();
                        warn!("Dispatch cancelled with {} target(s) still pending", pending);
                        return Err(DispatchError::Cancelled);
                    }
                    joined = join_set.join_next() => joined,
                },
                None => join_set.join_next().await,
            };

            let Some(joined) = joined else { break };

            match joined {
                Ok((index, model, Ok(text))) => {
                    info!("Model {} responded successfully", model);
                    debug!("{}: {}", model, truncate(&text, 100));
                    let result = FanOutResult::success(model, text);
                    progress.on_target_complete(&result);
                    slots[index] = Some(result);
                }
                Ok((index, model, Err(e))) => {
                    warn!("Model {} failed: {}", model, e);
                    let result = FanOutResult::failure(model, e.to_error_info());
                    progress.on_target_complete(&result);
                    slots[index] = Some(result);
                }
                Err(e) => {
                    // Slot is filled below once every task has settled
                    warn!("Task join error: {}", e);
                }
            }
        }

        let results: Vec<FanOutResult> = slots
            .into_iter()
            .zip(targets)
            .map(|(slot, model)| {
                slot.unwrap_or_else(|| {
                    let result = FanOutResult::failure(
                        model.clone(),
                        ErrorInfo::new(ErrorKind::Provider, "target task ended without a result"),
                    );
                    progress.on_target_complete(&result);
                    result
                })
            })
            .collect();

        let succeeded = results.iter().filter(|r| r.succeeded).count();
        info!("Dispatch complete: {}/{} succeeded", succeeded, results.len());
        progress.on_dispatch_complete(&results);

        Ok(results)
    }

    /// Query a single target, bounded by the optional timeout
    async fn query_target(
        gateway: &dyn LlmGateway,
        model: &Model,
        messages: &[Message],
        options: GenerationOptions,
        timeout: Option<Duration>,
    ) -> Result<String, GatewayError> {
        debug!("Sending prompt to {}", model);
        let call = gateway.generate(model, messages, options.streaming(false));
        match timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| GatewayError::Timeout)?,
            None => call.await,
        }
    }
}
