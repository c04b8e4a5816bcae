//! Run Fusion use case
//!
//! Orchestrates a full run: parallel fan-out, then streaming synthesis.

use crate::config::ExecutionParams;
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::aggregate::{AggregateError, AggregateStream, AggregateUseCase};
use crate::use_cases::dispatch::{DispatchError, DispatchUseCase};
use fusion_domain::{FusionResult, QueryRequest};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Errors that can occur during a fusion run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunFusionError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

impl RunFusionError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            RunFusionError::Dispatch(DispatchError::Cancelled)
                | RunFusionError::Aggregate(AggregateError::Cancelled { .. })
        )
    }

    /// Synthesis text produced before the run ended, if any
    pub fn partial_text(&self) -> Option<&str> {
        match self {
            RunFusionError::Aggregate(e) => e.partial_text(),
            RunFusionError::Dispatch(_) => None,
        }
    }
}

/// Use case for running a full fan-out/aggregate query
pub struct RunFusionUseCase {
    dispatch: DispatchUseCase,
    aggregate: AggregateUseCase,
    cancellation_token: Option<CancellationToken>,
}

impl RunFusionUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self::with_params(gateway, ExecutionParams::default())
    }

    pub fn with_params(gateway: Arc<dyn LlmGateway>, params: ExecutionParams) -> Self {
        Self {
            dispatch: DispatchUseCase::new(Arc::clone(&gateway)).with_params(params.clone()),
            aggregate: AggregateUseCase::new(gateway).with_params(params),
            cancellation_token: None,
        }
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.dispatch = self.dispatch.with_cancellation(token.clone());
        self.cancellation_token = Some(token);
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, request: &QueryRequest) -> Result<FusionResult, RunFusionError> {
        self.execute_with_progress(request, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        request: &QueryRequest,
        progress: &dyn ProgressNotifier,
    ) -> Result<FusionResult, RunFusionError> {
        info!("Phase 1: Fan-out to {} models", request.targets().len());
        let references = self.dispatch.execute_with_progress(request, progress).await?;

        info!("Phase 2: Aggregation with {}", request.aggregator());
        let mut stream = self
            .aggregate
            .execute(&references, request.instructions(), request.aggregator())
            .await?;

        progress.on_aggregate_start(request.aggregator());
        let outcome = self.consume(&mut stream, progress).await;
        progress.on_aggregate_end(stream.session());
        outcome?;

        Ok(FusionResult::new(
            request.prompt(),
            references,
            request.aggregator().clone(),
            stream.into_session().into_text(),
        ))
    }

    /// Pull fragments until the stream ends, forwarding each to `progress`
    async fn consume(
        &self,
        stream: &mut AggregateStream,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), AggregateError> {
        loop {
            let next = match &self.cancellation_token {
                Some(token) => tokio::select! {
                    biased;
                    _ = token.cancelled() => None,
                    next = stream.next_fragment() => Some(next),
                },
                None => Some(stream.next_fragment().await),
            };

            match next {
                None => {
                    stream.close();
                    info!("Aggregation cancelled");
                    return Err(AggregateError::Cancelled {
                        partial: stream.accumulated_text().to_string(),
                    });
                }
                Some(Ok(Some(fragment))) => {
                    progress.on_aggregate_chunk(&fragment, stream.accumulated_text());
                }
                Some(Ok(None)) => return Ok(()),
                Some(Err(e)) => return Err(e),
            }
        }
    }
}
