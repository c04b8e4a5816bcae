//! Progress notification port
//!
//! Defines the interface through which the engine reports outcomes to the
//! presentation layer while a run is in flight.

use fusion_domain::{AggregateSession, FanOutResult, Model};

/// Callback for progress updates during a fusion run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console, web UI, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called once before any target call is issued
    fn on_dispatch_start(&self, targets: &[Model]);

    /// Called as each target settles, in completion order
    fn on_target_complete(&self, result: &FanOutResult);

    /// Called once every target has settled, with results in target order
    fn on_dispatch_complete(&self, results: &[FanOutResult]);

    // ==================== Aggregation Stream Callbacks ====================

    /// Called when the synthesis stream has been opened.
    fn on_aggregate_start(&self, _model: &Model) {}

    /// Called for each fragment, with the text accumulated so far.
    fn on_aggregate_chunk(&self, _chunk: &str, _accumulated: &str) {}

    /// Called when the synthesis stream ends, whatever the outcome.
    fn on_aggregate_end(&self, _session: &AggregateSession) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_dispatch_start(&self, _targets: &[Model]) {}
    fn on_target_complete(&self, _result: &FanOutResult) {}
    fn on_dispatch_complete(&self, _results: &[FanOutResult]) {}
}
