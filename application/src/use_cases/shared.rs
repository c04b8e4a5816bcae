//! Shared utilities for use cases.

use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
pub(crate) fn is_cancelled(token: &Option<CancellationToken>) -> bool {
    token.as_ref().is_some_and(CancellationToken::is_cancelled)
}
