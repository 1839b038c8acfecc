//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted while assembling a study plan.
///
/// A partial curriculum is never returned: if any content fetch fails, the
/// whole assembly fails.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlanError {
    #[error("content aggregation failed: {0}")]
    Aggregation(#[source] StorageError),
}

/// Errors emitted while reconciling progress.
///
/// On either variant the previously persisted record is untouched; the
/// upsert is all-or-nothing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    #[error("progress read failed: {0}")]
    Progress(#[source] StorageError),

    #[error("progress write failed: {0}")]
    Persist(#[source] StorageError),
}
