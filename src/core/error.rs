//! Error types for dispatch operations.

use thiserror::Error;

use crate::core::job::JobId;
use crate::core::provider::ProviderId;

/// Errors produced by the matching and transaction components.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Referenced job does not exist.
    #[error("job not found: {0}")]
    JobNotFound(JobId),
    /// Referenced provider does not exist.
    #[error("provider not found: {0}")]
    ProviderNotFound(ProviderId),
    /// Job is not in the status the operation requires.
    #[error("job {id} is {status}, expected {expected}")]
    InvalidJobStatus {
        /// Offending job.
        id: JobId,
        /// Status the job is actually in.
        status: String,
        /// Status the operation required.
        expected: String,
    },
    /// Job was already completed; completing again is a no-op violation.
    #[error("job {0} is already completed")]
    AlreadyCompleted(JobId),
    /// Provider holds an active job and cannot be toggled or re-assigned.
    #[error("provider {0} has an active job")]
    ProviderBusy(ProviderId),
    /// Rating outside the accepted 1..=5 range.
    #[error("rating {0} out of range (1-5)")]
    InvalidRating(u8),
    /// A unit-of-work commit found a record changed since it was read.
    /// The transaction was rolled back; nothing was written.
    #[error("transaction conflict: {0}")]
    Conflict(String),
    /// Backend-specific failure with context. Retryable by the caller.
    #[error("store error: {0}")]
    Store(String),
}

impl DispatchError {
    /// Whether the caller may retry the operation as-is.
    ///
    /// Conflicts are deliberately *not* retryable here: a lost assignment
    /// race leaves the job pending for the next dispatch cycle, and retry
    /// policy belongs to the caller.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_store_errors_are_retryable() {
        assert!(DispatchError::Store("connection reset".into()).is_retryable());
        assert!(!DispatchError::Conflict("provider claimed".into()).is_retryable());
        assert!(!DispatchError::InvalidRating(9).is_retryable());
    }

    #[test]
    fn messages_carry_context() {
        let id = JobId::new();
        let err = DispatchError::InvalidJobStatus {
            id,
            status: "completed".into(),
            expected: "pending".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("completed"));
        assert!(msg.contains("pending"));
    }
}
