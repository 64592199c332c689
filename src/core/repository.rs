//! Repository and unit-of-work seams between the engine and its stores.
//!
//! The engine never owns storage. Selection queries go through
//! [`ProviderDirectory`] and [`JobStore`]; every mutation of job status,
//! assignment pointers, or provider stats goes through a [`UnitOfWork`]
//! obtained from [`DispatchStore::begin`], committed all-or-nothing.

use async_trait::async_trait;

use crate::core::error::DispatchError;
use crate::core::job::{Job, JobId};
use crate::core::provider::{Provider, ProviderId};
use crate::util::clock::TimestampMs;

/// Read access to provider identity, skills, and availability.
#[async_trait]
pub trait ProviderDirectory: Send + Sync {
    /// Fetch a provider by id.
    async fn provider(&self, id: ProviderId) -> Result<Option<Provider>, DispatchError>;

    /// Providers that are approved, available, and skilled for the tag,
    /// sorted by rating descending then completed-job count descending.
    /// The sort must be stable so exact ties keep store order.
    async fn find_matchable(&self, service_type: &str) -> Result<Vec<Provider>, DispatchError>;

    /// Approved providers skilled for the tag but currently unavailable.
    async fn find_busy(&self, service_type: &str) -> Result<Vec<Provider>, DispatchError>;
}

/// Read/create access to job records.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Fetch a job by id.
    async fn job(&self, id: JobId) -> Result<Option<Job>, DispatchError>;

    /// Persist a new job record.
    async fn insert_job(&self, job: Job) -> Result<(), DispatchError>;

    /// The accepted/in-progress job held by a provider, if any.
    async fn active_job_for(&self, provider: ProviderId) -> Result<Option<Job>, DispatchError>;

    /// Oldest still-pending job for a service tag, by creation time.
    async fn oldest_pending(&self, service_type: &str) -> Result<Option<Job>, DispatchError>;

    /// All rating-bearing jobs ever assigned to a provider.
    async fn rated_jobs_for(&self, provider: ProviderId) -> Result<Vec<Job>, DispatchError>;

    /// Persist queue-wait estimates on a pending job and return the updated
    /// record. Estimates are advisory, so this write sits outside the
    /// unit-of-work conflict checks.
    async fn set_queue_estimate(
        &self,
        id: JobId,
        estimated_start_ms: TimestampMs,
        estimated_completion_ms: TimestampMs,
    ) -> Result<Job, DispatchError>;
}

/// A transaction covering one assignment, completion, or stats update.
///
/// Reads record the version of everything fetched; `commit` re-checks those
/// versions under the store's write lock and aborts with
/// [`DispatchError::Conflict`] if any record changed since it was read.
/// Dropping a unit of work without committing discards all staged writes.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Read a job inside the transaction. Fails with `JobNotFound`.
    async fn job(&mut self, id: JobId) -> Result<Job, DispatchError>;

    /// Read a provider inside the transaction. Fails with `ProviderNotFound`.
    async fn provider(&mut self, id: ProviderId) -> Result<Provider, DispatchError>;

    /// Stage a job write. The job must have been read in this transaction.
    fn stage_job(&mut self, job: Job);

    /// Stage a provider write. The provider must have been read in this
    /// transaction.
    fn stage_provider(&mut self, provider: Provider);

    /// Apply all staged writes atomically, or nothing on conflict.
    async fn commit(self: Box<Self>) -> Result<(), DispatchError>;
}

/// A store that can open transactions over jobs and providers together.
#[async_trait]
pub trait DispatchStore: ProviderDirectory + JobStore {
    /// Open a unit of work spanning both record types.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DispatchError>;
}
