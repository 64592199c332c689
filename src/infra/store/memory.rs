//! In-memory store with optimistic, versioned transactions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::core::error::DispatchError;
use crate::core::job::{Job, JobId, JobStatus};
use crate::core::provider::{Provider, ProviderId};
use crate::core::repository::{DispatchStore, JobStore, ProviderDirectory, UnitOfWork};
use crate::util::clock::TimestampMs;

/// A record plus its commit version. Versions bump on every applied write;
/// a unit of work re-checks them at commit time to detect lost races.
#[derive(Debug, Clone)]
struct Versioned<T> {
    record: T,
    version: u64,
}

#[derive(Default)]
struct State {
    jobs: HashMap<JobId, Versioned<Job>>,
    providers: HashMap<ProviderId, Versioned<Provider>>,
}

/// In-memory job/provider store for development and tests.
///
/// All reads and writes take the lock briefly; nothing holds it across an
/// await point. Concurrency control is optimistic: transactions conflict at
/// commit, not at read.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a provider directly, bypassing transactions. Seeding only.
    pub fn seed_provider(&self, provider: Provider) {
        self.state.write().providers.insert(
            provider.id,
            Versioned {
                record: provider,
                version: 0,
            },
        );
    }

    /// Insert a job directly, bypassing transactions. Seeding only.
    pub fn seed_job(&self, job: Job) {
        self.state.write().jobs.insert(
            job.id,
            Versioned {
                record: job,
                version: 0,
            },
        );
    }

    /// Mutate a job in place without conflict checks. Test setup only; the
    /// engine itself always goes through a unit of work.
    pub fn update_job_unchecked(&self, id: JobId, f: impl FnOnce(&mut Job)) {
        let mut state = self.state.write();
        if let Some(v) = state.jobs.get_mut(&id) {
            f(&mut v.record);
            v.version += 1;
        }
    }
}

#[async_trait]
impl ProviderDirectory for InMemoryStore {
    async fn provider(&self, id: ProviderId) -> Result<Option<Provider>, DispatchError> {
        Ok(self
            .state
            .read()
            .providers
            .get(&id)
            .map(|v| v.record.clone()))
    }

    async fn find_matchable(&self, service_type: &str) -> Result<Vec<Provider>, DispatchError> {
        let mut matchable: Vec<Provider> = self
            .state
            .read()
            .providers
            .values()
            .map(|v| &v.record)
            .filter(|p| p.is_matchable(service_type))
            .cloned()
            .collect();
        // Stable sort keeps store order for exact ties.
        matchable.sort_by(|a, b| {
            b.rating
                .total_cmp(&a.rating)
                .then(b.total_jobs_completed.cmp(&a.total_jobs_completed))
        });
        Ok(matchable)
    }

    async fn find_busy(&self, service_type: &str) -> Result<Vec<Provider>, DispatchError> {
        Ok(self
            .state
            .read()
            .providers
            .values()
            .map(|v| &v.record)
            .filter(|p| p.approved && !p.is_available && p.has_skill(service_type))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl JobStore for InMemoryStore {
    async fn job(&self, id: JobId) -> Result<Option<Job>, DispatchError> {
        Ok(self.state.read().jobs.get(&id).map(|v| v.record.clone()))
    }

    async fn insert_job(&self, job: Job) -> Result<(), DispatchError> {
        self.seed_job(job);
        Ok(())
    }

    async fn active_job_for(&self, provider: ProviderId) -> Result<Option<Job>, DispatchError> {
        Ok(self
            .state
            .read()
            .jobs
            .values()
            .map(|v| &v.record)
            .find(|j| j.accepted_by == Some(provider) && j.is_active())
            .cloned())
    }

    async fn oldest_pending(&self, service_type: &str) -> Result<Option<Job>, DispatchError> {
        Ok(self
            .state
            .read()
            .jobs
            .values()
            .map(|v| &v.record)
            .filter(|j| j.status == JobStatus::Pending && j.service_type == service_type)
            .min_by_key(|j| j.created_at_ms)
            .cloned())
    }

    async fn rated_jobs_for(&self, provider: ProviderId) -> Result<Vec<Job>, DispatchError> {
        Ok(self
            .state
            .read()
            .jobs
            .values()
            .map(|v| &v.record)
            .filter(|j| j.accepted_by == Some(provider) && j.rating.is_some())
            .cloned()
            .collect())
    }

    async fn set_queue_estimate(
        &self,
        id: JobId,
        estimated_start_ms: TimestampMs,
        estimated_completion_ms: TimestampMs,
    ) -> Result<Job, DispatchError> {
        let mut state = self.state.write();
        let entry = state
            .jobs
            .get_mut(&id)
            .ok_or(DispatchError::JobNotFound(id))?;
        entry.record.estimated_start_ms = Some(estimated_start_ms);
        entry.record.estimated_completion_ms = Some(estimated_completion_ms);
        entry.version += 1;
        Ok(entry.record.clone())
    }
}

#[async_trait]
impl DispatchStore for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DispatchError> {
        Ok(Box::new(MemoryUnitOfWork {
            state: Arc::clone(&self.state),
            job_reads: HashMap::new(),
            provider_reads: HashMap::new(),
            staged_jobs: Vec::new(),
            staged_providers: Vec::new(),
        }))
    }
}

/// Optimistic transaction over the shared state.
struct MemoryUnitOfWork {
    state: Arc<RwLock<State>>,
    job_reads: HashMap<JobId, u64>,
    provider_reads: HashMap<ProviderId, u64>,
    staged_jobs: Vec<Job>,
    staged_providers: Vec<Provider>,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn job(&mut self, id: JobId) -> Result<Job, DispatchError> {
        let state = self.state.read();
        let v = state.jobs.get(&id).ok_or(DispatchError::JobNotFound(id))?;
        self.job_reads.insert(id, v.version);
        Ok(v.record.clone())
    }

    async fn provider(&mut self, id: ProviderId) -> Result<Provider, DispatchError> {
        let state = self.state.read();
        let v = state
            .providers
            .get(&id)
            .ok_or(DispatchError::ProviderNotFound(id))?;
        self.provider_reads.insert(id, v.version);
        Ok(v.record.clone())
    }

    fn stage_job(&mut self, job: Job) {
        self.staged_jobs.push(job);
    }

    fn stage_provider(&mut self, provider: Provider) {
        self.staged_providers.push(provider);
    }

    async fn commit(self: Box<Self>) -> Result<(), DispatchError> {
        let mut state = self.state.write();

        // Re-validate every record read in this transaction before touching
        // anything, so a conflict leaves the store exactly as it was.
        for (id, read_version) in &self.job_reads {
            let current = state
                .jobs
                .get(id)
                .ok_or(DispatchError::JobNotFound(*id))?
                .version;
            if current != *read_version {
                return Err(DispatchError::Conflict(format!(
                    "job {id} changed since read"
                )));
            }
        }
        for (id, read_version) in &self.provider_reads {
            let current = state
                .providers
                .get(id)
                .ok_or(DispatchError::ProviderNotFound(*id))?
                .version;
            if current != *read_version {
                return Err(DispatchError::Conflict(format!(
                    "provider {id} changed since read"
                )));
            }
        }

        for job in self.staged_jobs {
            let entry = state
                .jobs
                .entry(job.id)
                .or_insert_with(|| Versioned {
                    record: job.clone(),
                    version: 0,
                });
            entry.record = job;
            entry.version += 1;
        }
        for provider in self.staged_providers {
            let entry = state
                .providers
                .entry(provider.id)
                .or_insert_with(|| Versioned {
                    record: provider.clone(),
                    version: 0,
                });
            entry.record = provider;
            entry.version += 1;
        }
        Ok(())
    }
}
