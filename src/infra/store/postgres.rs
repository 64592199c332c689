//! Postgres-backed store adapter (schema and interface stubs).

use async_trait::async_trait;

use crate::core::error::DispatchError;
use crate::core::job::{Job, JobId};
use crate::core::provider::{Provider, ProviderId};
use crate::core::repository::{DispatchStore, JobStore, ProviderDirectory, UnitOfWork};
use crate::util::clock::TimestampMs;

/// Postgres store adapter placeholder. Carries the schema; actual I/O
/// requires a database client and is left to the integration layer.
pub struct PostgresStore {
    connection_string: String,
}

impl PostgresStore {
    /// Create an adapter for the given connection string.
    #[must_use]
    pub const fn new(connection_string: String) -> Self {
        Self { connection_string }
    }

    /// The configured connection string.
    #[must_use]
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Migration statements for the job and provider tables. Row versions
    /// back the unit-of-work conflict checks.
    pub fn migrations() -> &'static [&'static str] {
        &[
            r#"
CREATE TABLE IF NOT EXISTS jd_providers (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    phone TEXT NOT NULL,
    profession TEXT NOT NULL,
    skills TEXT[] NOT NULL DEFAULT '{}',
    approved BOOLEAN NOT NULL DEFAULT FALSE,
    is_available BOOLEAN NOT NULL DEFAULT FALSE,
    current_job UUID,
    rating REAL NOT NULL DEFAULT 0,
    total_jobs_completed INT NOT NULL DEFAULT 0,
    average_completion_minutes INT NOT NULL DEFAULT 60,
    row_version BIGINT NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_jd_providers_matchable ON jd_providers (approved, is_available);
CREATE INDEX IF NOT EXISTS idx_jd_providers_skills ON jd_providers USING GIN (skills);
"#,
            r#"
CREATE TABLE IF NOT EXISTS jd_jobs (
    id UUID PRIMARY KEY,
    service_type TEXT NOT NULL,
    location TEXT NOT NULL,
    description TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    priority TEXT NOT NULL DEFAULT 'medium',
    requested_by UUID NOT NULL,
    accepted_by UUID REFERENCES jd_providers (id),
    estimated_start_ms BIGINT,
    estimated_completion_ms BIGINT,
    actual_start_ms BIGINT,
    actual_completion_ms BIGINT,
    duration_minutes INT,
    cost DOUBLE PRECISION,
    rating SMALLINT,
    review TEXT,
    created_at_ms BIGINT NOT NULL,
    row_version BIGINT NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_jd_jobs_service_status ON jd_jobs (service_type, status, created_at_ms);
CREATE INDEX IF NOT EXISTS idx_jd_jobs_accepted_by ON jd_jobs (accepted_by);
"#,
        ]
    }

    fn unwired<T>() -> Result<T, DispatchError> {
        Err(DispatchError::Store(
            "postgres store not wired to database client".into(),
        ))
    }
}

#[async_trait]
impl ProviderDirectory for PostgresStore {
    async fn provider(&self, _id: ProviderId) -> Result<Option<Provider>, DispatchError> {
        Self::unwired()
    }

    async fn find_matchable(&self, _service_type: &str) -> Result<Vec<Provider>, DispatchError> {
        Self::unwired()
    }

    async fn find_busy(&self, _service_type: &str) -> Result<Vec<Provider>, DispatchError> {
        Self::unwired()
    }
}

#[async_trait]
impl JobStore for PostgresStore {
    async fn job(&self, _id: JobId) -> Result<Option<Job>, DispatchError> {
        Self::unwired()
    }

    async fn insert_job(&self, _job: Job) -> Result<(), DispatchError> {
        Self::unwired()
    }

    async fn active_job_for(&self, _provider: ProviderId) -> Result<Option<Job>, DispatchError> {
        Self::unwired()
    }

    async fn oldest_pending(&self, _service_type: &str) -> Result<Option<Job>, DispatchError> {
        Self::unwired()
    }

    async fn rated_jobs_for(&self, _provider: ProviderId) -> Result<Vec<Job>, DispatchError> {
        Self::unwired()
    }

    async fn set_queue_estimate(
        &self,
        _id: JobId,
        _estimated_start_ms: TimestampMs,
        _estimated_completion_ms: TimestampMs,
    ) -> Result<Job, DispatchError> {
        Self::unwired()
    }
}

#[async_trait]
impl DispatchStore for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, DispatchError> {
        Self::unwired()
    }
}
