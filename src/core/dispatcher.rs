//! Dispatch façade: assignment and completion transactions plus cascade.

use std::future::Future;
use std::sync::Arc;

use crate::core::error::DispatchError;
use crate::core::job::{Job, JobId, JobStatus};
use crate::core::matcher::{select_provider, Selection};
use crate::core::notify::{NotificationEvent, Notifier};
use crate::core::provider::{Provider, ProviderId, ProviderSummary};
use crate::core::repository::DispatchStore;
use crate::util::clock::{minutes_to_ms, now_ms, TimestampMs};

/// Abstraction for spawning the post-completion cascade task on a runtime.
pub trait Spawn {
    /// Spawn an async task that returns a future.
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Knobs for the dispatch and cascade behavior.
#[derive(Debug, Clone)]
pub struct DispatchPolicy {
    /// Default job duration in minutes, used for the assignment completion
    /// estimate when no estimator value is present.
    pub default_job_minutes: u32,
    /// Upper bound on dispatches attempted by one cascade task.
    pub max_cascade_dispatches: usize,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            default_job_minutes: 60,
            max_cascade_dispatches: 8,
        }
    }
}

/// Result of one dispatch attempt.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// A provider was claimed and the pair committed.
    Assigned {
        /// The job, post-commit.
        job: Job,
        /// Summary of the assigned provider.
        provider: ProviderSummary,
    },
    /// Nobody is free; the job stays pending with a persisted wait estimate.
    Queued {
        /// Whole minutes until the earliest busy provider frees up.
        wait_minutes: i64,
        /// Number of busy candidates considered.
        queue_position: usize,
        /// The earliest-available provider.
        next_available: ProviderId,
        /// Their estimated-free timestamp.
        available_at_ms: TimestampMs,
    },
    /// No approved provider carries the skill; the job stays pending with
    /// no wait estimate.
    NoEligibleProviders,
    /// The selected provider was claimed concurrently before commit. The
    /// job stays pending; the engine never retries on its own.
    LostRace,
}

/// Orchestration entry point composing the matcher with the assignment and
/// completion transactions.
///
/// One instance is shared by all request-handling tasks; coordination
/// happens entirely through the store's commit-time conflict checks, never
/// through in-process locks held across store calls.
pub struct Dispatcher<S, N, R> {
    store: Arc<S>,
    notifier: Arc<N>,
    spawner: R,
    policy: DispatchPolicy,
}

impl<S, N, R: Clone> Clone for Dispatcher<S, N, R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier: Arc::clone(&self.notifier),
            spawner: self.spawner.clone(),
            policy: self.policy.clone(),
        }
    }
}

impl<S, N, R> Dispatcher<S, N, R>
where
    S: DispatchStore + 'static,
    N: Notifier + 'static,
    R: Spawn + Clone + Send + Sync + 'static,
{
    /// Create a dispatcher over a store, a notification sink, and a spawner
    /// for cascade tasks.
    pub const fn new(store: Arc<S>, notifier: Arc<N>, spawner: R, policy: DispatchPolicy) -> Self {
        Self {
            store,
            notifier,
            spawner,
            policy,
        }
    }

    /// Attempt to match and assign a pending job.
    ///
    /// Immediate match → assignment transaction. No free provider but busy
    /// candidates → persist the wait estimate on the job and report queue
    /// standing. No candidates at all → `NoEligibleProviders`. A provider
    /// claimed between selection and commit → `LostRace`.
    pub async fn dispatch(
        &self,
        job_id: JobId,
        service_type: &str,
    ) -> Result<DispatchOutcome, DispatchError> {
        let now = now_ms();
        let selection = select_provider(&*self.store, &*self.store, service_type, now).await?;

        match selection {
            Selection::Available(provider) => self.try_assign(job_id, provider.id, now).await,
            Selection::Busy(ref candidates) => {
                let wait_minutes = selection.wait_minutes(now).unwrap_or(0);
                let earliest = candidates.first().ok_or_else(|| {
                    DispatchError::Store("busy selection without candidates".into())
                })?;
                let start = earliest.available_at_ms;
                let completion =
                    start + minutes_to_ms(earliest.provider.average_completion_minutes);
                self.store
                    .set_queue_estimate(job_id, start, completion)
                    .await?;
                tracing::info!(
                    job = %job_id,
                    service_type,
                    wait_minutes,
                    "no free provider, job queued"
                );
                Ok(DispatchOutcome::Queued {
                    wait_minutes,
                    queue_position: candidates.len(),
                    next_available: earliest.provider.id,
                    available_at_ms: start,
                })
            }
            Selection::NoneEligible => {
                // Make sure the caller referenced a real job before reporting
                // a normal queued-without-eta outcome.
                self.store
                    .job(job_id)
                    .await?
                    .ok_or(DispatchError::JobNotFound(job_id))?;
                tracing::info!(job = %job_id, service_type, "no eligible providers");
                Ok(DispatchOutcome::NoEligibleProviders)
            }
        }
    }

    /// Assignment transaction: bind the job/provider pair atomically.
    ///
    /// Preconditions are re-validated inside the unit of work since time has
    /// passed between selection and commit; a commit conflict means another
    /// assignment won the provider and is reported as `LostRace`, never as a
    /// fatal error.
    async fn try_assign(
        &self,
        job_id: JobId,
        provider_id: ProviderId,
        now: TimestampMs,
    ) -> Result<DispatchOutcome, DispatchError> {
        let mut uow = self.store.begin().await?;

        let mut job = uow.job(job_id).await?;
        if job.status != JobStatus::Pending {
            return Err(DispatchError::InvalidJobStatus {
                id: job_id,
                status: job.status.to_string(),
                expected: JobStatus::Pending.to_string(),
            });
        }

        let mut provider = uow.provider(provider_id).await?;
        if !provider.approved || !provider.is_available || provider.current_job.is_some() {
            tracing::debug!(provider = %provider_id, "provider claimed between selection and commit");
            return Ok(DispatchOutcome::LostRace);
        }

        job.status = JobStatus::Accepted;
        job.accepted_by = Some(provider_id);
        job.estimated_start_ms = Some(now);
        if job.estimated_completion_ms.is_none() {
            job.estimated_completion_ms = Some(now + minutes_to_ms(self.policy.default_job_minutes));
        }
        provider.is_available = false;
        provider.current_job = Some(job_id);

        uow.stage_job(job.clone());
        uow.stage_provider(provider.clone());

        match uow.commit().await {
            Ok(()) => {
                tracing::info!(job = %job_id, provider = %provider_id, "provider assigned");
                self.notify(NotificationEvent::assigned(&provider, &job)).await;
                self.notify(NotificationEvent::status_changed(&job, Some(&provider.name)))
                    .await;
                Ok(DispatchOutcome::Assigned {
                    job,
                    provider: ProviderSummary::from(&provider),
                })
            }
            Err(DispatchError::Conflict(reason)) => {
                tracing::debug!(job = %job_id, provider = %provider_id, reason, "assignment lost race");
                Ok(DispatchOutcome::LostRace)
            }
            Err(e) => Err(e),
        }
    }

    /// Completion transaction: close the job, free its provider, fold the
    /// duration into the rolling stats, then trigger the cascade.
    pub async fn complete(&self, job_id: JobId) -> Result<Job, DispatchError> {
        let now = now_ms();
        let mut uow = self.store.begin().await?;

        let mut job = uow.job(job_id).await?;
        if job.status == JobStatus::Completed {
            return Err(DispatchError::AlreadyCompleted(job_id));
        }

        job.status = JobStatus::Completed;
        job.actual_completion_ms = Some(now);

        let mut provider_name = None;
        if let Some(provider_id) = job.accepted_by {
            let mut provider = uow.provider(provider_id).await?;
            provider.is_available = true;
            provider.current_job = None;
            // Fold before incrementing: the formula divides by the *new*
            // count but weights the old average by the old count. Unknown
            // durations are skipped, never divided in.
            if let Some(duration) = job.duration_minutes {
                provider.average_completion_minutes = provider.folded_average(duration);
            }
            provider.total_jobs_completed += 1;
            provider_name = Some(provider.name.clone());
            uow.stage_provider(provider);
        }
        uow.stage_job(job.clone());
        uow.commit().await?;

        tracing::info!(job = %job_id, service_type = %job.service_type, "job completed");

        // The completion is durably committed; everything below is
        // best-effort and must not surface failures.
        self.notify(NotificationEvent::status_changed(&job, provider_name.as_deref()))
            .await;
        self.spawn_cascade(job.service_type.clone());

        Ok(job)
    }

    /// Recompute a provider's rating as the one-decimal mean of all their
    /// rating-bearing jobs. A provider with no rated jobs keeps their
    /// current rating.
    pub async fn recompute_rating(&self, provider_id: ProviderId) -> Result<f32, DispatchError> {
        let rated = self.store.rated_jobs_for(provider_id).await?;

        let mut uow = self.store.begin().await?;
        let mut provider = uow.provider(provider_id).await?;
        if rated.is_empty() {
            return Ok(provider.rating);
        }

        let sum: f64 = rated.iter().filter_map(|j| j.rating).map(f64::from).sum();
        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        let mean = ((sum / rated.len() as f64) * 10.0).round() / 10.0;
        #[allow(clippy::cast_possible_truncation)]
        let rating = mean as f32;

        provider.rating = rating;
        uow.stage_provider(provider);
        uow.commit().await?;
        Ok(rating)
    }

    /// Move an accepted job to in-progress, stamping the actual start time.
    pub async fn start(&self, job_id: JobId) -> Result<Job, DispatchError> {
        let mut uow = self.store.begin().await?;
        let mut job = uow.job(job_id).await?;
        if job.status != JobStatus::Accepted {
            return Err(DispatchError::InvalidJobStatus {
                id: job_id,
                status: job.status.to_string(),
                expected: JobStatus::Accepted.to_string(),
            });
        }
        job.status = JobStatus::InProgress;
        if job.actual_start_ms.is_none() {
            job.actual_start_ms = Some(now_ms());
        }
        uow.stage_job(job.clone());
        uow.commit().await?;

        let provider_name = self.provider_name(job.accepted_by).await;
        self.notify(NotificationEvent::status_changed(&job, provider_name.as_deref()))
            .await;
        Ok(job)
    }

    /// Record duration and/or cost on an active job, ahead of completion.
    pub async fn update_progress(
        &self,
        job_id: JobId,
        duration_minutes: Option<u32>,
        cost: Option<f64>,
    ) -> Result<Job, DispatchError> {
        let mut uow = self.store.begin().await?;
        let mut job = uow.job(job_id).await?;
        if !job.is_active() {
            return Err(DispatchError::InvalidJobStatus {
                id: job_id,
                status: job.status.to_string(),
                expected: "accepted or in-progress".into(),
            });
        }
        if let Some(d) = duration_minutes {
            job.duration_minutes = Some(d);
        }
        if let Some(c) = cost {
            job.cost = Some(c);
        }
        uow.stage_job(job.clone());
        uow.commit().await?;
        Ok(job)
    }

    /// Attach a 1–5 rating (and optional review) to a completed job, then
    /// recompute the provider's running rating. Recompute failures are
    /// isolated: the rating on the job still stands.
    pub async fn add_rating(
        &self,
        job_id: JobId,
        rating: u8,
        review: Option<String>,
    ) -> Result<Job, DispatchError> {
        if !(1..=5).contains(&rating) {
            return Err(DispatchError::InvalidRating(rating));
        }

        let mut uow = self.store.begin().await?;
        let mut job = uow.job(job_id).await?;
        if job.status != JobStatus::Completed {
            return Err(DispatchError::InvalidJobStatus {
                id: job_id,
                status: job.status.to_string(),
                expected: JobStatus::Completed.to_string(),
            });
        }
        job.rating = Some(rating);
        job.review = review;
        uow.stage_job(job.clone());
        uow.commit().await?;

        if let Some(provider_id) = job.accepted_by {
            if let Err(e) = self.recompute_rating(provider_id).await {
                tracing::warn!(provider = %provider_id, error = %e, "rating recompute failed");
            }
        }
        Ok(job)
    }

    /// Manual availability toggle, for a provider between jobs. Rejected
    /// whenever a current job is held; the transactions own that flag while
    /// work is in flight.
    pub async fn set_availability(
        &self,
        provider_id: ProviderId,
        available: bool,
    ) -> Result<Provider, DispatchError> {
        let mut uow = self.store.begin().await?;
        let mut provider = uow.provider(provider_id).await?;
        if provider.current_job.is_some() {
            return Err(DispatchError::ProviderBusy(provider_id));
        }
        provider.is_available = available;
        uow.stage_provider(provider.clone());
        uow.commit().await?;
        Ok(provider)
    }

    /// Enqueue the post-completion cascade as a detached task.
    fn spawn_cascade(&self, service_type: String) {
        let engine = self.clone();
        self.spawner.spawn(async move {
            engine.run_cascade(&service_type).await;
        });
    }

    /// Drain the backlog for one service tag: re-dispatch the oldest pending
    /// job, and keep going while assignments land, up to the policy bound.
    /// Failures are logged and swallowed; the completion that triggered the
    /// cascade has already committed.
    async fn run_cascade(&self, service_type: &str) {
        for _ in 0..self.policy.max_cascade_dispatches {
            let next = match self.store.oldest_pending(service_type).await {
                Ok(Some(job)) => job,
                Ok(None) => return,
                Err(e) => {
                    tracing::warn!(service_type, error = %e, "cascade backlog lookup failed");
                    return;
                }
            };
            match self.dispatch(next.id, service_type).await {
                Ok(DispatchOutcome::Assigned { .. }) => {
                    tracing::info!(job = %next.id, service_type, "cascade assigned queued job");
                }
                Ok(_) => return,
                Err(e) => {
                    tracing::warn!(job = %next.id, service_type, error = %e, "cascade dispatch failed");
                    return;
                }
            }
        }
        tracing::debug!(service_type, "cascade bound reached, remaining backlog left queued");
    }

    async fn notify(&self, event: NotificationEvent) {
        if let Err(e) = self.notifier.send(event).await {
            tracing::warn!(error = %e, "notification send failed");
        }
    }

    async fn provider_name(&self, id: Option<ProviderId>) -> Option<String> {
        let id = id?;
        match self.store.provider(id).await {
            Ok(p) => p.map(|p| p.name),
            Err(_) => None,
        }
    }
}
