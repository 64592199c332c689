//! Best-provider selection and busy-candidate ranking.

use crate::core::error::DispatchError;
use crate::core::estimator::estimate_free;
use crate::core::provider::Provider;
use crate::core::repository::{JobStore, ProviderDirectory};
use crate::util::clock::{minutes_between, TimestampMs};

/// A busy provider ranked by when they are expected to come free.
#[derive(Debug, Clone)]
pub struct BusyCandidate {
    /// The busy provider.
    pub provider: Provider,
    /// Estimated-free timestamp from the availability estimator.
    pub available_at_ms: TimestampMs,
}

/// Result of a selection pass for one service tag.
#[derive(Debug)]
pub enum Selection {
    /// An approved, available, skilled provider, the best by
    /// (rating desc, completed desc).
    Available(Provider),
    /// Nobody is free, but skilled providers exist. Candidates are sorted
    /// ascending by estimated-free time; the head is the earliest.
    Busy(Vec<BusyCandidate>),
    /// No approved provider carries this skill at all.
    NoneEligible,
}

impl Selection {
    /// Wait until the earliest busy candidate frees up, in whole minutes,
    /// clamped at zero. `None` for the other variants.
    #[must_use]
    pub fn wait_minutes(&self, now_ms: TimestampMs) -> Option<i64> {
        match self {
            Self::Busy(candidates) => candidates
                .first()
                .map(|c| minutes_between(now_ms, c.available_at_ms)),
            _ => None,
        }
    }
}

/// Select the best provider for a service tag.
///
/// Pure selection: reads the directory and job store, never writes. Callers
/// persist any wait estimate and perform the actual claim in a transaction,
/// re-validating availability at commit time, since time passes between
/// selection and commit.
pub async fn select_provider(
    directory: &dyn ProviderDirectory,
    jobs: &dyn JobStore,
    service_type: &str,
    now_ms: TimestampMs,
) -> Result<Selection, DispatchError> {
    let mut available = directory.find_matchable(service_type).await?;
    if !available.is_empty() {
        return Ok(Selection::Available(available.remove(0)));
    }

    let busy = directory.find_busy(service_type).await?;
    if busy.is_empty() {
        tracing::debug!(service_type, "no eligible providers");
        return Ok(Selection::NoneEligible);
    }

    let mut candidates = Vec::with_capacity(busy.len());
    for provider in busy {
        let available_at_ms = estimate_free(jobs, &provider, now_ms).await?;
        candidates.push(BusyCandidate {
            provider,
            available_at_ms,
        });
    }
    candidates.sort_by_key(|c| c.available_at_ms);

    Ok(Selection::Busy(candidates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::job::{Job, JobStatus, Priority, RequesterId};
    use crate::infra::store::InMemoryStore;
    use crate::util::clock::{now_ms, MINUTE_MS};
    use uuid::Uuid;

    fn provider(name: &str, rating: f32, completed: u32, available: bool) -> Provider {
        let mut p = Provider::new(name, "555-0000", "plumber", vec!["plumbing".into()]);
        p.approved = true;
        p.is_available = available;
        p.rating = rating;
        p.total_jobs_completed = completed;
        p
    }

    fn bind_active_job(store: &InMemoryStore, p: &mut Provider, eta_ms: Option<i64>) {
        let mut job = Job::new(
            "plumbing",
            "9 Dock Ln",
            "clogged drain",
            Priority::Medium,
            RequesterId(Uuid::new_v4()),
        );
        job.status = JobStatus::Accepted;
        job.accepted_by = Some(p.id);
        job.estimated_completion_ms = eta_ms;
        p.current_job = Some(job.id);
        p.is_available = false;
        store.seed_job(job);
    }

    #[tokio::test]
    async fn picks_highest_rating_first() {
        let store = InMemoryStore::new();
        store.seed_provider(provider("Quin", 4.0, 50, true));
        let best = provider("Pat", 4.5, 10, true);
        let best_id = best.id;
        store.seed_provider(best);

        let sel = select_provider(&store, &store, "plumbing", now_ms())
            .await
            .unwrap();
        match sel {
            Selection::Available(p) => assert_eq!(p.id, best_id),
            other => panic!("expected Available, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn completion_count_breaks_rating_ties() {
        let store = InMemoryStore::new();
        store.seed_provider(provider("Lee", 4.5, 3, true));
        let veteran = provider("Vic", 4.5, 40, true);
        let veteran_id = veteran.id;
        store.seed_provider(veteran);

        let sel = select_provider(&store, &store, "plumbing", now_ms())
            .await
            .unwrap();
        match sel {
            Selection::Available(p) => assert_eq!(p.id, veteran_id),
            other => panic!("expected Available, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_skill_reports_none_eligible() {
        let store = InMemoryStore::new();
        store.seed_provider(provider("Sol", 5.0, 12, true));

        let sel = select_provider(&store, &store, "welding", now_ms())
            .await
            .unwrap();
        assert!(matches!(sel, Selection::NoneEligible));
    }

    #[tokio::test]
    async fn busy_candidates_ranked_by_eta() {
        let store = InMemoryStore::new();
        let now = now_ms();

        let mut late = provider("Lane", 4.9, 30, false);
        bind_active_job(&store, &mut late, Some(now + 45 * MINUTE_MS));
        store.seed_provider(late);

        let mut soon = provider("Sam", 3.5, 2, false);
        bind_active_job(&store, &mut soon, Some(now + 10 * MINUTE_MS));
        let soon_id = soon.id;
        store.seed_provider(soon);

        let sel = select_provider(&store, &store, "plumbing", now)
            .await
            .unwrap();
        let wait = sel.wait_minutes(now).unwrap();
        assert_eq!(wait, 10);
        match sel {
            Selection::Busy(candidates) => {
                assert_eq!(candidates.len(), 2);
                assert_eq!(candidates[0].provider.id, soon_id);
            }
            other => panic!("expected Busy, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn wait_clamps_to_zero_for_overdue_jobs() {
        let store = InMemoryStore::new();
        let now = now_ms();
        let mut overdue = provider("Ove", 4.0, 8, false);
        bind_active_job(&store, &mut overdue, Some(now - 5 * MINUTE_MS));
        store.seed_provider(overdue);

        let sel = select_provider(&store, &store, "plumbing", now)
            .await
            .unwrap();
        assert_eq!(sel.wait_minutes(now), Some(0));
    }
}
