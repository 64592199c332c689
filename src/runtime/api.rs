//! API-facing request/response models (skeleton).
//!
//! The transport layer itself lives outside this crate; these models fix
//! the shape it exchanges with the engine.

use serde::{Deserialize, Serialize};

use crate::core::{DispatchOutcome, Job, JobId, ProviderId, ProviderSummary};
use crate::util::clock::TimestampMs;

/// Dispatch request for a pending job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// Job to match.
    pub job_id: JobId,
    /// Service tag to match against provider skills.
    pub service_type: String,
}

/// Dispatch response, flattened for transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DispatchResponse {
    /// A provider was assigned.
    Assigned {
        /// The job, post-commit.
        job: Job,
        /// Assigned provider summary.
        provider: ProviderSummary,
    },
    /// The job was queued behind busy providers.
    Queued {
        /// Whole minutes until the earliest provider frees up.
        wait_minutes: i64,
        /// Busy candidates considered.
        queue_position: usize,
        /// Earliest-available provider.
        next_available: ProviderId,
        /// Their estimated-free timestamp.
        available_at_ms: TimestampMs,
    },
    /// The job was queued with no wait estimate.
    NoEligibleProviders,
    /// The selected provider was claimed concurrently; the job stays
    /// pending and the caller may re-dispatch.
    LostRace,
}

impl From<DispatchOutcome> for DispatchResponse {
    fn from(outcome: DispatchOutcome) -> Self {
        match outcome {
            DispatchOutcome::Assigned { job, provider } => Self::Assigned { job, provider },
            DispatchOutcome::Queued {
                wait_minutes,
                queue_position,
                next_available,
                available_at_ms,
            } => Self::Queued {
                wait_minutes,
                queue_position,
                next_available,
                available_at_ms,
            },
            DispatchOutcome::NoEligibleProviders => Self::NoEligibleProviders,
            DispatchOutcome::LostRace => Self::LostRace,
        }
    }
}

/// Completion request for an assigned job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Job to complete.
    pub job_id: JobId,
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
}

/// Return a health payload.
#[must_use]
pub const fn health() -> Health {
    Health { ok: true }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_response_serializes_tagged() {
        let resp = DispatchResponse::from(DispatchOutcome::Queued {
            wait_minutes: 30,
            queue_position: 2,
            next_available: ProviderId::new(),
            available_at_ms: 0,
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["result"], "queued");
        assert_eq!(json["wait_minutes"], 30);
        assert_eq!(json["queue_position"], 2);
    }

    #[test]
    fn lost_race_maps_through() {
        let resp = DispatchResponse::from(DispatchOutcome::LostRace);
        assert!(matches!(resp, DispatchResponse::LostRace));
    }
}
