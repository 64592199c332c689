//! Job record and lifecycle model.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::provider::ProviderId;
use crate::util::clock::{now_ms, TimestampMs};

/// Unique job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of the user who requested a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequesterId(pub Uuid);

impl fmt::Display for RequesterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    /// Created, waiting for a provider.
    Pending,
    /// A provider has been assigned but has not started.
    Accepted,
    /// The assigned provider is working the job.
    InProgress,
    /// Finished; terminal.
    Completed,
    /// Abandoned by the requester; terminal.
    Cancelled,
}

impl JobStatus {
    /// Whether a provider is actively bound to the job in this status.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Accepted | Self::InProgress)
    }

    /// Wire/display name, matching the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requester-supplied urgency, used for notification context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Default.
    Medium,
    /// Urgent.
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(s)
    }
}

/// One unit of requested work.
///
/// Invariants enforced by the dispatcher transactions:
/// `accepted_by` is set iff status is accepted/in-progress/completed, and
/// `actual_completion_ms` is set iff the job is completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique identifier.
    pub id: JobId,
    /// Service tag used for skill matching (e.g. `"plumbing"`).
    pub service_type: String,
    /// Where the work happens; carried into notifications.
    pub location: String,
    /// What the requester asked for; carried into notifications.
    pub description: String,
    /// Lifecycle status.
    pub status: JobStatus,
    /// Urgency.
    pub priority: Priority,
    /// User who created the job.
    pub requested_by: RequesterId,
    /// Provider currently (or finally) bound to the job.
    pub accepted_by: Option<ProviderId>,
    /// Predicted start, set on assignment or queueing.
    pub estimated_start_ms: Option<TimestampMs>,
    /// Predicted completion, set on assignment or queueing.
    pub estimated_completion_ms: Option<TimestampMs>,
    /// When work actually began.
    pub actual_start_ms: Option<TimestampMs>,
    /// When work actually finished.
    pub actual_completion_ms: Option<TimestampMs>,
    /// Minutes of work, recorded while in progress; folded into provider
    /// stats on completion when present.
    pub duration_minutes: Option<u32>,
    /// Agreed cost, recorded while in progress.
    pub cost: Option<f64>,
    /// Requester rating, 1..=5, attached after completion.
    pub rating: Option<u8>,
    /// Free-form review attached with the rating.
    pub review: Option<String>,
    /// Creation timestamp.
    pub created_at_ms: TimestampMs,
}

impl Job {
    /// Create a pending job with fresh id and creation time.
    #[must_use]
    pub fn new(
        service_type: impl Into<String>,
        location: impl Into<String>,
        description: impl Into<String>,
        priority: Priority,
        requested_by: RequesterId,
    ) -> Self {
        Self {
            id: JobId::new(),
            service_type: service_type.into(),
            location: location.into(),
            description: description.into(),
            status: JobStatus::Pending,
            priority,
            requested_by,
            accepted_by: None,
            estimated_start_ms: None,
            estimated_completion_ms: None,
            actual_start_ms: None,
            actual_completion_ms: None,
            duration_minutes: None,
            cost: None,
            rating: None,
            review: None,
            created_at_ms: now_ms(),
        }
    }

    /// Whether a provider is actively bound to this job.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
