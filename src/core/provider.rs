//! Provider record and matching predicates.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::job::JobId;

/// Default rolling average completion time for a provider with no history,
/// in minutes.
pub const DEFAULT_AVG_COMPLETION_MINUTES: u32 = 60;

/// Unique provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(Uuid);

impl ProviderId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProviderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A worker capable of fulfilling jobs of certain service types.
///
/// `approved` and the skill set are owned by external admin/profile flows;
/// `is_available`, `current_job`, and the rolling stats are mutated only by
/// the dispatcher transactions (plus the idle-only manual toggle).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    /// Unique identifier.
    pub id: ProviderId,
    /// Display name, used in notifications and summaries.
    pub name: String,
    /// Contact number, surfaced in the assignment summary.
    pub phone: String,
    /// Primary trade (e.g. `"plumber"`).
    pub profession: String,
    /// Service tags this provider can fulfill.
    pub skills: Vec<String>,
    /// Admin approval gate; unapproved providers are never matchable.
    pub approved: bool,
    /// Free to take a job right now. Always false while `current_job` is set.
    pub is_available: bool,
    /// The one active job, if any.
    pub current_job: Option<JobId>,
    /// Running average rating, 0.0..=5.0, one-decimal precision.
    pub rating: f32,
    /// Lifetime completed-job counter.
    pub total_jobs_completed: u32,
    /// Rolling average job duration in minutes.
    pub average_completion_minutes: u32,
}

impl Provider {
    /// Create an unapproved, unavailable provider with default stats.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        profession: impl Into<String>,
        skills: Vec<String>,
    ) -> Self {
        Self {
            id: ProviderId::new(),
            name: name.into(),
            phone: phone.into(),
            profession: profession.into(),
            skills,
            approved: false,
            is_available: false,
            current_job: None,
            rating: 0.0,
            total_jobs_completed: 0,
            average_completion_minutes: DEFAULT_AVG_COMPLETION_MINUTES,
        }
    }

    /// Whether the provider's skill set covers a service tag.
    #[must_use]
    pub fn has_skill(&self, service_type: &str) -> bool {
        self.skills.iter().any(|s| s == service_type)
    }

    /// Approved, free, and skilled for the given service tag.
    #[must_use]
    pub fn is_matchable(&self, service_type: &str) -> bool {
        self.approved && self.is_available && self.has_skill(service_type)
    }

    /// Fold a completed job's duration into the rolling average:
    /// `round((avg·n + duration) / (n + 1))`, where `n` is the completed
    /// count *before* this job.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn folded_average(&self, duration_minutes: u32) -> u32 {
        let old = f64::from(self.average_completion_minutes) * f64::from(self.total_jobs_completed);
        let new_count = f64::from(self.total_jobs_completed + 1);
        ((old + f64::from(duration_minutes)) / new_count).round() as u32
    }
}

/// The provider fields reported back to a requester on assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSummary {
    /// Provider identifier.
    pub id: ProviderId,
    /// Display name.
    pub name: String,
    /// Contact number.
    pub phone: String,
    /// Current running rating.
    pub rating: f32,
    /// Primary trade.
    pub profession: String,
}

impl From<&Provider> for ProviderSummary {
    fn from(p: &Provider) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            phone: p.phone.clone(),
            rating: p.rating,
            profession: p.profession.clone(),
        }
    }
}
