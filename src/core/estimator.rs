//! Expected-availability estimation for busy providers.

use crate::core::error::DispatchError;
use crate::core::provider::Provider;
use crate::core::repository::JobStore;
use crate::util::clock::{minutes_to_ms, TimestampMs};

/// Timestamp at which a provider is expected to become free.
///
/// Fallback chain, so an estimate always exists even for partially
/// populated jobs:
///
/// 1. no active job behind the busy flag: free now
/// 2. the active job's `estimated_completion_ms`, verbatim
/// 3. `(actual_start ?? created_at) + provider average completion time`
pub async fn estimate_free(
    jobs: &dyn JobStore,
    provider: &Provider,
    now_ms: TimestampMs,
) -> Result<TimestampMs, DispatchError> {
    let Some(active) = jobs.active_job_for(provider.id).await? else {
        return Ok(now_ms);
    };

    if let Some(eta) = active.estimated_completion_ms {
        return Ok(eta);
    }

    let start = active.actual_start_ms.unwrap_or(active.created_at_ms);
    Ok(start + minutes_to_ms(provider.average_completion_minutes))
}
