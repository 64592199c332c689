//! Outbound notification sink implementations.
//!
//! The engine only needs a fire-and-forget contract: a failed send is logged
//! and never blocks or reverts the state transition that triggered it.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::core::error::DispatchError;
use crate::core::job::Job;
use crate::core::provider::Provider;

/// A notification emitted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// A provider was assigned to a job.
    ProviderAssigned {
        /// Assigned provider's display name.
        provider_name: String,
        /// Service tag of the job.
        service_type: String,
        /// Job location.
        location: String,
        /// Job description.
        description: String,
        /// Job priority.
        priority: String,
    },
    /// A job moved to a new lifecycle status.
    JobStatusChanged {
        /// Service tag of the job.
        service_type: String,
        /// New status, wire form.
        status: String,
        /// Assigned provider's name, when one is bound.
        provider_name: Option<String>,
    },
}

impl NotificationEvent {
    /// Build the assignment event from the committed pair.
    #[must_use]
    pub fn assigned(provider: &Provider, job: &Job) -> Self {
        Self::ProviderAssigned {
            provider_name: provider.name.clone(),
            service_type: job.service_type.clone(),
            location: job.location.clone(),
            description: job.description.clone(),
            priority: job.priority.to_string(),
        }
    }

    /// Build the status-change event for a job.
    #[must_use]
    pub fn status_changed(job: &Job, provider_name: Option<&str>) -> Self {
        Self::JobStatusChanged {
            service_type: job.service_type.clone(),
            status: job.status.to_string(),
            provider_name: provider_name.map(str::to_owned),
        }
    }
}

/// Notification sink abstraction.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one event. Errors are the sink's problem to describe; the
    /// dispatcher logs them and moves on.
    async fn send(&self, event: NotificationEvent) -> Result<(), DispatchError>;
}

/// Sink that writes events to the tracing log. The default for deployments
/// without an outbound channel.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, event: NotificationEvent) -> Result<(), DispatchError> {
        match &event {
            NotificationEvent::ProviderAssigned {
                provider_name,
                service_type,
                ..
            } => {
                tracing::info!(provider = %provider_name, service_type, "provider assigned");
            }
            NotificationEvent::JobStatusChanged {
                service_type,
                status,
                ..
            } => {
                tracing::info!(service_type, status, "job status changed");
            }
        }
        Ok(())
    }
}

/// Bounded in-memory sink for testing and dev.
pub struct InMemoryNotifier {
    events: Mutex<VecDeque<NotificationEvent>>,
    max_events: usize,
}

impl InMemoryNotifier {
    /// Create a sink with a bounded buffer; oldest events are dropped first.
    #[must_use]
    pub const fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
            max_events,
        }
    }

    /// Snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().iter().cloned().collect()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn send(&self, event: NotificationEvent) -> Result<(), DispatchError> {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
        Ok(())
    }
}

/// SMTP-backed sink (interface stub; transport wiring belongs to the
/// integration layer).
pub struct SmtpNotifier {
    from_address: String,
}

impl SmtpNotifier {
    /// Create a stub sink that would send from the given address.
    #[must_use]
    pub const fn new(from_address: String) -> Self {
        Self { from_address }
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, _event: NotificationEvent) -> Result<(), DispatchError> {
        Err(DispatchError::Store(format!(
            "smtp notifier ({}) not wired to a mail transport",
            self.from_address
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::job::{JobStatus, Priority, RequesterId};
    use uuid::Uuid;

    fn sample_event(n: u32) -> NotificationEvent {
        NotificationEvent::JobStatusChanged {
            service_type: format!("svc-{n}"),
            status: "accepted".into(),
            provider_name: None,
        }
    }

    #[tokio::test]
    async fn in_memory_sink_is_bounded() {
        let sink = InMemoryNotifier::new(2);
        for n in 0..3 {
            sink.send(sample_event(n)).await.unwrap();
        }
        let events = sink.events();
        assert_eq!(events.len(), 2);
        match &events[0] {
            NotificationEvent::JobStatusChanged { service_type, .. } => {
                assert_eq!(service_type, "svc-1");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn smtp_stub_reports_unwired_transport() {
        let sink = SmtpNotifier::new("dispatch@example.com".into());
        let err = sink.send(sample_event(0)).await.unwrap_err();
        assert!(err.to_string().contains("not wired"));
    }

    #[test]
    fn assignment_event_carries_job_context() {
        let mut provider = Provider::new("Noa", "555-0123", "plumber", vec!["plumbing".into()]);
        provider.approved = true;
        let mut job = crate::core::job::Job::new(
            "plumbing",
            "7 Elm St",
            "water heater swap",
            Priority::High,
            RequesterId(Uuid::new_v4()),
        );
        job.status = JobStatus::Accepted;

        match NotificationEvent::assigned(&provider, &job) {
            NotificationEvent::ProviderAssigned {
                provider_name,
                service_type,
                location,
                priority,
                ..
            } => {
                assert_eq!(provider_name, "Noa");
                assert_eq!(service_type, "plumbing");
                assert_eq!(location, "7 Elm St");
                assert_eq!(priority, "high");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
