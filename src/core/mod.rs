//! Core matching, transaction, and orchestration logic.

pub mod error;
pub mod job;
pub mod provider;
pub mod repository;
pub mod estimator;
pub mod matcher;
pub mod dispatcher;
pub mod notify;

pub use error::{AppResult, DispatchError};
pub use job::{Job, JobId, JobStatus, Priority, RequesterId};
pub use provider::{Provider, ProviderId, ProviderSummary, DEFAULT_AVG_COMPLETION_MINUTES};
pub use repository::{DispatchStore, JobStore, ProviderDirectory, UnitOfWork};
pub use estimator::estimate_free;
pub use matcher::{select_provider, BusyCandidate, Selection};
pub use dispatcher::{DispatchOutcome, DispatchPolicy, Dispatcher, Spawn};
pub use notify::{InMemoryNotifier, LogNotifier, NotificationEvent, Notifier, SmtpNotifier};
