//! # Job Dispatch
//!
//! A matching and scheduling engine for on-demand service platforms.
//!
//! The engine matches incoming service jobs to qualified, available providers
//! and degrades gracefully to an estimated-wait queue when nobody is free.
//! It owns the decision and state-mutation logic only: selection of the best
//! eligible provider, expected-availability estimation for busy providers,
//! atomic assignment and completion of job/provider pairs, rolling provider
//! statistics, and cascading re-dispatch of queued work after a completion.
//!
//! Storage, transport, and user management are external collaborators reached
//! through narrow trait seams:
//!
//! - [`core::ProviderDirectory`]: provider identity, skills, approval and
//!   availability flags, rolling stats
//! - [`core::JobStore`]: job records and lifecycle status
//! - [`core::Notifier`]: fire-and-forget outbound notifications
//!
//! ## Dispatch flow
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use job_dispatch::core::{Dispatcher, DispatchOutcome, DispatchPolicy, LogNotifier};
//! use job_dispatch::infra::store::InMemoryStore;
//! use job_dispatch::runtime::TokioSpawner;
//!
//! let dispatcher = Dispatcher::new(
//!     Arc::new(InMemoryStore::new()),
//!     Arc::new(LogNotifier),
//!     TokioSpawner::current(),
//!     DispatchPolicy::default(),
//! );
//!
//! match dispatcher.dispatch(job_id, "plumbing").await? {
//!     DispatchOutcome::Assigned { provider, .. } => println!("got {}", provider.name),
//!     DispatchOutcome::Queued { wait_minutes, .. } => println!("~{wait_minutes} min wait"),
//!     other => println!("{other:?}"),
//! }
//! ```
//!
//! Completing a job frees its provider, folds the duration into the rolling
//! average, and spawns a bounded cascade task that pulls the next queued job
//! of the same service type.
//!
//! All mutation of job status, assignment pointers, and provider stats goes
//! through the unit-of-work commits driven by [`core::Dispatcher`]; a commit
//! aborts if any record it read changed concurrently, so two assignment
//! attempts racing for the same provider resolve to exactly one winner.

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core matching, transaction, and orchestration logic.
pub mod core;
/// Configuration models for the engine and its backends.
pub mod config;
/// Builders to construct a dispatcher from configuration.
pub mod builders;
/// Infrastructure adapters for job and provider storage.
pub mod infra;
/// Runtime adapters and API-facing models.
pub mod runtime;
/// Shared utilities.
pub mod util;
