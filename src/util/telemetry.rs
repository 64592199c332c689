//! Telemetry helpers for structured logging and tracing.

/// Initialize tracing for the engine. Callers can install their own
/// subscriber first; this helper only installs an env-filtered default
/// (falling back to `info`) when none is set.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
