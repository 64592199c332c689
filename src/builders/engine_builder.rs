//! Builders to construct a dispatcher from configuration.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::core::{DispatchError, DispatchStore, Dispatcher, Notifier, Spawn};

/// Build a dispatcher from engine configuration using provided backend
/// factories. The factories receive the validated configuration and decide
/// how to realize the selected store and notifier backends.
pub fn build_dispatcher<S, N, R, FS, FN>(
    cfg: &EngineConfig,
    store_factory: FS,
    notifier_factory: FN,
    spawner: R,
) -> Result<Dispatcher<S, N, R>, DispatchError>
where
    S: DispatchStore + 'static,
    N: Notifier + 'static,
    R: Spawn + Clone + Send + Sync + 'static,
    FS: FnOnce(&EngineConfig) -> Result<S, DispatchError>,
    FN: FnOnce(&EngineConfig) -> Result<N, DispatchError>,
{
    cfg.validate()
        .map_err(|e| DispatchError::Store(format!("config invalid: {e}")))?;

    let store = Arc::new(store_factory(cfg)?);
    let notifier = Arc::new(notifier_factory(cfg)?);
    Ok(Dispatcher::new(store, notifier, spawner, cfg.policy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InMemoryNotifier, Spawn};
    use crate::infra::store::InMemoryStore;
    use std::future::Future;

    #[derive(Clone)]
    struct NoopSpawner;

    impl Spawn for NoopSpawner {
        fn spawn<F>(&self, _fut: F)
        where
            F: Future<Output = ()> + Send + 'static,
        {
        }
    }

    #[test]
    fn builds_from_valid_config() {
        let cfg = EngineConfig::default();
        let built = build_dispatcher(
            &cfg,
            |_| Ok(InMemoryStore::new()),
            |_| Ok(InMemoryNotifier::new(16)),
            NoopSpawner,
        );
        assert!(built.is_ok());
    }

    #[test]
    fn invalid_config_is_rejected_before_factories_run() {
        let mut cfg = EngineConfig::default();
        cfg.max_cascade_dispatches = 0;
        let built = build_dispatcher(
            &cfg,
            |_| -> Result<InMemoryStore, DispatchError> {
                panic!("factory must not run for invalid config")
            },
            |_| Ok(InMemoryNotifier::new(16)),
            NoopSpawner,
        );
        assert!(built.is_err());
    }
}
