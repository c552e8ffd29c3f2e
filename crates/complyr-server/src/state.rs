use std::sync::Arc;

use complyr_core::{config::Config, EntitlementEngine};
use complyr_metadata::InMemoryStore;

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
pub struct AppState {
    /// Engine facade. Reads through the store on every call; holds no cache.
    pub engine: Arc<EntitlementEngine>,

    /// Backing store for subscriptions, override rules and usage counters.
    pub store: Arc<InMemoryStore>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the engine to `store` for all three collaborator roles.
    pub fn new(store: InMemoryStore, config: Config) -> Self {
        let store = Arc::new(store);
        let engine = EntitlementEngine::new(store.clone(), store.clone(), store.clone())
            .with_trial_days(config.trial_days);
        Self {
            engine: Arc::new(engine),
            store,
            config: Arc::new(config),
        }
    }
}
