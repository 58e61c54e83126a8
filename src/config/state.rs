// Application state module
// Bundles the loaded configuration with the shared record store

use crate::store::Store;

use super::types::Config;

/// Shared application state, one instance behind an `Arc` for the whole
/// process lifetime.
pub struct AppState {
    pub config: Config,
    pub store: Store,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let store = Store::new(&config.store.path);
        Self {
            config: config.clone(),
            store,
        }
    }
}
