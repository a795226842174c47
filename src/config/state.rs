// Application state module
// Holds configuration and the content store shared by all connections

use std::sync::atomic::AtomicUsize;

use super::types::Config;
use crate::content::ContentStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: ContentStore,
    /// Connections currently being served
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            store: ContentStore::new(config.content.chapters_path(), config.content.matrix_path()),
            active_connections: AtomicUsize::new(0),
        }
    }
}
