pub mod config;
pub mod error;
pub mod gateway;
pub mod routes;

use std::sync::Arc;

use config::Config;
use gateway::hub::{ChatHub, HubHandle};

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub hub: HubHandle,
}

impl AppState {
    /// Build the state and start the chat hub task. Must be called from
    /// within a Tokio runtime.
    pub fn new(config: Config) -> Self {
        let hub = ChatHub::new(config.bot()).spawn();
        Self {
            config: Arc::new(config),
            hub,
        }
    }
}
