pub mod assets;
pub mod health;

use axum::Router;

use crate::config::Config;
use crate::AppState;

pub fn router(config: &Config) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(crate::gateway::server::router())
        .merge(assets::router(&config.static_dir))
}
