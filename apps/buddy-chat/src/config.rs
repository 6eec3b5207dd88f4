use std::path::PathBuf;

use crate::gateway::hub::BotProfile;

/// Chat server configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Directory served for every path not handled by a route.
    pub static_dir: PathBuf,
    /// Display name of the scripted responder; `@<name>` mentions it.
    pub bot_name: String,
    pub bot_email: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            static_dir: PathBuf::from("public"),
            bot_name: "Buddy".to_string(),
            bot_email: "buddy@brightfactory.ai".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            static_dir: optional_var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            bot_name: optional_var("BOT_NAME").unwrap_or(defaults.bot_name),
            bot_email: optional_var("BOT_EMAIL").unwrap_or(defaults.bot_email),
        }
    }

    pub fn bot(&self) -> BotProfile {
        BotProfile {
            name: self.bot_name.clone(),
            email: self.bot_email.clone(),
        }
    }
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}
