pub mod config_cmd;
pub mod intents;
pub mod route;
pub mod run;
pub mod seed;
pub mod serve;

use agentrouter_config::AppConfig;
use std::path::Path;

/// Load configuration from `path`, or the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(p) => AppConfig::load_with_overrides(p),
        None => AppConfig::load(),
    };
    config.map_err(|e| format!("Failed to load config: {e}").into())
}
