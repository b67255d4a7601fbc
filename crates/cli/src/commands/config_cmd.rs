//! `agentrouter config` — Configuration management commands.

use agentrouter_config::AppConfig;
use clap::Subcommand;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (file + environment)
    Show,
    /// Print the default configuration as TOML
    Default,
    /// Print the config file path
    Path,
    /// Validate the configuration file
    Validate,
}

pub fn run(config_path: Option<&Path>, action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = super::load_config(config_path)?;
            println!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Default => println!("{}", AppConfig::default_toml()),
        ConfigAction::Path => println!("{}", resolved_path(config_path).display()),
        ConfigAction::Validate => {
            let config = super::load_config(config_path)?;
            println!("Config OK");
            println!("   Intents:   {}", config.intents.len());
            println!("   Dispatch:  {} entries", config.dispatch.len());
            println!(
                "   Embedding: {} ({})",
                config.embedding.provider, config.embedding.model
            );
            println!("   Store:     {}", config.store.backend);
            println!(
                "   Gateway:   {}:{}",
                config.gateway.host, config.gateway.port
            );
        }
    }
    Ok(())
}

fn resolved_path(config_path: Option<&Path>) -> std::path::PathBuf {
    config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_is_valid() {
        assert!(resolved_path(None).to_str().unwrap().contains("config.toml"));
        assert_eq!(
            resolved_path(Some(Path::new("/tmp/x.toml"))),
            Path::new("/tmp/x.toml")
        );
    }

    #[test]
    fn default_toml_parses_back() {
        let parsed = AppConfig::from_toml(&AppConfig::default_toml()).unwrap();
        assert_eq!(parsed.intents.len(), 4);
    }
}
