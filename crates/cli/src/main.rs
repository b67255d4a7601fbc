//! agentrouter CLI — the main entry point.
//!
//! Commands:
//! - `serve`    — Start the HTTP gateway
//! - `route`    — Show how a prompt would be routed
//! - `run`      — Route and answer a single prompt
//! - `seed`     — Write the built-in agent configs to the store
//! - `intents`  — List the intent catalog and dispatch table
//! - `config`   — Inspect configuration

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "agentrouter",
    about = "agentrouter — route prompts to guardrailed agents by meaning",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.agentrouter/config.toml)
    #[arg(short, long, global = true, env = "AGENTROUTER_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show the routing decision for a prompt
    Route {
        prompt: String,
    },

    /// Route a prompt and print the agent's result as JSON
    Run {
        prompt: String,

        /// Caller context as a JSON object
        #[arg(long)]
        context: Option<String>,

        #[arg(long)]
        user_id: Option<String>,
    },

    /// Upsert the built-in agent configs into the configured store
    Seed,

    /// List intents and the agent each dispatches to
    Intents,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config_cmd::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Route { prompt } => commands::route::run(config_path, &prompt).await?,
        Commands::Run {
            prompt,
            context,
            user_id,
        } => commands::run::run(config_path, prompt, context, user_id).await?,
        Commands::Seed => commands::seed::run(config_path).await?,
        Commands::Intents => commands::intents::run(config_path).await?,
        Commands::Config { action } => commands::config_cmd::run(config_path, action)?,
    }

    Ok(())
}
