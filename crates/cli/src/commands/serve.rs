//! `agentrouter serve` — Start the HTTP API server.

use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("agentrouter gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!(
        "   Embedding: {} ({})",
        config.embedding.provider, config.embedding.model
    );
    println!("   Store:     {}", config.store.backend);

    agentrouter_gateway::start(config).await?;

    Ok(())
}
