//! `agentrouter seed` — Write the built-in agent configs to the store.

use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let store = agentrouter_store::build_from_config(&config.store);

    let count = agentrouter_store::seed_defaults(store.as_ref()).await?;
    println!("Seeded {count} agent configs into the {} store", store.name());
    if config.store.backend == "memory" {
        println!("   Note: the memory store is not persisted; set [store] backend = \"file\"");
    }

    Ok(())
}
