//! `agentrouter intents` — List the catalog and dispatch table.

use agentrouter_agent::Dispatcher;
use agentrouter_core::intent::IntentId;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let catalog = config.catalog()?;
    let dispatcher = Dispatcher::new(
        config
            .dispatch_table()
            .into_iter()
            .map(|(intent, kind)| (IntentId::from(intent), kind)),
    );

    println!("{} intents (routing order):", catalog.len());
    for intent in catalog.all() {
        let agent = dispatcher.lookup(&intent.id);
        let note = if dispatcher.is_mapped(&intent.id) { "" } else { " (fallback)" };
        println!("  {:<16} → {agent}{note}", intent.id);
        println!("      {}", intent.description);
    }

    Ok(())
}
