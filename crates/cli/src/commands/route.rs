//! `agentrouter route` — Print the routing decision for a prompt.

use std::path::Path;

pub async fn run(config_path: Option<&Path>, prompt: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let orchestrator = agentrouter_agent::bootstrap(&config).await?;

    let decision = orchestrator.route_only(prompt).await?;
    let agent = orchestrator.dispatcher().lookup(&decision.intent);

    println!("Intent:     {}", decision.intent);
    println!("Confidence: {:.3}", decision.confidence);
    println!("Agent:      {agent}");
    println!();
    for (intent, score) in decision.scores.iter() {
        let marker = if *intent == decision.intent { "*" } else { " " };
        println!(" {marker} {intent:<20} {score:>7.3}");
    }

    Ok(())
}
