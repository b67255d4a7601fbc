//! `agentrouter run` — Answer one prompt and print the result as JSON.

use agentrouter_core::agent::AgentRequest;
use serde_json::{Map, Value};
use std::path::Path;

pub async fn run(
    config_path: Option<&Path>,
    prompt: String,
    context: Option<String>,
    user_id: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let context = parse_context(context.as_deref())?;
    let config = super::load_config(config_path)?;
    let orchestrator = agentrouter_agent::bootstrap(&config).await?;

    let request = AgentRequest {
        user_prompt: prompt,
        context,
        user_id,
    };
    let result = orchestrator.handle(&request).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

fn parse_context(raw: Option<&str>) -> Result<Map<String, Value>, Box<dyn std::error::Error>> {
    match raw {
        None => Ok(Map::new()),
        Some(text) => match serde_json::from_str::<Value>(text)? {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(Map::new()),
            _ => Err("--context must be a JSON object".into()),
        },
    }
}
