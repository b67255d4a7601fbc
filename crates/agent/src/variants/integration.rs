use crate::agent::Reply;
use serde_json::{Map, Value, json};

const RECOMMENDATION: &str = "[IntegrationAgent] Recommended integrations:\n\
- Slack: webhook\n\
- Jira: API token\n\
Security: store tokens in secrets manager.";

pub(crate) fn respond(_prompt: &str, _context: &Map<String, Value>) -> Reply {
    let mut reply = Reply::new(
        RECOMMENDATION,
        vec![json!({
            "type": "config",
            "required_fields": {"slack_webhook": "url", "jira_api_token": "token"},
        })],
    );
    reply
        .required_connection_config
        .insert("secrets".into(), json!("use-vault"));
    reply
}
