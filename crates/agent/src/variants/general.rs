use crate::agent::Reply;
use serde_json::{Map, Value, json};

/// Characters of the prompt echoed back in the short answer.
const ECHO_CHARS: usize = 200;

pub(crate) fn respond(prompt: &str, _context: &Map<String, Value>) -> Reply {
    let echo: String = prompt.chars().take(ECHO_CHARS).collect();
    Reply::new(
        format!("[GeneralQAAgent] Short answer: {echo}"),
        vec![json!({"type": "clarify", "text": "Short or detailed?"})],
    )
}
