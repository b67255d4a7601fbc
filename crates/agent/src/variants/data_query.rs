use crate::agent::Reply;
use serde_json::{Map, Value, json};

const CLARIFICATION: &str = "[DataQueryAgent] Clarifying: Which DB and timeframe? Proposed SQL template:\n\
SELECT user_id, event_time, action FROM events \
WHERE event_time >= '{{start}}' AND event_time < '{{end}}' LIMIT 1000;";

pub(crate) fn respond(_prompt: &str, _context: &Map<String, Value>) -> Reply {
    Reply::new(
        CLARIFICATION,
        vec![json!({"type": "ask", "questions": ["Which DB?", "Which time range?"]})],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_keeps_placeholders() {
        let reply = respond("how many signups last week", &Map::new());
        assert!(reply.response.contains("'{{start}}'"));
        assert!(reply.response.ends_with("LIMIT 1000;"));
        assert_eq!(reply.action_items[0]["questions"][1], "Which time range?");
    }
}
