use crate::agent::Reply;
use serde_json::{Map, Value, json};

const PLAN: &str = "[TaskPlannerAgent] Plan:\n\
1. Define scope & acceptance criteria\n\
2. Build prototype (1-2 weeks)\n\
3. Validate and safety-test\n\
4. Deploy Canary\n";

pub(crate) fn respond(_prompt: &str, _context: &Map<String, Value>) -> Reply {
    Reply::new(
        PLAN,
        vec![json!({
            "type": "plan",
            "milestones": ["scope", "prototype", "validation", "deploy"],
            "est_hours": [8, 40, 16, 8],
        })],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_has_four_milestones_with_estimates() {
        let reply = respond("plan a rollout", &Map::new());
        let item = &reply.action_items[0];
        assert_eq!(item["milestones"].as_array().unwrap().len(), 4);
        assert_eq!(item["est_hours"], json!([8, 40, 16, 8]));
        assert_eq!(reply.response.lines().count(), 5);
    }
}
