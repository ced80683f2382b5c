use serde_json::{json, Value};

use crate::llm::{CompletionRequest, Message, ProviderError};
use crate::task::{AiSuggestion, Task};

const SYSTEM_PROMPT: &str = "You are an academic planning assistant. \
Given a student's open tasks, decide which deserve High, Medium or Low priority. \
Weigh deadlines first, then estimated effort, then time already spent. \
Return one entry per task you have an opinion on, using the task's exact id, \
and keep each reasoning to one short sentence addressed to the student.";

/// Schema for the array of suggestions the model must return.
pub fn suggestion_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "taskId": { "type": "STRING" },
                "suggestedPriority": { "type": "STRING", "enum": ["Low", "Medium", "High"] },
                "reasoning": { "type": "STRING" }
            },
            "required": ["taskId", "suggestedPriority", "reasoning"]
        }
    })
}

pub fn build_request(
    tasks: &[Task],
    model: Option<String>,
    temperature: Option<f64>,
) -> Result<CompletionRequest, ProviderError> {
    let listing = serde_json::to_string_pretty(tasks)
        .map_err(|err| ProviderError::new("encode_error", &err.to_string(), false))?;
    let user = format!(
        "Today is {}. Prioritize these tasks:\n{}",
        chrono::Utc::now().format("%Y-%m-%d"),
        listing
    );
    Ok(CompletionRequest {
        messages: vec![Message::system(SYSTEM_PROMPT), Message::user(&user)],
        temperature,
        model,
        response_schema: Some(suggestion_schema()),
    })
}

pub fn parse_suggestions(content: &str) -> Result<Vec<AiSuggestion>, ProviderError> {
    let body = strip_fences(content);
    if body.is_empty() {
        return Err(ProviderError::new("parse_error", "empty advisor response", false));
    }
    serde_json::from_str::<Vec<AiSuggestion>>(body)
        .map_err(|err| ProviderError::new("parse_error", &err.to_string(), false))
}

fn strip_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{NewTask, Priority};

    #[test]
    fn request_lists_tasks_and_asks_for_json() {
        let task = NewTask::titled("Thesis draft", Priority::Low).into_task("t-9".to_string());
        let req = build_request(&[task], None, Some(0.1)).unwrap();
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, "system");
        assert!(req.messages[1].content.contains("\"id\": \"t-9\""));
        assert!(req.messages[1].content.contains("Thesis draft"));
        assert_eq!(req.response_schema.unwrap()["type"], "ARRAY");
        assert_eq!(req.temperature, Some(0.1));
    }

    #[test]
    fn parses_plain_json_array() {
        let raw = r#"[{"taskId":"a","suggestedPriority":"High","reasoning":"urgent"}]"#;
        let parsed = parse_suggestions(raw).unwrap();
        assert_eq!(
            parsed,
            vec![AiSuggestion {
                task_id: "a".to_string(),
                suggested_priority: Priority::High,
                reasoning: "urgent".to_string(),
            }]
        );
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n[{\"taskId\":\"b\",\"suggestedPriority\":\"Low\",\"reasoning\":\"later\"}]\n```";
        let parsed = parse_suggestions(raw).unwrap();
        assert_eq!(parsed[0].task_id, "b");
        assert_eq!(parsed[0].suggested_priority, Priority::Low);
    }

    #[test]
    fn rejects_unknown_priority_and_garbage() {
        let raw = r#"[{"taskId":"a","suggestedPriority":"Urgent","reasoning":"x"}]"#;
        assert_eq!(parse_suggestions(raw).unwrap_err().code, "parse_error");
        assert_eq!(parse_suggestions("sure, here you go").unwrap_err().code, "parse_error");
        assert_eq!(parse_suggestions("  ").unwrap_err().code, "parse_error");
    }
}
