use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One answer in a submission, tied to a question by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    #[serde(default)]
    pub question_type: Option<String>,
    pub value: Value,
}

/// Check the submitted answers against the form's question schema.
/// Returns the titles of required questions that were not answered.
pub fn missing_required(questions: &Value, answers: &[Answer]) -> Vec<String> {
    let Some(defs) = questions.as_array() else {
        return Vec::new();
    };

    let answered: Vec<&str> = answers
        .iter()
        .filter(|a| !is_empty_value(&a.value))
        .map(|a| a.question_id.as_str())
        .collect();

    defs.iter()
        .filter(|q| q.get("required").and_then(|r| r.as_bool()).unwrap_or(false))
        .filter(|q| {
            q.get("id")
                .and_then(|id| id.as_str())
                .is_none_or(|id| !answered.contains(&id))
        })
        .map(|q| {
            q.get("title")
                .and_then(|t| t.as_str())
                .unwrap_or("Untitled question")
                .to_string()
        })
        .collect()
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}
