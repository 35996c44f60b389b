//! Interpreting completion replies into a [`StructuredAnswer`].
//!
//! Interpretation never fails: a reply that cannot be decoded yields the
//! fallback record, and each missing field is replaced on its own.

use crate::llm::CompletionProvider;
use crate::prompt;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

pub const PLACEHOLDER: &str = "N/A";
pub const FALLBACK_ANSWER: &str = "Error: Could not retrieve response.";

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```[a-zA-Z]*\s*\n(.*?)\n?```$").expect("code fence pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredAnswer {
    pub answer: String,
    pub title: String,
    pub takeaways: Vec<String>,
    pub memory_hook: String,
}

impl StructuredAnswer {
    /// The record shown when the provider call or decoding fails outright.
    pub fn fallback() -> Self {
        Self {
            answer: FALLBACK_ANSWER.to_string(),
            title: PLACEHOLDER.to_string(),
            takeaways: vec![PLACEHOLDER.to_string()],
            memory_hook: PLACEHOLDER.to_string(),
        }
    }
}

/// Decodes a raw reply. `None`, empty or non-object JSON gives the fallback record.
pub fn interpret(raw: Option<&str>) -> StructuredAnswer {
    let Some(raw) = raw else {
        return StructuredAnswer::fallback();
    };

    let parsed: Value = match serde_json::from_str(strip_code_fence(raw)) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "could not decode completion reply");
            return StructuredAnswer::fallback();
        }
    };

    let Some(fields) = parsed.as_object() else {
        tracing::warn!("completion reply is not a JSON object");
        return StructuredAnswer::fallback();
    };

    StructuredAnswer {
        answer: scalar(fields.get("full_answer")),
        title: scalar(fields.get("title")),
        takeaways: takeaways(fields.get("key_takeaways")),
        memory_hook: scalar(fields.get("memory_hook")),
    }
}

/// Queries `provider` for `query` and interprets the reply, degrading to the
/// fallback record on any transport error.
pub async fn fetch_answer(provider: &dyn CompletionProvider, query: &str) -> StructuredAnswer {
    let instruction = match prompt::build_instruction(query) {
        Ok(instruction) => instruction,
        Err(e) => {
            tracing::error!(error = %e, "failed to render instruction");
            return StructuredAnswer::fallback();
        }
    };

    match provider.ask(&instruction).await {
        Ok(raw) => {
            tracing::debug!(reply = %raw, "completion reply received");
            interpret(Some(raw.as_str()))
        }
        Err(e) => {
            tracing::error!(error = %e, "error fetching completion");
            interpret(None)
        }
    }
}

fn scalar(value: Option<&Value>) -> String {
    match value.and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => text.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

fn takeaways(value: Option<&Value>) -> Vec<String> {
    let items: Vec<String> = value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter(|item| !item.trim().is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if items.is_empty() {
        vec![PLACEHOLDER.to_string()]
    } else {
        items
    }
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    match CODE_FENCE.captures(trimmed).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str(),
        None => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    const KREBS: &str = r#"{
        "full_answer": "The Krebs cycle oxidises acetyl-CoA to CO2.",
        "title": "Krebs Cycle",
        "key_takeaways": ["A", "B", "C"],
        "memory_hook": "Think of a wheel"
    }"#;

    #[test]
    fn well_formed_reply_is_returned_unchanged() {
        let answer = interpret(Some(KREBS));
        assert_eq!(
            answer,
            StructuredAnswer {
                answer: "The Krebs cycle oxidises acetyl-CoA to CO2.".to_string(),
                title: "Krebs Cycle".to_string(),
                takeaways: vec!["A".to_string(), "B".to_string(), "C".to_string()],
                memory_hook: "Think of a wheel".to_string(),
            }
        );
    }

    #[test]
    fn undecodable_or_absent_reply_gives_fallback() {
        assert_eq!(interpret(None), StructuredAnswer::fallback());
        assert_eq!(interpret(Some("")), StructuredAnswer::fallback());
        assert_eq!(interpret(Some("not json at all")), StructuredAnswer::fallback());
        assert_eq!(interpret(Some("[1, 2, 3]")), StructuredAnswer::fallback());
        assert_eq!(interpret(Some("\"a string\"")), StructuredAnswer::fallback());
    }

    #[test]
    fn missing_fields_fall_back_one_by_one() {
        let answer = interpret(Some(r#"{"full_answer": "Only the answer."}"#));
        assert_eq!(answer.answer, "Only the answer.");
        assert_eq!(answer.title, PLACEHOLDER);
        assert_eq!(answer.takeaways, vec![PLACEHOLDER.to_string()]);
        assert_eq!(answer.memory_hook, PLACEHOLDER);

        let answer = interpret(Some(r#"{"title": "T", "key_takeaways": ["x"]}"#));
        assert_eq!(answer.answer, PLACEHOLDER);
        assert_eq!(answer.title, "T");
        assert_eq!(answer.takeaways, vec!["x".to_string()]);
    }

    #[test]
    fn empty_object_gives_all_sentinels() {
        let answer = interpret(Some("{}"));
        assert_eq!(answer.answer, PLACEHOLDER);
        assert_eq!(answer.title, PLACEHOLDER);
        assert_eq!(answer.takeaways, vec![PLACEHOLDER.to_string()]);
        assert_eq!(answer.memory_hook, PLACEHOLDER);
    }

    #[test]
    fn wrong_typed_fields_are_treated_as_missing() {
        let answer = interpret(Some(
            r#"{"full_answer": 42, "title": "", "key_takeaways": "nope", "memory_hook": null}"#,
        ));
        assert_eq!(answer.answer, PLACEHOLDER);
        assert_eq!(answer.title, PLACEHOLDER);
        assert_eq!(answer.takeaways, vec![PLACEHOLDER.to_string()]);
        assert_eq!(answer.memory_hook, PLACEHOLDER);

        let answer = interpret(Some(r#"{"key_takeaways": [1, "kept", null, ""]}"#));
        assert_eq!(answer.takeaways, vec!["kept".to_string()]);

        let answer = interpret(Some(r#"{"key_takeaways": []}"#));
        assert_eq!(answer.takeaways, vec![PLACEHOLDER.to_string()]);
    }

    #[test]
    fn surrounding_whitespace_in_values_is_kept() {
        let answer = interpret(Some(
            r#"{"full_answer": "  Leading space.", "title": "Krebs Cycle ", "key_takeaways": [" A", "B\n"], "memory_hook": "wheel "}"#,
        ));
        assert_eq!(answer.answer, "  Leading space.");
        assert_eq!(answer.title, "Krebs Cycle ");
        assert_eq!(answer.takeaways, vec![" A".to_string(), "B\n".to_string()]);
        assert_eq!(answer.memory_hook, "wheel ");

        let answer = interpret(Some(r#"{"title": "   ", "key_takeaways": ["  ", "kept"]}"#));
        assert_eq!(answer.title, PLACEHOLDER);
        assert_eq!(answer.takeaways, vec!["kept".to_string()]);
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let fenced = format!("```json\n{KREBS}\n```");
        assert_eq!(interpret(Some(fenced.as_str())).title, "Krebs Cycle");

        let bare_fence = format!("```\n{KREBS}```");
        assert_eq!(interpret(Some(bare_fence.as_str())).title, "Krebs Cycle");
    }

    struct Canned(Result<&'static str, &'static str>);

    #[async_trait]
    impl CompletionProvider for Canned {
        async fn ask(&self, instruction: &str) -> anyhow::Result<String> {
            assert!(instruction.contains("Query:"));
            match self.0 {
                Ok(reply) => Ok(reply.to_string()),
                Err(e) => Err(anyhow::anyhow!(e)),
            }
        }
    }

    #[tokio::test]
    async fn fetch_answer_interprets_reply() {
        let answer = fetch_answer(&Canned(Ok(KREBS)), "What is the Krebs cycle?").await;
        assert_eq!(answer.title, "Krebs Cycle");
        assert_eq!(answer.takeaways.len(), 3);
    }

    #[tokio::test]
    async fn fetch_answer_degrades_on_provider_error() {
        let answer = fetch_answer(&Canned(Err("connection refused")), "anything").await;
        assert_eq!(answer, StructuredAnswer::fallback());
    }
}
