use anyhow::Result;
use minijinja::{context, Environment};

const STRUCTURED_ANSWER_TEMPLATE: &str = "structured_answer";

const STRUCTURED_ANSWER_PROMPT: &str = r#"Provide a structured JSON response for this query:
- full_answer: A detailed but concise response to the query, no more than 3 sentences or one short paragraph.
- title: A short title for the note, a few words at most.
- key_takeaways: An array of {{ min_takeaways }}-{{ max_takeaways }} key bullet points summarizing the answer.
- memory_hook: A visualization or mnemonic to help recall the information.

Respond with a single JSON object containing exactly these four keys.

Query: "{{ query }}""#;

pub const SYSTEM_PROMPT: &str =
    "You answer questions for a personal knowledge base. Follow the instructions in the user's message and reply with JSON only.";

/// Name and JSON schema requested from providers that support structured output.
pub fn answer_schema() -> serde_json::Value {
    serde_json::json!({
        "name": "structured_answer",
        "description": "An answer to the user's query, condensed for later recall.",
        "strict": true,
        "schema": {
            "type": "object",
            "properties": {
                "full_answer": { "type": "string" },
                "title": { "type": "string" },
                "key_takeaways": {
                    "type": "array",
                    "items": { "type": "string" }
                },
                "memory_hook": { "type": "string" }
            },
            "required": ["full_answer", "title", "key_takeaways", "memory_hook"],
            "additionalProperties": false
        }
    })
}

/// Renders the instruction sent to the completion provider for `query`.
pub fn build_instruction(query: &str) -> Result<String> {
    let mut env = Environment::new();
    env.add_template(STRUCTURED_ANSWER_TEMPLATE, STRUCTURED_ANSWER_PROMPT)?;
    let tmpl = env.get_template(STRUCTURED_ANSWER_TEMPLATE)?;

    let rendered = tmpl.render(context! {
        query => query,
        min_takeaways => 3,
        max_takeaways => 5,
    })?;

    Ok(rendered)
}
