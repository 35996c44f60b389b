use crate::config::Config;
use crate::prompt;
use ::llm::{
    builder::{LLMBackend, LLMBuilder},
    chat::{ChatMessage, ChatResponse, StructuredOutputFormat},
};
use anyhow::{Context, Result};
use async_trait::async_trait;

/// Something that turns an instruction into raw completion text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn ask(&self, instruction: &str) -> Result<String>;
}

pub struct OpenAiProvider {
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: Option<String>,
}

impl OpenAiProvider {
    pub fn new(api_key: impl Into<String>, config: &Config) -> Self {
        Self {
            api_key: api_key.into(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            base_url: config.openai_base_url.clone(),
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn ask(&self, instruction: &str) -> Result<String> {
        // In a test environment the reply can be injected without a network call.
        if let Ok(mock_content) = std::env::var("MOCK_LLM_CONTENT") {
            return Ok(mock_content);
        }
        if let Ok(mock_error) = std::env::var("MOCK_LLM_ERROR") {
            anyhow::bail!("Chat error: {mock_error}");
        }

        let schema: StructuredOutputFormat = serde_json::from_value(prompt::answer_schema())
            .context("Invalid structured output schema")?;

        let mut builder = LLMBuilder::new()
            .backend(LLMBackend::OpenAI)
            .api_key(self.api_key.clone())
            .model(self.model.clone())
            .max_tokens(self.max_tokens)
            .system(prompt::SYSTEM_PROMPT)
            .schema(schema);

        if let Some(url) = &self.base_url {
            builder = builder.base_url(url.clone());
        }

        let llm = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build LLM (OpenAI): {}", e))?;

        let messages = [ChatMessage::user().content(instruction).build()];

        match llm.chat(&messages).await {
            Ok(response) => response
                .text()
                .filter(|text| !text.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("No structured response received.")),
            Err(e) => anyhow::bail!("Chat error: {e}"),
        }
    }
}
