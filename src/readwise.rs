use crate::answer::StructuredAnswer;
use crate::config::Config;
use crate::note::FormattedNote;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;

/// One highlight as accepted by the Readwise highlights endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightRecord {
    pub text: String,
    pub title: String,
    pub source_url: String,
    pub note: String,
    pub author: String,
}

impl HighlightRecord {
    pub fn new(answer: &StructuredAnswer, note: &FormattedNote, config: &Config) -> Self {
        Self {
            text: answer.answer.clone(),
            title: note.title.clone(),
            source_url: config.source_url.clone(),
            note: note.body.clone(),
            author: config.author.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct HighlightsRequest<'a> {
    highlights: [&'a HighlightRecord; 1],
}

/// Result of a persist attempt that reached the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistStatus {
    Stored,
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait NoteProvider: Send + Sync {
    async fn persist(&self, record: &HighlightRecord) -> Result<PersistStatus>;
}

pub struct ReadwiseClient {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl ReadwiseClient {
    pub fn new(token: impl Into<String>, config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.readwise_url.clone(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl NoteProvider for ReadwiseClient {
    async fn persist(&self, record: &HighlightRecord) -> Result<PersistStatus> {
        let payload = HighlightsRequest {
            highlights: [record],
        };

        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", self.url))?;

        let status = response.status();
        if status.is_success() {
            return Ok(PersistStatus::Stored);
        }

        let body = response.text().await.unwrap_or_default();
        Ok(PersistStatus::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
