use clap::Parser;
use std::io::{self, Write};

pub mod answer;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod note;
pub mod prompt;
pub mod readwise;
pub mod session;

pub use error::Error;

pub async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    let credentials = config::Credentials::from_env()?;
    let mut config = config::load_from(&cli.config)?;
    if let Some(model) = cli.model.clone() {
        config.model = model;
    }
    if let Some(max_tokens) = cli.max_tokens {
        config.max_tokens = max_tokens;
    }

    let prompt = cli.joined_prompt().ok_or(Error::EmptyPrompt)?;
    tracing::debug!(?config, "configuration loaded");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    writeln!(out, "📜 Received prompt: \"{}\"", prompt)?;

    let completion = llm::OpenAiProvider::new(credentials.openai_api_key, &config);
    let notes = readwise::ReadwiseClient::new(credentials.readwise_api_key, &config);

    let outcome =
        session::run_session(&prompt, &completion, &notes, &config, &mut input, &mut out).await?;
    tracing::debug!(?outcome, "session finished");

    Ok(())
}
