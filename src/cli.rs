use clap::Parser;

/// Recall: ask a question, keep the answer as a Readwise highlight
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// The question to ask. All words are joined with single spaces.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub prompt: Vec<String>,

    /// Model to query (overrides config)
    #[arg(long)]
    pub model: Option<String>,

    /// Response size cap in tokens (overrides config)
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Path to the config file
    #[arg(long, default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub config: String,
}

impl Cli {
    /// The prompt as one string, or `None` when nothing but whitespace was given.
    pub fn joined_prompt(&self) -> Option<String> {
        let prompt = self.prompt.join(" ");
        let prompt = prompt.trim();
        (!prompt.is_empty()).then(|| prompt.to_string())
    }
}
