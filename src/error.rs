use thiserror::Error;

/// Precondition failures that stop the program before any network call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Missing required API key: {0} is not set.")]
    MissingCredential(&'static str),

    #[error("Please provide a prompt.")]
    EmptyPrompt,
}
