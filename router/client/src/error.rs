use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("no API key configured")]
    MissingCredential,

    #[error("request to completion API failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("completion API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed completion response: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("completion response had no message content")]
    EmptyChoices,
}
