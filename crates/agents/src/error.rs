//! Error types for the remote collaborators.

use thiserror::Error;

/// Invalid or missing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Required environment variable '{0}' is not set")]
    Missing(&'static str),

    #[error("Environment variable '{key}' has invalid value '{value}': {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Failure of a content generation call.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generation client is not configured: {0}")]
    NotConfigured(#[from] ConfigError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed API response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model returned empty content")]
    EmptyContent,
}

impl From<GenerationError> for deckgen_core::Error {
    fn from(err: GenerationError) -> Self {
        deckgen_core::Error::GenerationFailure(format!(
            "{} {}",
            deckgen_core::validate::ERROR_MARKER,
            err
        ))
    }
}
