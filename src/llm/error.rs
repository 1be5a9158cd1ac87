use thiserror::Error;

use super::item::ShapeError;

/// Failures of a single generation attempt.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Gemini API key not set")]
    MissingCredential,

    #[error("Gemini API returned HTTP {status}")]
    Transport { status: u16 },

    #[error("failed to reach the Gemini API: {0}")]
    Network(#[from] reqwest::Error),

    #[error("no content in Gemini API response")]
    EmptyResponse,

    #[error("model output is not valid JSON: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("model output has the wrong shape: {0}")]
    InvalidShape(#[from] ShapeError),
}

pub type Result<T> = std::result::Result<T, GenerationError>;
