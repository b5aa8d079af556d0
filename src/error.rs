use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinguaError {
    /// The word sheet could not be fetched. Parsing never produces this.
    #[error("word data unavailable: {0}")]
    DataUnavailable(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("no API key configured; set GEMINI_API_KEY or `api_key` in the config file")]
    MissingApiKey,

    #[error("AI service error: {0}")]
    Ai(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LinguaError>;
