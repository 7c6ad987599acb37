use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Input is empty: enter what you would like to learn")]
    EmptyInput,

    #[error("API key not set: {0}")]
    MissingApiKey(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, LlmError>;
