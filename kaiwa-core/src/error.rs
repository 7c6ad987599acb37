use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid speaker role: {0}")]
    InvalidRole(String),

    #[error("Invalid bookmark: {0}")]
    InvalidBookmark(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, Error>;
