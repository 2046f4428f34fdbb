use thiserror::Error;

pub type ChronosResult<T> = Result<T, ChronosError>;

#[derive(Error, Debug)]
pub enum ChronosError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rule condition error: {0}")]
    Condition(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for ChronosError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
