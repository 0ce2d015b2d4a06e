use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Match document not found: {0}")]
    MatchNotFound(String),

    #[error("Unknown title: {0}")]
    UnknownTitle(String),

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ScoutError {
    fn from(err: serde_json::Error) -> Self {
        ScoutError::Serialize(err.to_string())
    }
}

impl From<serde_yaml::Error> for ScoutError {
    fn from(err: serde_yaml::Error) -> Self {
        ScoutError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
