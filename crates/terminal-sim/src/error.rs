use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("No free port pair after {0} attempts")]
    NoPortPair(usize),
}

pub type Result<T> = std::result::Result<T, SimError>;
