use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unreadable workout document: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("invalid format: expected a list of sessions or an object with a \"sessions\" list")]
    Format,

    #[error("could not serialize sessions: {0}")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
