use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Failed to read route table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse route table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Route path must start with '/': {0:?}")]
    InvalidPath(String),
}
