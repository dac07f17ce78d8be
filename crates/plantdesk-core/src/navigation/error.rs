use thiserror::Error;

#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("Navigation blocked: {0}")]
    Blocked(String),

    #[error("Navigation failed: {0}")]
    Failed(String),
}
