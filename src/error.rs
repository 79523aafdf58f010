use thiserror::Error;

/// Errors surfaced by the repository pool.
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Repository '{0}' is already registered")]
    DuplicateRepository(String),

    #[error("Operation '{0}' is not implemented")]
    NotImplemented(&'static str),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T, E = PoolError> = std::result::Result<T, E>;
