use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredsError {
    #[error("credential file not found: {0}")]
    NotFound(String),

    #[error("I/O error reading credential file: {0}")]
    Io(#[from] std::io::Error),

    #[error("user already exists: {0}")]
    AlreadyExists(String),

    #[error("hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

pub type Result<T> = std::result::Result<T, CredsError>;
