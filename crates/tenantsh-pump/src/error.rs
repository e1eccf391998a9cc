use thiserror::Error;

#[derive(Debug, Error)]
pub enum PumpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("container stream error: {0}")]
    Stream(String),

    #[error("SSH channel write failed")]
    ChannelWrite,
}

pub type Result<T> = std::result::Result<T, PumpError>;
