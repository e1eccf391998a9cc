use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("provisioning failed: {0}")]
    ProvisionFailed(String),

    #[error("operation not valid in state {0:?}")]
    InvalidState(crate::state::SessionState),
}

pub type Result<T> = std::result::Result<T, SessionError>;
