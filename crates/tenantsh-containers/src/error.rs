use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("container runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("provisioning failed: {0}")]
    ProvisionFailed(String),

    #[error("resize failed: {0}")]
    ResizeFailed(String),

    #[error("exec produced no attached stream")]
    NotAttached,
}

pub type Result<T> = std::result::Result<T, ContainerError>;
