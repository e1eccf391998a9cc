use thiserror::Error;

/// The four conditions that keep the gateway from starting at all.
///
/// Every other failure mode is scoped to a single session and lives in a
/// component-specific error enum instead (`CredsError`, `ContainerError`,
/// `SessionError`).
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("host key missing: {0}")]
    HostKeyMissing(String),

    #[error("container runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("credential file missing: {0}")]
    ConfigMissing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Short error code, used for the process exit code mapping in `main`.
    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::Config(_) => "CONFIG_ERROR",
            GatewayError::HostKeyMissing(_) => "HOST_KEY_MISSING",
            GatewayError::RuntimeUnavailable(_) => "RUNTIME_UNAVAILABLE",
            GatewayError::ConfigMissing(_) => "CONFIG_MISSING",
            GatewayError::Io(_) => "IO_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
