//! Container lifecycle: provision a throwaway, resource-limited container per
//! session, open a TTY-backed exec instance inside it, and tear both down.
//!
//! Grounded directly in the reference implementation's `create_container` /
//! `cleanup_container` and `connection_made`'s exec setup: a fresh container
//! per session, `/bin/bash` as both PID 1 and the exec'd shell, `kill` then
//! `remove` on teardown with each step attempted independently.

use std::sync::Arc;

use bollard::container::{
    Config, KillContainerOptions, RemoveContainerOptions,
};
use bollard::exec::{CreateExecOptions, ResizeExecOptions, StartExecOptions, StartExecResults};
use bollard::models::HostConfig;
use bollard::Docker;
use futures_util::Stream;
use tokio::io::AsyncWrite;
use std::pin::Pin;

use crate::error::{ContainerError, Result};

/// A provisioned, running container exclusively owned by one session.
#[derive(Debug, Clone)]
pub struct ContainerHandle {
    pub id: String,
    pub name: String,
}

/// A TTY-backed exec instance attached to a [`ContainerHandle`].
pub struct ExecHandle {
    pub id: String,
    pub output: Pin<Box<dyn Stream<Item = std::result::Result<bollard::container::LogOutput, bollard::errors::Error>> + Send>>,
    pub input: Pin<Box<dyn AsyncWrite + Send>>,
}

/// Fixed environment every exec'd shell runs with, matching the reference
/// implementation's container and exec environments exactly.
fn shell_env() -> Vec<&'static str> {
    vec![
        "TERM=xterm",
        "PATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin",
        "SHELL=/bin/bash",
    ]
}

pub struct ContainerController {
    docker: Arc<Docker>,
    image: String,
    memory_limit_bytes: i64,
    nano_cpus: i64,
}

impl ContainerController {
    pub fn new(docker: Arc<Docker>, image: impl Into<String>, memory_limit_bytes: i64, nano_cpus: i64) -> Self {
        Self {
            docker,
            image: image.into(),
            memory_limit_bytes,
            nano_cpus,
        }
    }

    /// Startup health check. A failure here is fatal to the whole process.
    pub async fn ping(&self) -> Result<()> {
        self.docker
            .ping()
            .await
            .map(|_| ())
            .map_err(|e| ContainerError::RuntimeUnavailable(e.to_string()))
    }

    /// Create a fresh, running container for `username`.
    pub async fn provision(&self, username: &str) -> Result<ContainerHandle> {
        let name = format!("session_{username}_{}", uuid::Uuid::new_v4());

        let host_config = HostConfig {
            memory: Some(self.memory_limit_bytes),
            nano_cpus: Some(self.nano_cpus),
            ..Default::default()
        };

        let config = Config {
            image: Some(self.image.as_str()),
            cmd: Some(vec!["/bin/bash"]),
            tty: Some(true),
            open_stdin: Some(true),
            env: Some(shell_env()),
            host_config: Some(host_config),
            ..Default::default()
        };

        let options = bollard::container::CreateContainerOptions {
            name: name.as_str(),
            platform: None,
        };

        let created = self
            .docker
            .create_container(Some(options), config)
            .await
            .map_err(|e| ContainerError::ProvisionFailed(e.to_string()))?;

        self.docker
            .start_container::<String>(&created.id, None)
            .await
            .map_err(|e| ContainerError::ProvisionFailed(e.to_string()))?;

        tracing::info!(container = %name, %username, "provisioned container");

        Ok(ContainerHandle {
            id: created.id,
            name,
        })
    }

    /// Open an interactive `/bin/bash` exec instance inside `handle`'s
    /// container, started in socket mode so both directions are a single
    /// byte stream.
    pub async fn open_exec(&self, handle: &ContainerHandle) -> Result<ExecHandle> {
        let exec = self
            .docker
            .create_exec(
                &handle.id,
                CreateExecOptions {
                    attach_stdin: Some(true),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    tty: Some(true),
                    cmd: Some(vec!["/bin/bash"]),
                    env: Some(shell_env()),
                    ..Default::default()
                },
            )
            .await
            .map_err(|e| ContainerError::ProvisionFailed(e.to_string()))?;

        let started = self
            .docker
            .start_exec(&exec.id, Some(StartExecOptions { detach: false, tty: true, output_capacity: None }))
            .await
            .map_err(|e| ContainerError::ProvisionFailed(e.to_string()))?;

        match started {
            StartExecResults::Attached { output, input } => Ok(ExecHandle {
                id: exec.id,
                output,
                input,
            }),
            StartExecResults::Detached => Err(ContainerError::NotAttached),
        }
    }

    /// Resize the TTY for a running exec instance. Best-effort: callers log
    /// and continue on failure rather than tearing down the session.
    pub async fn resize(&self, exec_id: &str, cols: u16, rows: u16) -> Result<()> {
        self.docker
            .resize_exec(exec_id, ResizeExecOptions { width: cols, height: rows })
            .await
            .map_err(|e| ContainerError::ResizeFailed(e.to_string()))
    }

    /// Kill then remove the container. Both steps are attempted
    /// independently; failures are logged, never propagated. Idempotent.
    pub async fn teardown(&self, handle: &ContainerHandle) {
        let kill_err = self
            .docker
            .kill_container(&handle.id, None::<KillContainerOptions<String>>)
            .await
            .err();
        if let Some(e) = &kill_err {
            tracing::warn!(container = %handle.name, error = %e, "kill failed during teardown");
        }

        let remove_err = self
            .docker
            .remove_container(
                &handle.id,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await
            .err();
        if let Some(e) = &remove_err {
            tracing::warn!(container = %handle.name, error = %e, "remove failed during teardown");
        }

        tracing::info!(container = %handle.name, "teardown complete");
    }
}
