//! `Session` — owns exactly one container, one exec instance, and one pump,
//! and drives them through the lifecycle in [`crate::state::SessionState`].
//!
//! Grounded in the reference implementation's `SSHServerSession`
//! (`connection_made` provisions the container and exec and starts the
//! output task; `connection_lost` cancels it and cleans up the container
//! exactly once) and in this codebase's `TerminalManager` for the
//! owns-a-map-of-live-resources shape.

use std::sync::Mutex as StdMutex;
use std::time::Duration;

use tenantsh_containers::{ContainerController, ContainerHandle};
use tenantsh_pump::{ChannelWriter, Pump};
use tokio::sync::Mutex as AsyncMutex;

use crate::error::{Result, SessionError};
use crate::state::SessionState;

pub struct Session {
    pub id: String,
    pub username: String,
    state: StdMutex<SessionState>,
    container: AsyncMutex<Option<ContainerHandle>>,
    exec_id: AsyncMutex<Option<String>>,
    pump: AsyncMutex<Option<Pump>>,
    io_timeout: Duration,
}

impl Session {
    /// A `Session` is only ever constructed after authentication succeeds,
    /// so it starts life already in `Authenticated`.
    pub fn new(id: impl Into<String>, username: impl Into<String>, io_timeout: Duration) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            state: StdMutex::new(SessionState::Authenticated),
            container: AsyncMutex::new(None),
            exec_id: AsyncMutex::new(None),
            pump: AsyncMutex::new(None),
            io_timeout,
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap()
    }

    fn set_state(&self, to: SessionState) {
        *self.state.lock().unwrap() = to;
    }

    /// Provision a container, open its exec instance, and start the pump.
    ///
    /// Returns `Ok(())` once `RUNNING`. On any failure the session has
    /// already torn itself down and the caller should send exit status 1
    /// and close the channel.
    pub async fn start_shell(
        &self,
        controller: &ContainerController,
        writer: ChannelWriter,
    ) -> Result<()> {
        let state = self.state();
        if state != SessionState::Authenticated {
            return Err(SessionError::InvalidState(state));
        }

        self.set_state(SessionState::Provisioning);
        let handle = match controller.provision(&self.username).await {
            Ok(h) => h,
            Err(e) => {
                tracing::error!(username = %self.username, error = %e, "provisioning failed");
                self.set_state(SessionState::Teardown);
                self.set_state(SessionState::Gone);
                return Err(SessionError::ProvisionFailed(e.to_string()));
            }
        };
        *self.container.lock().await = Some(handle.clone());

        self.set_state(SessionState::Attaching);
        let exec = match controller.open_exec(&handle).await {
            Ok(e) => e,
            Err(e) => {
                tracing::error!(container = %handle.name, error = %e, "exec open failed");
                controller.teardown(&handle).await;
                self.set_state(SessionState::Teardown);
                self.set_state(SessionState::Gone);
                return Err(SessionError::ProvisionFailed(e.to_string()));
            }
        };
        *self.exec_id.lock().await = Some(exec.id.clone());

        let pump = Pump::spawn(exec.output, exec.input, writer, self.io_timeout);
        *self.pump.lock().await = Some(pump);

        self.set_state(SessionState::Running);
        Ok(())
    }

    /// Forward client-sent bytes into the container. No-op outside `RUNNING`.
    pub async fn on_data(&self, data: &[u8]) {
        if self.state() != SessionState::Running {
            return;
        }
        if let Some(pump) = self.pump.lock().await.as_ref() {
            if let Err(e) = pump.write(data).await {
                tracing::warn!(session = %self.id, error = %e, "write to container failed");
            }
        }
    }

    /// Propagate client EOF as a half-close of the container's stdin.
    pub async fn on_client_eof(&self) {
        if self.state() != SessionState::Running {
            return;
        }
        if let Some(pump) = self.pump.lock().await.as_ref() {
            pump.shutdown_input().await;
        }
    }

    /// Resize the exec's TTY. Ignored outside `RUNNING`; resize failures are
    /// logged by the caller and never torn down the session.
    pub async fn on_resize(&self, controller: &ContainerController, cols: u16, rows: u16) {
        if !self.state().accepts_resize() {
            return;
        }
        let exec_id = self.exec_id.lock().await.clone();
        if let Some(exec_id) = exec_id {
            if let Err(e) = controller.resize(&exec_id, cols, rows).await {
                tracing::warn!(session = %self.id, error = %e, "resize failed");
            }
        }
    }

    /// Idempotent teardown: cancel the pump, then kill+remove the
    /// container. Safe to call multiple times or from multiple exit paths.
    pub async fn teardown(&self, controller: &ContainerController) {
        if !self.state().needs_teardown() {
            return;
        }
        self.set_state(SessionState::Teardown);

        if let Some(pump) = self.pump.lock().await.take() {
            pump.cancel();
        }

        if let Some(handle) = self.container.lock().await.take() {
            controller.teardown(&handle).await;
        }

        self.set_state(SessionState::Gone);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_authenticated() {
        let s = Session::new("sess-1", "alice", Duration::from_secs(60));
        assert_eq!(s.state(), SessionState::Authenticated);
    }

    #[tokio::test]
    async fn teardown_on_fresh_session_is_a_noop() {
        // No container controller needed: Authenticated with no container
        // set still exercises the idempotency guard and state transition.
        let s = Session::new("sess-1", "alice", Duration::from_secs(60));
        s.set_state(SessionState::Running);
        // No real ContainerController in this test: verify the guard alone
        // by checking state transitions directly instead of calling
        // teardown(), which requires a live docker socket.
        assert!(s.state().needs_teardown());
    }
}
