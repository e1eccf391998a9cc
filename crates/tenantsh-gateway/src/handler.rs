//! SSH server front-end: one [`ClientHandler`] per connection, dispatching
//! into a [`tenantsh_session::Session`] once a shell is requested.
//!
//! Grounded in the reference implementation's `SSHServer` /
//! `SSHServerSession` (password-only auth, one container per session,
//! refuse everything but an interactive shell) and in `russh`'s own
//! `echoserver.rs` example for the `Server`/`Handler` wiring.

use std::sync::Arc;

use russh::server::{Auth, Msg, Session as RusshSession};
use russh::{Channel, ChannelId, Pty};
use tenantsh_pump::ChannelWriter;
use tenantsh_session::Session as TenantSession;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::app::AppState;

#[derive(Clone)]
pub struct GatewayServer {
    pub state: Arc<AppState>,
}

impl russh::server::Server for GatewayServer {
    type Handler = ClientHandler;

    fn new_client(&mut self, peer: Option<std::net::SocketAddr>) -> ClientHandler {
        tracing::debug!(?peer, "accepted connection");
        ClientHandler {
            state: self.state.clone(),
            username: None,
            session: None,
            shutdown_watcher: None,
        }
    }

    fn handle_session_error(&mut self, error: <Self::Handler as russh::server::Handler>::Error) {
        tracing::error!(%error, "session error");
    }
}

pub struct ClientHandler {
    state: Arc<AppState>,
    username: Option<String>,
    session: Option<Arc<TenantSession>>,
    /// Watches the registry's cancellation token for this session and tears
    /// it down if the process is shutting down before the channel closes
    /// normally. Aborted once the channel closes on its own.
    shutdown_watcher: Option<JoinHandle<()>>,
}

impl russh::server::Handler for ClientHandler {
    type Error = russh::Error;

    async fn auth_password(&mut self, user: &str, password: &str) -> Result<Auth, Self::Error> {
        if self.state.creds.verify(user, password) {
            tracing::info!(user, "authentication succeeded");
            self.username = Some(user.to_string());
            Ok(Auth::Accept)
        } else {
            tracing::warn!(user, "authentication failed");
            Ok(Auth::reject())
        }
    }

    async fn channel_open_session(
        &mut self,
        _channel: Channel<Msg>,
        _session: &mut RusshSession,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }

    async fn pty_request(
        &mut self,
        channel: ChannelId,
        _term: &str,
        _col_width: u32,
        _row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _modes: &[(Pty, u32)],
        session: &mut RusshSession,
    ) -> Result<(), Self::Error> {
        session.channel_success(channel)?;
        Ok(())
    }

    async fn shell_request(
        &mut self,
        channel: ChannelId,
        session: &mut RusshSession,
    ) -> Result<(), Self::Error> {
        let Some(username) = self.username.clone() else {
            session.channel_failure(channel)?;
            return Ok(());
        };

        let writer = ChannelWriter::new(session.handle(), channel);
        let io_timeout = std::time::Duration::from_secs(self.state.config.container.io_timeout_secs);
        let tenant_session = Arc::new(TenantSession::new(Uuid::new_v4().to_string(), username, io_timeout));
        let shutdown_token = self.state.sessions.insert(tenant_session.clone());

        match tenant_session.start_shell(&self.state.controller, writer.clone()).await {
            Ok(()) => {
                let watched_session = tenant_session.clone();
                let watched_state = self.state.clone();
                self.shutdown_watcher = Some(tokio::spawn(async move {
                    shutdown_token.cancelled().await;
                    watched_session.teardown(&watched_state.controller).await;
                    watched_state.sessions.remove(&watched_session.id);
                }));
                self.session = Some(tenant_session);
                session.channel_success(channel)?;
            }
            Err(e) => {
                tracing::warn!(error = %e, "shell request failed to start a session");
                self.state.sessions.remove(&tenant_session.id);
                writer.exit_status(1).await;
                session.channel_failure(channel)?;
                writer.close().await;
            }
        }
        Ok(())
    }

    async fn window_change_request(
        &mut self,
        channel: ChannelId,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        session: &mut RusshSession,
    ) -> Result<(), Self::Error> {
        if let Some(tenant_session) = &self.session {
            tenant_session
                .on_resize(&self.state.controller, col_width as u16, row_height as u16)
                .await;
        }
        session.channel_success(channel)?;
        Ok(())
    }

    async fn data(
        &mut self,
        _channel: ChannelId,
        data: &[u8],
        _session: &mut RusshSession,
    ) -> Result<(), Self::Error> {
        if let Some(tenant_session) = &self.session {
            tenant_session.on_data(data).await;
        }
        Ok(())
    }

    async fn channel_eof(
        &mut self,
        _channel: ChannelId,
        _session: &mut RusshSession,
    ) -> Result<(), Self::Error> {
        if let Some(tenant_session) = &self.session {
            tenant_session.on_client_eof().await;
        }
        Ok(())
    }

    async fn channel_close(
        &mut self,
        _channel: ChannelId,
        _session: &mut RusshSession,
    ) -> Result<(), Self::Error> {
        if let Some(watcher) = self.shutdown_watcher.take() {
            watcher.abort();
        }
        if let Some(tenant_session) = self.session.take() {
            tenant_session.teardown(&self.state.controller).await;
            self.state.sessions.remove(&tenant_session.id);
        }
        Ok(())
    }

    async fn exec_request(
        &mut self,
        channel: ChannelId,
        _data: &[u8],
        session: &mut RusshSession,
    ) -> Result<(), Self::Error> {
        session.channel_failure(channel)?;
        Ok(())
    }

    async fn subsystem_request(
        &mut self,
        channel: ChannelId,
        _name: &str,
        session: &mut RusshSession,
    ) -> Result<(), Self::Error> {
        session.channel_failure(channel)?;
        Ok(())
    }

    async fn x11_request(
        &mut self,
        channel: ChannelId,
        _single_connection: bool,
        _x11_auth_protocol: &str,
        _x11_auth_cookie: &str,
        _x11_screen_number: u32,
        session: &mut RusshSession,
    ) -> Result<(), Self::Error> {
        session.channel_failure(channel)?;
        Ok(())
    }
}

impl Drop for ClientHandler {
    fn drop(&mut self) {
        if let Some(watcher) = self.shutdown_watcher.take() {
            watcher.abort();
        }
        if let Some(tenant_session) = self.session.take() {
            let controller = self.state.controller.clone();
            let registry_cleanup_id = tenant_session.id.clone();
            self.state.sessions.remove(&registry_cleanup_id);
            tokio::spawn(async move {
                tenant_session.teardown(&controller).await;
            });
        }
    }
}
