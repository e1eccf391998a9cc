use std::sync::Arc;

use russh::server::Server as _;
use tenantsh_containers::ContainerController;
use tenantsh_core::config::GatewayConfig;
use tenantsh_core::error::GatewayError;
use tenantsh_creds::CredentialStore;

mod app;
mod handler;
mod stop;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tenantsh_gateway=info".into()),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!(code = e.code(), error = %e, "fatal startup error");
        std::process::exit(1);
    }
}

async fn run() -> tenantsh_core::error::Result<()> {
    let config_path = std::env::var("TENANTSH_CONFIG").ok();
    let config = GatewayConfig::load(config_path.as_deref())?;

    let creds = CredentialStore::load(&config.credentials.path)
        .map_err(|e| GatewayError::ConfigMissing(e.to_string()))?;
    tracing::info!(users = creds.len(), "credential store loaded");

    let docker = bollard::Docker::connect_with_socket_defaults()
        .map_err(|e| GatewayError::RuntimeUnavailable(e.to_string()))?;
    let controller = ContainerController::new(
        Arc::new(docker),
        config.container.image.clone(),
        config.container.memory_limit_bytes,
        config.container.nano_cpus,
    );
    controller
        .ping()
        .await
        .map_err(|e| GatewayError::RuntimeUnavailable(e.to_string()))?;

    let host_key = russh::keys::load_secret_key(&config.ssh.host_key_path, None)
        .map_err(|e| GatewayError::HostKeyMissing(e.to_string()))?;

    let bind = config.ssh.bind.clone();
    let port = config.ssh.port;

    let mut ssh_config = russh::server::Config {
        auth_rejection_time: std::time::Duration::from_secs(3),
        auth_rejection_time_initial: Some(std::time::Duration::from_secs(0)),
        keys: vec![host_key],
        ..Default::default()
    };
    ssh_config.methods = russh::MethodSet::empty();
    ssh_config.methods.push(russh::MethodKind::Password);

    let state = Arc::new(app::AppState::new(config, creds, controller));

    let mut server = handler::GatewayServer { state: state.clone() };
    tracing::info!(%bind, port, "tenantsh gateway listening");

    tokio::select! {
        result = server.run_on_address(Arc::new(ssh_config), (bind.as_str(), port)) => {
            result.map_err(|e| GatewayError::Io(std::io::Error::other(e.to_string())))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received, draining sessions");
            stop::shutdown_all_sessions(&state);
            drain_sessions(&state, std::time::Duration::from_secs(10)).await;
            std::process::exit(0);
        }
    }

    Ok(())
}

/// Wait for every cancelled session to finish tearing itself down, up to
/// `timeout`. A session that hasn't drained by then is abandoned rather
/// than blocking process exit indefinitely.
async fn drain_sessions(state: &app::AppState, timeout: std::time::Duration) {
    let deadline = tokio::time::Instant::now() + timeout;
    while !state.sessions.is_empty() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }
    if !state.sessions.is_empty() {
        tracing::warn!(
            remaining = state.sessions.len(),
            "timed out waiting for sessions to drain"
        );
    }
}
