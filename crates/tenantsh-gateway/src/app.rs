use std::sync::Arc;

use tenantsh_containers::ContainerController;
use tenantsh_core::config::GatewayConfig;
use tenantsh_creds::CredentialStore;
use tenantsh_session::SessionRegistry;

/// Central shared state, handed to every client connection.
pub struct AppState {
    pub config: GatewayConfig,
    pub creds: CredentialStore,
    pub controller: Arc<ContainerController>,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(config: GatewayConfig, creds: CredentialStore, controller: ContainerController) -> Self {
        Self {
            config,
            creds,
            controller: Arc::new(controller),
            sessions: SessionRegistry::new(),
        }
    }
}
