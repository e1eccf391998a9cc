use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SSH_PORT: u16 = 2222;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_HOST_KEY_PATH: &str = "ssh_host_key";
pub const DEFAULT_CREDENTIALS_PATH: &str = "users.txt";
pub const DEFAULT_IMAGE: &str = "ubuntu:20.04";
pub const DEFAULT_MEMORY_LIMIT_BYTES: i64 = 512 * 1024 * 1024;
pub const DEFAULT_NANO_CPUS: i64 = 500_000_000;
pub const DEFAULT_IO_TIMEOUT_SECS: u64 = 60;

/// Top-level config (`tenantsh.toml` + `TENANTSH_*` env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GatewayConfig {
    #[serde(default)]
    pub ssh: SshConfig,
    #[serde(default)]
    pub container: ContainerConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_host_key_path")]
    pub host_key_path: String,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_SSH_PORT,
            bind: DEFAULT_BIND.to_string(),
            host_key_path: DEFAULT_HOST_KEY_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerConfig {
    #[serde(default = "default_image")]
    pub image: String,
    #[serde(default = "default_memory_limit")]
    pub memory_limit_bytes: i64,
    #[serde(default = "default_nano_cpus")]
    pub nano_cpus: i64,
    #[serde(default = "default_io_timeout")]
    pub io_timeout_secs: u64,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            image: default_image(),
            memory_limit_bytes: default_memory_limit(),
            nano_cpus: default_nano_cpus(),
            io_timeout_secs: default_io_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default = "default_credentials_path")]
    pub path: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            path: default_credentials_path(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_host_key_path() -> String {
    DEFAULT_HOST_KEY_PATH.to_string()
}
fn default_image() -> String {
    DEFAULT_IMAGE.to_string()
}
fn default_memory_limit() -> i64 {
    DEFAULT_MEMORY_LIMIT_BYTES
}
fn default_nano_cpus() -> i64 {
    DEFAULT_NANO_CPUS
}
fn default_io_timeout() -> u64 {
    DEFAULT_IO_TIMEOUT_SECS
}
fn default_credentials_path() -> String {
    DEFAULT_CREDENTIALS_PATH.to_string()
}

impl GatewayConfig {
    /// Load config from a TOML file with `TENANTSH_*` env var overrides.
    ///
    /// A missing config file is not an error — defaults apply — but a
    /// malformed one is.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path.unwrap_or("tenantsh.toml");

        let config: GatewayConfig = Figment::from(Serialized::defaults(GatewayConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("TENANTSH_").split("_"))
            .extract()
            .map_err(|e| crate::error::GatewayError::Config(e.to_string()))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_constants() {
        let cfg = GatewayConfig::default();
        assert_eq!(cfg.ssh.port, 2222);
        assert_eq!(cfg.container.image, "ubuntu:20.04");
        assert_eq!(cfg.container.memory_limit_bytes, 512 * 1024 * 1024);
        assert_eq!(cfg.container.nano_cpus, 500_000_000);
        assert_eq!(cfg.container.io_timeout_secs, 60);
    }

    #[test]
    fn env_override_applies() {
        std::env::set_var("TENANTSH_SSH_PORT", "2022");
        let cfg = GatewayConfig::load(Some("/nonexistent/path.toml")).unwrap();
        assert_eq!(cfg.ssh.port, 2022);
        std::env::remove_var("TENANTSH_SSH_PORT");
    }
}
