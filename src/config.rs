use crate::constants::{
    DEFAULT_BANNER, DEFAULT_CONTROL_IDLE_SECS, DEFAULT_DOWNLOAD_BUFFER_SIZE,
    DEFAULT_LOGIN_FAILURE_DELAY_MS, DEFAULT_MAX_COMMAND_LENGTH, DEFAULT_MAX_LOGINS,
    DEFAULT_MAX_LOGIN_FAILURES, DEFAULT_UPLOAD_BUFFER_SIZE,
};
use crate::core_auth::UserConfig;
use crate::core_network::data_config::DataConnectionSettings;
use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    pub listen_port: u16,
    pub chroot_dir: String,
    pub create_home: bool,
    pub banner: String,
    pub banner_file: Option<String>,
    pub idle_timeout_secs: u64,
    pub max_command_length: usize,
    pub anonymous_enabled: bool,
    pub anonymous_home: String,
    pub passwd_file: Option<String>,
    /// Failed PASS attempts before the connection is closed, 0 for no limit.
    pub max_login_failures: u32,
    pub login_failure_delay_ms: u64,
    /// Concurrent logins across the server, 0 for no limit.
    pub max_logins: u64,
    pub upload_buffer_size: Option<usize>,
    pub download_buffer_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data_connection: DataConnectionSettings,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from("0.0.0.0"),
            listen_port: 21,
            chroot_dir: String::from("/var/ftp"),
            create_home: true,
            banner: String::from(DEFAULT_BANNER),
            banner_file: None,
            idle_timeout_secs: DEFAULT_CONTROL_IDLE_SECS,
            max_command_length: DEFAULT_MAX_COMMAND_LENGTH,
            anonymous_enabled: false,
            anonymous_home: String::from("/pub"),
            passwd_file: None,
            max_login_failures: DEFAULT_MAX_LOGIN_FAILURES,
            login_failure_delay_ms: DEFAULT_LOGIN_FAILURE_DELAY_MS,
            max_logins: DEFAULT_MAX_LOGINS,
            upload_buffer_size: Some(DEFAULT_UPLOAD_BUFFER_SIZE),
            download_buffer_size: Some(DEFAULT_DOWNLOAD_BUFFER_SIZE),
        }
    }
}

impl ServerConfig {
    pub fn upload_buffer_size(&self) -> usize {
        self.upload_buffer_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_UPLOAD_BUFFER_SIZE)
    }

    pub fn download_buffer_size(&self) -> usize {
        self.download_buffer_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_DOWNLOAD_BUFFER_SIZE)
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("Failed to parse configuration")?;
        Ok(config)
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path))?;
        Ok(config)
    }

    pub fn log_config(&self) {
        info!("  Listen Address: {}:{}", self.server.listen_address, self.server.listen_port);
        info!("  Chroot Directory: {}", self.server.chroot_dir);
        info!("  Anonymous Login: {}", self.server.anonymous_enabled);
        info!("  Configured Users: {}", self.users.len());
        info!("  Max Logins: {}", self.server.max_logins);
        info!(
            "  Max Login Failures: {} (delay {} ms)",
            self.server.max_login_failures, self.server.login_failure_delay_ms
        );
        info!("  Passive Ports: {}", self.data_connection.passive_ports);
        info!("  Active Mode: {}", self.data_connection.active_enabled);
        info!(
            "  Upload Buffer Size: {} KB",
            self.server.upload_buffer_size() / 1024
        );
        info!(
            "  Download Buffer Size: {} KB",
            self.server.download_buffer_size() / 1024
        );
    }
}
