use crate::config::Config;
use crate::core_auth::{ConfigUserManager, UserManager};
use crate::core_fs::{FileSystemFactory, NativeFileSystemFactory};
use crate::core_ftpcommand::handlers::{initialize_command_handlers, CommandRegistry};
use crate::core_ftplet::FtpletChain;
use crate::core_network::data_config::DataConnectionConfig;
use crate::core_network::network;
use crate::core_stats::FtpStatistics;
use crate::core_tls::SslConfiguration;
use crate::helpers::load_banner;
use anyhow::{Context, Result};
use log::{error, info, warn};
use std::sync::Arc;

/// Everything the sessions of one listener share.
pub struct FtpServerContext {
    pub config: Arc<Config>,
    pub data_config: Arc<DataConnectionConfig>,
    pub user_manager: Arc<dyn UserManager>,
    pub file_system: Arc<dyn FileSystemFactory>,
    pub ftplets: FtpletChain,
    pub statistics: Arc<FtpStatistics>,
    pub commands: CommandRegistry,
    pub banner: String,
}

impl FtpServerContext {
    pub fn new(
        config: Config,
        ssl: Option<SslConfiguration>,
        user_manager: Arc<dyn UserManager>,
        file_system: Arc<dyn FileSystemFactory>,
        ftplets: FtpletChain,
    ) -> Result<Self> {
        let data_config = config
            .data_connection
            .build(ssl)
            .context("Invalid [data_connection] configuration")?;

        let banner = match &config.server.banner_file {
            Some(path) => match load_banner(path) {
                Ok(banner) => banner,
                Err(e) => {
                    warn!("Using the default banner: {:#}", e);
                    config.server.banner.clone()
                }
            },
            None => config.server.banner.clone(),
        };

        Ok(Self {
            config: Arc::new(config),
            data_config: Arc::new(data_config),
            user_manager,
            file_system,
            ftplets,
            statistics: Arc::new(FtpStatistics::new()),
            commands: initialize_command_handlers(),
            banner,
        })
    }

    /// Builds the default context: configured accounts and a native file system under
    /// the chroot directory.
    pub fn from_config(config: Config, ftplets: FtpletChain) -> Result<Self> {
        let mut users = ConfigUserManager::new(&config.users);
        if config.server.anonymous_enabled {
            users = users.with_anonymous(&config.server.anonymous_home);
        }
        if let Some(path) = &config.server.passwd_file {
            users = users
                .with_passwd_file(path)
                .with_context(|| format!("Failed to load passwd file: {}", path))?;
        }
        info!("{} account(s) configured", users.user_count());

        let file_system =
            NativeFileSystemFactory::new(&config.server.chroot_dir, config.server.create_home);
        Self::new(config, None, Arc::new(users), Arc::new(file_system), ftplets)
    }
}

/// Runs the FTP server until the listener fails.
///
/// # Arguments
///
/// * `context` - The shared server context.
///
/// # Returns
///
/// Result<(), anyhow::Error> indicating the success or failure of the operation.
pub async fn run(context: Arc<FtpServerContext>) -> Result<()> {
    context.config.log_config();

    match network::start_server(Arc::clone(&context)).await {
        Ok(_) => info!("Server stopped."),
        Err(e) => {
            error!("Server failed: {:#}", e);
            return Err(e);
        }
    }

    info!("{}", context.statistics.snapshot().format_stats());
    Ok(())
}
