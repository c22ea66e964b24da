use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use ftpletd::constants::DEFAULT_CONFIG_PATH;
use ftpletd::core_cli::Cli;
use ftpletd::core_ftplet::FtpletChain;
use ftpletd::{server, Config, FtpServerContext};
use log::info;
use std::io::Write;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    // Initialize the logger with a custom format
    let default_level = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    // Load configuration from the TOML file
    let config_path = if args.config.is_empty() {
        DEFAULT_CONFIG_PATH
    } else {
        args.config.as_str()
    };
    let mut config = Config::load_from_file(config_path)?;
    info!("Loaded configuration from {}", config_path);

    // Override the control port from CLI if provided
    if let Some(port) = args.port {
        config.server.listen_port = port;
    }

    let context = FtpServerContext::from_config(config, FtpletChain::new())?;
    server::run(Arc::new(context)).await
}
