use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "ftpletd", about = "An FTP server with pluggable command hooks.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Override the control port from the configuration file
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}
