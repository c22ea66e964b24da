pub mod config;
pub mod constants;
pub mod core_auth;
pub mod core_cli;
pub mod core_fs;
pub mod core_ftpcommand;
pub mod core_ftplet;
pub mod core_network;
pub mod core_stats;
pub mod core_tls;
pub mod helpers;
pub mod server;
pub mod session;

pub use config::Config;
pub use server::FtpServerContext;
