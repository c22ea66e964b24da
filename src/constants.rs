// src/constants.rs

pub const DEFAULT_CONFIG_PATH: &str = "/etc/ftpletd.toml";
pub const DEFAULT_BANNER: &str = "ftpletd ready.";
pub const SYSTEM_TYPE: &str = "UNIX Type: L8";
pub const DEFAULT_MAX_COMMAND_LENGTH: usize = 2048;
pub const DEFAULT_CONTROL_IDLE_SECS: u64 = 600;
pub const DEFAULT_MAX_LOGIN_FAILURES: u32 = 3;
pub const DEFAULT_LOGIN_FAILURE_DELAY_MS: u64 = 500;
pub const DEFAULT_MAX_LOGINS: u64 = 10;
pub const DEFAULT_UPLOAD_BUFFER_SIZE: usize = 256 * 1024;
pub const DEFAULT_DOWNLOAD_BUFFER_SIZE: usize = 128 * 1024;
pub const FEATURES: [&str; 5] = ["EPSV", "PASV", "PBSZ", "PROT", "UTF8"];
