// Error handling for data connections
use std::io;
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataConnectionError {
    #[error("no passive port available")]
    PortUnavailable,

    #[error("no data connection mode set, use PORT or PASV first")]
    NoDataMode,

    #[error("active mode data connections are disabled")]
    ActiveDisabled,

    #[error("data connection address {actual} does not match control connection peer {expected}")]
    IpCheckFailed { expected: IpAddr, actual: IpAddr },

    #[error("data connection not established within {0:?}")]
    Timeout(Duration),

    #[error("secure data connection requested but SSL is not configured")]
    SslNotConfigured,

    #[error("SSL handshake on data connection failed: {0}")]
    Tls(io::Error),

    #[error("data connection I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid passive port specification: {0}")]
    InvalidPortSpec(String),

    #[error("invalid data connection settings: {0}")]
    InvalidSettings(String),
}

impl DataConnectionError {
    /// Every establishment failure is reported as "can't open data connection".
    pub fn to_ftp_response(&self) -> (u16, &'static str) {
        (425, "Can't open data connection.")
    }
}
