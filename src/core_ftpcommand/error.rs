// Error taxonomy of command execution
use crate::core_network::error::DataConnectionError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FtpError {
    #[error("Syntax error in parameters or arguments: {0}")]
    Syntax(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Cannot open data connection: {0}")]
    DataConnection(#[from] DataConnectionError),

    #[error("Connection closed, transfer aborted: {0}")]
    TransferAborted(io::Error),

    #[error("Local error in processing: {0}")]
    LocalIo(io::Error),
}

impl FtpError {
    pub fn to_ftp_response(&self) -> (u16, String) {
        match self {
            FtpError::Syntax(_) => (501, "Syntax error in parameters or arguments.".to_string()),
            FtpError::NotFound(name) => (550, format!("{}: No such file or directory.", name)),
            FtpError::PermissionDenied(name) => (450, format!("{}: Permission denied.", name)),
            FtpError::DataConnection(e) => {
                let (code, text) = e.to_ftp_response();
                (code, text.to_string())
            }
            FtpError::TransferAborted(_) => (426, "Connection closed; transfer aborted.".to_string()),
            FtpError::LocalIo(_) => (551, "Requested action aborted. Local error in processing.".to_string()),
        }
    }
}
