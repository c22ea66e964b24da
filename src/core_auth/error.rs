// Error handling for authentication
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("unknown user: {0}")]
    UnknownUser(String),

    #[error("invalid password for user {0}")]
    InvalidPassword(String),

    #[error("anonymous login is disabled")]
    AnonymousDisabled,

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("failed to read passwd file {path}: {source}")]
    PasswdFile {
        path: String,
        source: std::io::Error,
    },
}

impl AuthError {
    pub fn to_ftp_response(&self) -> (u16, &'static str) {
        match self {
            AuthError::AnonymousDisabled => (530, "Anonymous connection not allowed."),
            _ => (530, "Authentication failed."),
        }
    }
}
