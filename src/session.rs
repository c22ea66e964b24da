use crate::core_auth::User;
use crate::core_fs::FileSystemView;
use crate::core_network::data_connection::DataConnection;
use crate::helpers::normalize_path;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use std::net::SocketAddr;

/// Representation type selected with TYPE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Ascii,
    Ebcdic,
    Image,
    Local(u8),
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Ascii => "ASCII",
            DataType::Ebcdic => "EBCDIC",
            DataType::Image => "BINARY",
            DataType::Local(_) => "LOCAL",
        }
    }
}

/// State of one control connection. Owned by the task serving that connection.
pub struct Session {
    pub peer_addr: SocketAddr,
    pub local_addr: SocketAddr,
    /// Name sent with USER, waiting for PASS.
    pub user_argument: Option<String>,
    pub user: Option<User>,
    pub current_dir: String,
    pub rename_from: Option<String>,
    pub data_type: DataType,
    pub data_connection: DataConnection,
    pub file_system: Option<Box<dyn FileSystemView>>,
    /// Free-form values for ftplets.
    pub attributes: HashMap<String, String>,
    pub login_time: Option<DateTime<Local>>,
    pub failed_logins: u32,
    pub closing: bool,
}

impl Session {
    pub fn new(data_connection: DataConnection, local_addr: SocketAddr, peer_addr: SocketAddr) -> Self {
        Self {
            peer_addr,
            local_addr,
            user_argument: None,
            user: None,
            current_dir: String::from("/"),
            rename_from: None,
            data_type: DataType::Ascii,
            data_connection,
            file_system: None,
            attributes: HashMap::new(),
            login_time: None,
            failed_logins: 0,
            closing: false,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn is_anonymous(&self) -> bool {
        self.user.as_ref().map(|u| u.anonymous).unwrap_or(false)
    }

    pub fn user_name(&self) -> &str {
        self.user
            .as_ref()
            .map(|u| u.name.as_str())
            .or(self.user_argument.as_deref())
            .unwrap_or("-")
    }

    /// Clears the state that only survives into the next command of a sequence.
    pub fn reset_state(&mut self) {
        self.rename_from = None;
    }

    pub fn login(&mut self, user: User, file_system: Box<dyn FileSystemView>) {
        self.user_argument = None;
        self.user = Some(user);
        self.file_system = Some(file_system);
        self.current_dir = String::from("/");
        self.login_time = Some(Local::now());
        self.failed_logins = 0;
    }

    /// Forgets the logged-in user. Returns the user that was logged in.
    pub fn logout(&mut self) -> Option<User> {
        self.file_system = None;
        self.login_time = None;
        self.rename_from = None;
        self.current_dir = String::from("/");
        self.user.take()
    }

    /// Resolves a command argument against the working directory.
    pub fn resolve(&self, arg: &str) -> String {
        normalize_path(&self.current_dir, arg)
    }
}
