use crate::core_auth::error::AuthError;
use crate::core_auth::helper::{load_passwd_file, verify_password};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const ANONYMOUS_NAMES: [&str; 2] = ["anonymous", "ftp"];

/// An authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub home_dir: String,
    pub write_permission: bool,
    pub anonymous: bool,
}

/// One `[[users]]` entry of the configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserConfig {
    pub name: String,
    /// bcrypt hash of the password.
    pub password_hash: String,
    #[serde(default = "default_home")]
    pub home: String,
    #[serde(default = "default_write")]
    pub write: bool,
}

fn default_home() -> String {
    String::from("/")
}

fn default_write() -> bool {
    true
}

#[derive(Debug, Clone)]
pub struct PasswdEntry {
    username: String,
    hashed_password: String,
}

impl PasswdEntry {
    pub fn from_line(line: &str) -> Option<Self> {
        let (username, hashed_password) = line.split_once(':')?;
        if username.is_empty() || hashed_password.is_empty() || hashed_password.contains(':') {
            return None;
        }
        Some(PasswdEntry {
            username: username.to_string(),
            hashed_password: hashed_password.to_string(),
        })
    }

    pub fn get_hashed_password(&self) -> &str {
        &self.hashed_password
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }
}

/// User store consulted by USER/PASS.
pub trait UserManager: Send + Sync {
    fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError>;

    fn does_exist(&self, username: &str) -> bool;

    fn is_anonymous_enabled(&self) -> bool;

    fn is_anonymous_name(&self, username: &str) -> bool {
        ANONYMOUS_NAMES
            .iter()
            .any(|name| name.eq_ignore_ascii_case(username))
    }
}

/// Accounts from the configuration file, optionally merged with a passwd file.
#[derive(Debug, Default)]
pub struct ConfigUserManager {
    users: HashMap<String, UserConfig>,
    anonymous_home: Option<String>,
}

impl ConfigUserManager {
    pub fn new(users: &[UserConfig]) -> Self {
        let users = users
            .iter()
            .map(|user| (user.name.clone(), user.clone()))
            .collect();
        Self {
            users,
            anonymous_home: None,
        }
    }

    /// Allows anonymous logins, read-only, rooted at `home`.
    pub fn with_anonymous(mut self, home: &str) -> Self {
        self.anonymous_home = Some(home.to_string());
        self
    }

    /// Adds the accounts of a `user:hash` file. Entries already configured win.
    pub fn with_passwd_file(mut self, path: &str) -> Result<Self, AuthError> {
        for (name, entry) in load_passwd_file(path)? {
            self.users.entry(name.clone()).or_insert_with(|| UserConfig {
                name,
                password_hash: entry.get_hashed_password().to_string(),
                home: default_home(),
                write: default_write(),
            });
        }
        Ok(self)
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

impl UserManager for ConfigUserManager {
    fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        if self.is_anonymous_name(username) {
            let home = self
                .anonymous_home
                .as_ref()
                .ok_or(AuthError::AnonymousDisabled)?;
            info!("Anonymous login, password \"{}\"", password);
            return Ok(User {
                name: username.to_ascii_lowercase(),
                home_dir: home.clone(),
                write_permission: false,
                anonymous: true,
            });
        }

        let entry = self
            .users
            .get(username)
            .ok_or_else(|| AuthError::UnknownUser(username.to_string()))?;
        if !verify_password(password, &entry.password_hash) {
            debug!("Password mismatch for {}", username);
            return Err(AuthError::InvalidPassword(username.to_string()));
        }

        Ok(User {
            name: entry.name.clone(),
            home_dir: entry.home.clone(),
            write_permission: entry.write,
            anonymous: false,
        })
    }

    fn does_exist(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    fn is_anonymous_enabled(&self) -> bool {
        self.anonymous_home.is_some()
    }
}
