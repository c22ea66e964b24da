use crate::core_auth::core_auth::PasswdEntry;
use crate::core_auth::error::AuthError;
use bcrypt::{hash, verify, DEFAULT_COST};
use log::{info, warn};
use std::collections::HashMap;
use std::fs;

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    Ok(hash(password, DEFAULT_COST)?)
}

/// A malformed hash never matches.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    verify(password, hashed_password).unwrap_or(false)
}

/// Reads a `user:bcrypt-hash` file, skipping blank lines, comments and malformed entries.
pub fn load_passwd_file(path: &str) -> Result<HashMap<String, PasswdEntry>, AuthError> {
    let content = fs::read_to_string(path).map_err(|source| AuthError::PasswdFile {
        path: path.to_string(),
        source,
    })?;

    let mut passwd_map = HashMap::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match PasswdEntry::from_line(line) {
            Some(entry) => {
                passwd_map.insert(entry.get_username().to_string(), entry);
            }
            None => warn!("Ignoring malformed line {} in {}", number + 1, path),
        }
    }
    info!("Loaded {} account(s) from {}", passwd_map.len(), path);
    Ok(passwd_map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_hash_then_verify() {
        let hashed = hash_password("secret").unwrap();
        assert!(verify_password("secret", &hashed));
        assert!(!verify_password("wrong", &hashed));
        assert!(!verify_password("secret", "not-a-hash"));
    }

    #[test]
    fn test_load_passwd_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# accounts").unwrap();
        writeln!(file, "alice:$2b$04$abcdefghijklmnopqrstuu").unwrap();
        writeln!(file, "garbage").unwrap();
        writeln!(file).unwrap();

        let path = file.path().to_string_lossy().to_string();
        let entries = load_passwd_file(&path).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key("alice"));
    }

    #[test]
    fn test_missing_passwd_file() {
        assert!(matches!(
            load_passwd_file("/nonexistent/passwd"),
            Err(AuthError::PasswdFile { .. })
        ));
    }
}
