use crate::core_fs::{FileSystemView, FtpFile};
use crate::core_ftpcommand::error::FtpError;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_ftpcommand::utils::send_error;
use crate::helpers::normalize_path;
use crate::session::Session;
use chrono::{Duration, Local};
use log::{debug, warn};
use regex::Regex;
use std::io;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    /// One name per line (NLST).
    Names,
    /// `ls -l` style lines (LIST).
    Long,
}

/// A parsed listing argument: `[-options] [path]`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListArgument {
    pub show_hidden: bool,
    pub long: bool,
    pub path: Option<String>,
    pub pattern: Option<String>,
}

impl ListArgument {
    pub fn parse(argument: Option<&str>) -> Result<Self, FtpError> {
        let mut parsed = ListArgument::default();
        let mut path: Option<&str> = None;

        for token in argument.unwrap_or("").split_whitespace() {
            if let Some(options) = token.strip_prefix('-').filter(|o| !o.is_empty()) {
                parsed.show_hidden |= options.contains('a');
                parsed.long |= options.contains('l');
            } else if path.replace(token).is_some() {
                return Err(FtpError::Syntax(format!("more than one path in \"{}\"", token)));
            }
        }

        if let Some(path) = path {
            match path.rsplit_once('/') {
                Some((dir, last)) if is_pattern(last) => {
                    parsed.path = Some(if dir.is_empty() { "/".to_string() } else { dir.to_string() });
                    parsed.pattern = Some(last.to_string());
                }
                None if is_pattern(path) => parsed.pattern = Some(path.to_string()),
                _ => parsed.path = Some(path.to_string()),
            }
        }
        Ok(parsed)
    }
}

fn is_pattern(segment: &str) -> bool {
    segment.contains(['*', '?'])
}

/// Compiles a `*`/`?` wildcard into an anchored regex.
fn compile_pattern(pattern: &str) -> Result<Regex, FtpError> {
    let mut expression = String::from("^");
    for c in pattern.chars() {
        match c {
            '*' => expression.push_str(".*"),
            '?' => expression.push('.'),
            other => expression.push_str(&regex::escape(&other.to_string())),
        }
    }
    expression.push('$');
    Regex::new(&expression).map_err(|e| FtpError::Syntax(e.to_string()))
}

/// Builds the listing text for `argument` relative to `current_dir`.
pub async fn list_files(
    fs: &dyn FileSystemView,
    current_dir: &str,
    argument: &ListArgument,
    format: ListFormat,
) -> Result<String, FtpError> {
    let path = normalize_path(current_dir, argument.path.as_deref().unwrap_or("."));
    let target = fs.file(&path).await.map_err(FtpError::LocalIo)?;
    if !target.does_exist() {
        return Err(FtpError::Syntax(format!("{} does not exist", path)));
    }

    let files = if target.is_directory() {
        let pattern = argument.pattern.as_deref().map(compile_pattern).transpose()?;
        fs.list(&target)
            .await
            .map_err(FtpError::LocalIo)?
            .into_iter()
            .filter(|f| argument.show_hidden || !f.is_hidden())
            .filter(|f| pattern.as_ref().map(|p| p.is_match(f.name())).unwrap_or(true))
            .collect()
    } else if argument.pattern.is_some() {
        return Err(FtpError::Syntax(format!("{} is not a directory", path)));
    } else {
        vec![target]
    };

    let long = format == ListFormat::Long || argument.long;
    let mut listing = String::new();
    for file in &files {
        if long {
            listing.push_str(&long_line(file));
        } else {
            listing.push_str(file.name());
        }
        listing.push_str("\r\n");
    }
    Ok(listing)
}

fn long_line(file: &FtpFile) -> String {
    let kind = if file.is_directory() { 'd' } else { '-' };
    let read = if file.is_readable() { 'r' } else { '-' };
    let write = if file.is_writable() { 'w' } else { '-' };
    let exec = if file.is_directory() { 'x' } else { '-' };

    let date = match file.modified() {
        Some(modified) if Local::now() - modified < Duration::days(180) => {
            modified.format("%b %e %H:%M").to_string()
        }
        Some(modified) => modified.format("%b %e  %Y").to_string(),
        None => String::from("Jan  1  1970"),
    };

    format!(
        "{kind}{read}{write}{exec}{read}-{exec}{read}-{exec}   1 user group {:>12} {} {}",
        file.size(),
        date,
        file.name()
    )
}

/// Sends a listing over the data connection: 150, then the listing and 226.
///
/// The data connection is closed on every path before the final reply. A listing
/// syntax error is reported with 501 once the connection is closed and still ends with
/// 226, since nothing failed on the data connection itself.
pub async fn send_listing(
    session: &mut Session,
    request: &FtpRequest,
    out: &mut FtpWriter,
    format: ListFormat,
) -> io::Result<()> {
    let Some(fs) = session.file_system.as_deref() else {
        return out.send(530, "Not logged in.").await;
    };

    out.send(150, "File status okay; about to open data connection.").await?;

    // Open the data connection, the listing is only built once a client is there
    let mut channel = match session.data_connection.open().await {
        Ok(channel) => channel,
        Err(e) => {
            warn!("{} from {}: {}", request.verb(), session.peer_addr, e);
            let (code, text) = e.to_ftp_response();
            return out.send(code, text).await;
        }
    };

    // Build the listing
    let listing = match ListArgument::parse(request.argument()) {
        Ok(argument) => list_files(fs, &session.current_dir, &argument, format).await,
        Err(e) => Err(e),
    };

    let listing = match listing {
        Ok(listing) => listing,
        Err(e) => {
            drop(channel);
            debug!("{} {:?} failed: {}", request.verb(), request.argument(), e);
            send_error(out, &e).await?;
            if matches!(e, FtpError::Syntax(_)) {
                return out.send(226, "Closing data connection.").await;
            }
            return Ok(());
        }
    };

    // Send it and close the data connection
    let sent = match channel.stream().write_all(listing.as_bytes()).await {
        Ok(()) => channel.finish().await,
        Err(e) => {
            drop(channel);
            Err(e)
        }
    };

    match sent {
        Ok(()) => out.send(226, "Closing data connection.").await,
        Err(e) => send_error(out, &FtpError::TransferAborted(e)).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_fs::NativeFileSystemView;

    #[test]
    fn test_parse_options_and_path() {
        let parsed = ListArgument::parse(Some("-la /pub")).unwrap();
        assert!(parsed.show_hidden);
        assert!(parsed.long);
        assert_eq!(parsed.path.as_deref(), Some("/pub"));
        assert!(parsed.pattern.is_none());

        assert_eq!(ListArgument::parse(None).unwrap(), ListArgument::default());
    }

    #[test]
    fn test_parse_wildcard() {
        let parsed = ListArgument::parse(Some("/pub/*.txt")).unwrap();
        assert_eq!(parsed.path.as_deref(), Some("/pub"));
        assert_eq!(parsed.pattern.as_deref(), Some("*.txt"));

        let parsed = ListArgument::parse(Some("a?c")).unwrap();
        assert!(parsed.path.is_none());
        assert_eq!(parsed.pattern.as_deref(), Some("a?c"));
    }

    #[test]
    fn test_parse_rejects_two_paths() {
        assert!(matches!(
            ListArgument::parse(Some("a b")),
            Err(FtpError::Syntax(_))
        ));
    }

    #[test]
    fn test_wildcard_is_literal_otherwise() {
        let regex = compile_pattern("a.b*").unwrap();
        assert!(regex.is_match("a.bcd"));
        assert!(!regex.is_match("axbcd"));
    }

    #[tokio::test]
    async fn test_list_names_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.txt", "b.log", ".hidden"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let view = NativeFileSystemView::new(dir.path().to_path_buf(), true);

        let all = ListArgument::parse(None).unwrap();
        let listing = list_files(&view, "/", &all, ListFormat::Names).await.unwrap();
        assert_eq!(listing, "a.txt\r\nb.log\r\n");

        let hidden = ListArgument::parse(Some("-a")).unwrap();
        let listing = list_files(&view, "/", &hidden, ListFormat::Names).await.unwrap();
        assert_eq!(listing, ".hidden\r\na.txt\r\nb.log\r\n");

        let txt = ListArgument::parse(Some("*.txt")).unwrap();
        let listing = list_files(&view, "/", &txt, ListFormat::Names).await.unwrap();
        assert_eq!(listing, "a.txt\r\n");

        let long = list_files(&view, "/", &txt, ListFormat::Long).await.unwrap();
        assert!(long.starts_with("-rw-r--r--"));
        assert!(long.trim_end().ends_with(" a.txt"));
    }

    #[tokio::test]
    async fn test_list_missing_path_is_syntax_error() {
        let dir = tempfile::tempdir().unwrap();
        let view = NativeFileSystemView::new(dir.path().to_path_buf(), true);
        let missing = ListArgument::parse(Some("nowhere")).unwrap();
        assert!(matches!(
            list_files(&view, "/", &missing, ListFormat::Names).await,
            Err(FtpError::Syntax(_))
        ));
    }
}
