use anyhow::{Context, Result};
use log::{error, info};
use std::fs;

/// Resolves `arg` against `current_dir` into a normalized, `/`-rooted virtual path.
///
/// `.` and empty segments vanish, `..` pops one segment and stops at the root, and
/// backslashes count as separators.
pub fn normalize_path(current_dir: &str, arg: &str) -> String {
    let arg = arg.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();

    let base = if arg.starts_with('/') { "" } else { current_dir };
    for segment in base.split('/').chain(arg.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    format!("/{}", segments.join("/"))
}

/// Joins a name onto a normalized directory path.
pub fn join_path(dir: &str, name: &str) -> String {
    normalize_path(dir, name)
}

/// Parent directory of a normalized path; the root is its own parent.
pub fn parent_path(path: &str) -> String {
    normalize_path(path, "..")
}

pub fn load_banner(path: &str) -> Result<String> {
    let banner = fs::read_to_string(path)
        .map_err(|e| {
            error!("Failed to read banner file: {}: {}", path, e);
            anyhow::Error::new(e)
        })
        .with_context(|| format!("Failed to read banner file: {}", path))?;

    if banner.trim().is_empty() {
        error!("Banner file is empty: {}", path);
        return Err(anyhow::Error::msg("Banner file is empty."));
    }

    info!("Banner file loaded successfully: {}", path);
    Ok(banner)
}
