use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
    Missing,
}

/// A file as seen through a [`FileSystemView`](crate::core_fs::FileSystemView).
///
/// Paths are virtual: normalized and rooted at the user's home.
#[derive(Debug, Clone)]
pub struct FtpFile {
    path: String,
    kind: FileKind,
    size: u64,
    modified: Option<DateTime<Local>>,
    readable: bool,
    writable: bool,
}

impl FtpFile {
    pub fn new(
        path: String,
        kind: FileKind,
        size: u64,
        modified: Option<DateTime<Local>>,
        readable: bool,
        writable: bool,
    ) -> Self {
        Self {
            path,
            kind,
            size,
            modified,
            readable,
            writable,
        }
    }

    pub fn missing(path: String, writable: bool) -> Self {
        Self::new(path, FileKind::Missing, 0, None, false, writable)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last path segment, `/` for the root.
    pub fn name(&self) -> &str {
        match self.path.rsplit('/').next() {
            Some(name) if !name.is_empty() => name,
            _ => "/",
        }
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == FileKind::Directory
    }

    pub fn does_exist(&self) -> bool {
        self.kind != FileKind::Missing
    }

    pub fn is_hidden(&self) -> bool {
        self.name().starts_with('.')
    }

    pub fn is_root(&self) -> bool {
        self.path == "/"
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn modified(&self) -> Option<DateTime<Local>> {
        self.modified
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn has_delete_permission(&self) -> bool {
        self.writable && !self.is_root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_root() {
        let file = FtpFile::new("/pub/a.txt".into(), FileKind::File, 3, None, true, true);
        assert_eq!(file.name(), "a.txt");
        assert!(file.has_delete_permission());

        let root = FtpFile::new("/".into(), FileKind::Directory, 0, None, true, true);
        assert_eq!(root.name(), "/");
        assert!(!root.has_delete_permission());
    }

    #[test]
    fn test_missing_file() {
        let file = FtpFile::missing("/nothing".into(), true);
        assert!(!file.does_exist());
        assert!(!file.is_file());
        assert!(!file.is_directory());
    }
}
