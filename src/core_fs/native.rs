use crate::core_auth::User;
use crate::core_fs::{
    FileKind, FileReader, FileSystemFactory, FileSystemView, FileWriter, FtpFile,
};
use crate::helpers::{join_path, normalize_path};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use log::{debug, info};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// A view onto a directory of the local file system.
#[derive(Debug, Clone)]
pub struct NativeFileSystemView {
    root: PathBuf,
    writable: bool,
}

impl NativeFileSystemView {
    pub fn new(root: PathBuf, writable: bool) -> Self {
        Self { root, writable }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn real_path(&self, path: &str) -> PathBuf {
        let path = normalize_path("/", path);
        self.root.join(path.trim_start_matches('/'))
    }
}

#[async_trait]
impl FileSystemView for NativeFileSystemView {
    async fn file(&self, path: &str) -> io::Result<FtpFile> {
        let path = normalize_path("/", path);
        match fs::metadata(self.real_path(&path)).await {
            Ok(meta) => {
                let kind = if meta.is_dir() {
                    FileKind::Directory
                } else {
                    FileKind::File
                };
                let modified = meta.modified().ok().map(DateTime::<Local>::from);
                let writable = self.writable && !meta.permissions().readonly();
                Ok(FtpFile::new(path, kind, meta.len(), modified, true, writable))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Ok(FtpFile::missing(path, self.writable))
            }
            Err(e) => Err(e),
        }
    }

    async fn list(&self, dir: &FtpFile) -> io::Result<Vec<FtpFile>> {
        let mut entries = fs::read_dir(self.real_path(dir.path())).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            files.push(self.file(&join_path(dir.path(), &name)).await?);
        }
        files.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(files)
    }

    async fn delete(&self, file: &FtpFile) -> io::Result<()> {
        fs::remove_file(self.real_path(file.path())).await
    }

    async fn make_directory(&self, dir: &FtpFile) -> io::Result<()> {
        fs::create_dir(self.real_path(dir.path())).await
    }

    async fn remove_directory(&self, dir: &FtpFile) -> io::Result<()> {
        fs::remove_dir(self.real_path(dir.path())).await
    }

    async fn rename(&self, from: &FtpFile, to: &FtpFile) -> io::Result<()> {
        fs::rename(self.real_path(from.path()), self.real_path(to.path())).await
    }

    async fn open_read(&self, file: &FtpFile) -> io::Result<FileReader> {
        let handle = fs::File::open(self.real_path(file.path())).await?;
        Ok(Box::new(handle))
    }

    async fn open_write(&self, file: &FtpFile) -> io::Result<FileWriter> {
        let handle = fs::File::create(self.real_path(file.path())).await?;
        Ok(Box::new(handle))
    }
}

/// Roots every user's view at `chroot` joined with the user's home directory.
#[derive(Debug, Clone)]
pub struct NativeFileSystemFactory {
    chroot: PathBuf,
    create_home: bool,
}

impl NativeFileSystemFactory {
    pub fn new(chroot: impl Into<PathBuf>, create_home: bool) -> Self {
        Self {
            chroot: chroot.into(),
            create_home,
        }
    }
}

#[async_trait]
impl FileSystemFactory for NativeFileSystemFactory {
    async fn create_view(&self, user: &User) -> io::Result<Box<dyn FileSystemView>> {
        let home = normalize_path("/", &user.home_dir);
        let root = self.chroot.join(home.trim_start_matches('/'));

        if !fs::try_exists(&root).await? {
            if !self.create_home {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("home directory {} of {} does not exist", home, user.name),
                ));
            }
            info!("Creating home directory {:?} for {}", root, user.name);
            fs::create_dir_all(&root).await?;
        }

        debug!("File system view of {} rooted at {:?}", user.name, root);
        Ok(Box::new(NativeFileSystemView::new(
            root,
            user.write_permission,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn user(home: &str, write: bool) -> User {
        User {
            name: "alice".to_string(),
            home_dir: home.to_string(),
            write_permission: write,
            anonymous: false,
        }
    }

    #[tokio::test]
    async fn test_file_kinds() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"abc").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let view = NativeFileSystemView::new(dir.path().to_path_buf(), true);

        let file = view.file("/a.txt").await.unwrap();
        assert!(file.is_file());
        assert_eq!(file.size(), 3);
        assert!(file.modified().is_some());

        assert!(view.file("sub").await.unwrap().is_directory());
        assert!(!view.file("/missing").await.unwrap().does_exist());
        assert!(view.file("/").await.unwrap().is_root());
    }

    #[tokio::test]
    async fn test_paths_cannot_escape_root() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret"), b"x").unwrap();
        let root = outer.path().join("root");
        std::fs::create_dir(&root).unwrap();
        let view = NativeFileSystemView::new(root, true);

        let file = view.file("/../secret").await.unwrap();
        assert_eq!(file.path(), "/secret");
        assert!(!file.does_exist());
    }

    #[tokio::test]
    async fn test_list_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b"), b"").unwrap();
        std::fs::write(dir.path().join("a"), b"").unwrap();
        let view = NativeFileSystemView::new(dir.path().to_path_buf(), false);

        let root = view.file("/").await.unwrap();
        let names: Vec<String> = view
            .list(&root)
            .await
            .unwrap()
            .iter()
            .map(|f| f.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_write_read_rename_delete() {
        let dir = tempfile::tempdir().unwrap();
        let view = NativeFileSystemView::new(dir.path().to_path_buf(), true);

        let target = view.file("/new.txt").await.unwrap();
        let mut writer = view.open_write(&target).await.unwrap();
        writer.write_all(b"payload").await.unwrap();
        writer.shutdown().await.unwrap();

        let from = view.file("/new.txt").await.unwrap();
        let to = view.file("/moved.txt").await.unwrap();
        view.rename(&from, &to).await.unwrap();

        let moved = view.file("/moved.txt").await.unwrap();
        let mut content = String::new();
        view.open_read(&moved)
            .await
            .unwrap()
            .read_to_string(&mut content)
            .await
            .unwrap();
        assert_eq!(content, "payload");

        view.delete(&moved).await.unwrap();
        assert!(!view.file("/moved.txt").await.unwrap().does_exist());
    }

    #[tokio::test]
    async fn test_read_only_view() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), b"abc").unwrap();
        let view = NativeFileSystemView::new(dir.path().to_path_buf(), false);
        assert!(!view.file("/a.txt").await.unwrap().has_delete_permission());
    }

    #[tokio::test]
    async fn test_factory_creates_home() {
        let dir = tempfile::tempdir().unwrap();
        let factory = NativeFileSystemFactory::new(dir.path(), true);
        let view = factory.create_view(&user("/home/alice", true)).await.unwrap();
        assert!(dir.path().join("home/alice").is_dir());
        assert!(view.file("/").await.unwrap().is_directory());

        let strict = NativeFileSystemFactory::new(dir.path(), false);
        assert!(strict.create_view(&user("/nowhere", true)).await.is_err());
    }
}
