pub mod file;
pub mod native;

pub use file::{FileKind, FtpFile};
pub use native::{NativeFileSystemFactory, NativeFileSystemView};

use crate::core_auth::User;
use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncRead, AsyncWrite};

pub type FileReader = Box<dyn AsyncRead + Send + Unpin>;
pub type FileWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// A logged-in user's view of the file system.
///
/// Every path handed in is a normalized virtual path (see
/// [`normalize_path`](crate::helpers::normalize_path)).
#[async_trait]
pub trait FileSystemView: Send + Sync {
    async fn file(&self, path: &str) -> io::Result<FtpFile>;

    async fn list(&self, dir: &FtpFile) -> io::Result<Vec<FtpFile>>;

    async fn delete(&self, file: &FtpFile) -> io::Result<()>;

    async fn make_directory(&self, dir: &FtpFile) -> io::Result<()>;

    async fn remove_directory(&self, dir: &FtpFile) -> io::Result<()>;

    async fn rename(&self, from: &FtpFile, to: &FtpFile) -> io::Result<()>;

    async fn open_read(&self, file: &FtpFile) -> io::Result<FileReader>;

    async fn open_write(&self, file: &FtpFile) -> io::Result<FileWriter>;
}

/// Creates the view of a user at login.
#[async_trait]
pub trait FileSystemFactory: Send + Sync {
    async fn create_view(&self, user: &User) -> io::Result<Box<dyn FileSystemView>>;
}
