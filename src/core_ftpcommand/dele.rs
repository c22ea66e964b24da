use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use log::{info, warn};
use std::io;

/// Handles the DELE (Delete File) FTP command.
///
/// The argument is resolved through the session's file system view. Only existing
/// regular files are deleted, and only when the view grants delete permission.
///
/// # Replies
///
/// * `501` - no file name given.
/// * `550` - the path is not a regular file.
/// * `450` - no permission, or the deletion failed.
/// * `250` - the file was deleted.
pub struct Dele;

#[async_trait]
impl Command for Dele {
    async fn execute(
        &self,
        ctx: &FtpServerContext,
        session: &mut Session,
        request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        let Some(file_name) = request.argument() else {
            return out.send(501, "Syntax error in parameters or arguments.").await;
        };
        let Some(fs) = session.file_system.as_deref() else {
            return out.send(530, "Not logged in.").await;
        };

        let path = session.resolve(file_name);
        let file = match fs.file(&path).await {
            Ok(file) => file,
            Err(e) => {
                warn!("DELE {}: {}", path, e);
                return out.send(550, &format!("{}: Not a plain file.", path)).await;
            }
        };

        if !file.is_file() {
            return out.send(550, &format!("{}: Not a plain file.", path)).await;
        }
        if !file.has_delete_permission() {
            return out
                .send(450, &format!("{}: No permission to delete.", path))
                .await;
        }

        match fs.delete(&file).await {
            Ok(()) => {
                out.send(250, &format!("Requested file action okay, deleted {}.", path))
                    .await?;
                info!("File delete : {} - {}", session.user_name(), path);
                ctx.statistics.set_delete();
                Ok(())
            }
            Err(e) => {
                warn!("Failed to delete {}: {}", path, e);
                out.send(450, &format!("{}: Can't delete file.", path)).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core_ftpcommand::test_support::Harness;

    #[tokio::test]
    async fn test_dele_requires_argument() {
        let mut h = Harness::new().await;
        assert_eq!(h.run("DELE").await, vec![501]);
    }

    #[tokio::test]
    async fn test_dele_existing_file() {
        let mut h = Harness::new().await;
        h.write_file("a.txt", "x");

        assert_eq!(h.run("DELE a.txt").await, vec![250]);
        assert!(!h.path("a.txt").exists());
        assert_eq!(h.ctx.statistics.snapshot().deletes, 1);
    }

    #[tokio::test]
    async fn test_dele_missing_file() {
        let mut h = Harness::new().await;
        assert_eq!(h.run("DELE nothing.txt").await, vec![550]);
        assert_eq!(h.ctx.statistics.snapshot().deletes, 0);
    }

    #[tokio::test]
    async fn test_dele_directory_is_rejected() {
        let mut h = Harness::new().await;
        h.make_dir("sub");
        assert_eq!(h.run("DELE sub").await, vec![550]);
        assert!(h.path("sub").is_dir());
    }

    #[tokio::test]
    async fn test_dele_without_permission() {
        let mut h = Harness::read_only().await;
        h.write_file("a.txt", "x");
        assert_eq!(h.run("DELE a.txt").await, vec![450]);
        assert!(h.path("a.txt").exists());
        assert_eq!(h.ctx.statistics.snapshot().deletes, 0);
    }

    #[tokio::test]
    async fn test_dele_relative_to_working_directory() {
        let mut h = Harness::new().await;
        h.make_dir("pub");
        h.write_file("pub/a.txt", "x");

        assert_eq!(h.run("CWD pub").await, vec![250]);
        assert_eq!(h.run("DELE a.txt").await, vec![250]);
        assert!(!h.path("pub/a.txt").exists());
    }
}
