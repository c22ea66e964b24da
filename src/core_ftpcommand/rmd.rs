use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use log::{info, warn};
use std::io;

/// Handles the RMD (Remove Directory) FTP command. Only empty directories are removed.
pub struct Rmd;

#[async_trait]
impl Command for Rmd {
    async fn execute(
        &self,
        ctx: &FtpServerContext,
        session: &mut Session,
        request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        let Some(dir_name) = request.argument() else {
            return out.send(501, "Syntax error in parameters or arguments.").await;
        };
        let Some(fs) = session.file_system.as_deref() else {
            return out.send(530, "Not logged in.").await;
        };

        let path = session.resolve(dir_name);
        let dir = match fs.file(&path).await {
            Ok(dir) => dir,
            Err(e) => {
                warn!("RMD {}: {}", path, e);
                return out.send(550, &format!("{}: Not a directory.", path)).await;
            }
        };

        if !dir.is_directory() {
            return out.send(550, &format!("{}: Not a directory.", path)).await;
        }
        if !dir.has_delete_permission() || path == session.current_dir {
            return out.send(550, &format!("{}: Permission denied.", path)).await;
        }

        match fs.remove_directory(&dir).await {
            Ok(()) => {
                out.send(250, &format!("Requested file action okay, removed {}.", path))
                    .await?;
                info!("Directory remove : {} - {}", session.user_name(), path);
                ctx.statistics.set_rmdir();
                Ok(())
            }
            Err(e) => {
                warn!("Failed to remove {}: {}", path, e);
                out.send(450, &format!("{}: Can't remove directory.", path)).await
            }
        }
    }
}
