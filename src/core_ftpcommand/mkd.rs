use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use log::{info, warn};
use std::io;

/// Handles the MKD (Make Directory) FTP command.
pub struct Mkd;

#[async_trait]
impl Command for Mkd {
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
                warn!("MKD {}: {}", path, e);
                return out.send(550, &format!("{}: Cannot create directory.", path)).await;
            }
        };

        if dir.does_exist() {
            return out.send(550, &format!("{}: Already exists.", path)).await;
        }
        if !dir.is_writable() {
            return out.send(550, &format!("{}: Permission denied.", path)).await;
        }

        match fs.make_directory(&dir).await {
            Ok(()) => {
                out.send(257, &format!("\"{}\" created.", path.replace('"', "\"\"")))
                    .await?;
                info!("Directory create : {} - {}", session.user_name(), path);
                ctx.statistics.set_mkdir();
                Ok(())
            }
            Err(e) => {
                warn!("Failed to create {}: {}", path, e);
                out.send(550, &format!("{}: Cannot create directory.", path)).await
            }
        }
    }
}
