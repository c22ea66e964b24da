use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use log::{info, warn};
use std::io;

/// Handles the RNTO (Rename To) FTP command.
pub struct Rnto;

#[async_trait]
impl Command for Rnto {
    async fn execute(
        &self,
        _ctx: &FtpServerContext,
        session: &mut Session,
        request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        // RNTO keeps the state of the previous command; consume it here.
        let rename_from = session.rename_from.take();

        let Some(name) = request.argument() else {
            return out.send(501, "Syntax error in parameters or arguments.").await;
        };
        let Some(from_path) = rename_from else {
            return out.send(503, "Bad sequence of commands.").await;
        };
        let Some(fs) = session.file_system.as_deref() else {
            return out.send(530, "Not logged in.").await;
        };

        let to_path = session.resolve(name);
        let (from, to) = match (fs.file(&from_path).await, fs.file(&to_path).await) {
            (Ok(from), Ok(to)) => (from, to),
            _ => return out.send(553, "Requested action not taken.").await,
        };

        if !from.does_exist() || !from.has_delete_permission() || !to.is_writable() {
            return out
                .send(553, &format!("{}: Requested action not taken.", to_path))
                .await;
        }

        match fs.rename(&from, &to).await {
            Ok(()) => {
                info!("File rename : {} - {} -> {}", session.user_name(), from_path, to_path);
                out.send(250, "Requested file action okay, file renamed.").await
            }
            Err(e) => {
                warn!("Failed to rename {} to {}: {}", from_path, to_path, e);
                out.send(553, &format!("{}: Requested action not taken.", to_path))
                    .await
            }
        }
    }
}
