use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use log::debug;
use std::io;

/// Handles the RNFR (Rename From) FTP command. The source is remembered for the
/// immediately following RNTO.
pub struct Rnfr;

#[async_trait]
impl Command for Rnfr {
    async fn execute(
        &self,
        _ctx: &FtpServerContext,
        session: &mut Session,
        request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        let Some(name) = request.argument() else {
            return out.send(501, "Syntax error in parameters or arguments.").await;
        };
        let Some(fs) = session.file_system.as_deref() else {
            return out.send(530, "Not logged in.").await;
        };

        let path = session.resolve(name);
        let exists = fs.file(&path).await.map(|f| f.does_exist()).unwrap_or(false);
        if !exists {
            return out.send(550, &format!("{}: No such file or directory.", path)).await;
        }

        debug!("Rename source set to {}", path);
        session.rename_from = Some(path);
        out.send(350, "Requested file action pending further information.")
            .await
    }
}
