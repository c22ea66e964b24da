use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use log::debug;
use std::io;

/// Handles the CWD FTP command. Without an argument the user goes back to the root of
/// the view.
pub struct Cwd;

/// Changes the working directory to `path` if it is a directory of the session's view.
pub async fn change_directory(
    session: &mut Session,
    path: String,
    out: &mut FtpWriter,
) -> io::Result<()> {
    let Some(fs) = session.file_system.as_deref() else {
        return out.send(530, "Not logged in.").await;
    };

    let is_directory = fs.file(&path).await.map(|f| f.is_directory()).unwrap_or(false);
    if !is_directory {
        return out.send(550, &format!("{}: No such directory.", path)).await;
    }

    debug!("Working directory of {} is now {}", session.peer_addr, path);
    session.current_dir = path;
    out.send(250, &format!("Directory changed to {}", session.current_dir))
        .await
}

#[async_trait]
impl Command for Cwd {
    async fn execute(
        &self,
        _ctx: &FtpServerContext,
        session: &mut Session,
        request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        let path = session.resolve(request.argument().unwrap_or("/"));
        change_directory(session, path, out).await
    }
}
