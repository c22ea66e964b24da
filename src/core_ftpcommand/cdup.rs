use crate::core_ftpcommand::cwd::change_directory;
use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use crate::helpers::parent_path;
use std::io;

/// Handles the CDUP FTP command.
pub struct Cdup;

#[async_trait]
impl Command for Cdup {
    async fn execute(
        &self,
        _ctx: &FtpServerContext,
        session: &mut Session,
        _request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        let path = parent_path(&session.current_dir);
        change_directory(session, path, out).await
    }
}
