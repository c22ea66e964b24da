use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use std::io;

/// Handles the QUIT FTP command. The connection closes once the reply is sent.
pub struct Quit;

#[async_trait]
impl Command for Quit {
    async fn execute(
        &self,
        _ctx: &FtpServerContext,
        session: &mut Session,
        _request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        session.closing = true;
        out.send(221, "Goodbye.").await
    }
}
