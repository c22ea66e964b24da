use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use std::io;

/// Handles the PBSZ FTP command. Only a buffer size of 0 makes sense over TLS streams.
pub struct Pbsz;

#[async_trait]
impl Command for Pbsz {
    async fn execute(
        &self,
        _ctx: &FtpServerContext,
        _session: &mut Session,
        request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        match request.argument().map(str::parse::<u64>) {
            Some(Ok(_)) => out.send(200, "PBSZ=0").await,
            _ => out.send(501, "Syntax error in parameters or arguments.").await,
        }
    }
}
