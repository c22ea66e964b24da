use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use std::io;

/// Handles the PWD FTP command.
pub struct Pwd;

#[async_trait]
impl Command for Pwd {
    async fn execute(
        &self,
        _ctx: &FtpServerContext,
        session: &mut Session,
        _request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        let quoted = session.current_dir.replace('"', "\"\"");
        out.send(257, &format!("\"{}\" is current directory.", quoted))
            .await
    }
}
