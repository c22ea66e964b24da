use crate::constants::SYSTEM_TYPE;
use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use std::io;

pub struct Syst;

#[async_trait]
impl Command for Syst {
    async fn execute(
        &self,
        _ctx: &FtpServerContext,
        _session: &mut Session,
        _request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        out.send(215, SYSTEM_TYPE).await
    }
}
