use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::lister::{send_listing, ListFormat};
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use std::io;

/// NLST: names of the files in a directory, over the data connection.
pub struct Nlst;

#[async_trait]
impl Command for Nlst {
    async fn execute(
        &self,
        _ctx: &FtpServerContext,
        session: &mut Session,
        request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        send_listing(session, request, out, ListFormat::Names).await
    }
}
