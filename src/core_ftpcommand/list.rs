use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::lister::{send_listing, ListFormat};
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use std::io;

/// LIST: long format directory listing.
pub struct List;

#[async_trait]
impl Command for List {
    async fn execute(
        &self,
        _ctx: &FtpServerContext,
        session: &mut Session,
        request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        send_listing(session, request, out, ListFormat::Long).await
    }
}
