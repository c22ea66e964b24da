use crate::constants::FEATURES;
use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use std::io;

/// Handles the FEAT FTP command with a multi-line list of extensions.
pub struct Feat;

#[async_trait]
impl Command for Feat {
    async fn execute(
        &self,
        _ctx: &FtpServerContext,
        _session: &mut Session,
        _request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        let mut lines = vec![String::from("Extensions supported")];
        lines.extend(FEATURES.iter().map(|feature| feature.to_string()));
        lines.push(String::from("End"));
        out.send_multiline(211, &lines).await
    }
}
