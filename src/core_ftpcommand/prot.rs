use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use log::debug;
use std::io;

/// Handles the PROT FTP command: C for clear, P for TLS protected data connections.
pub struct Prot;

#[async_trait]
impl Command for Prot {
    async fn execute(
        &self,
        ctx: &FtpServerContext,
        session: &mut Session,
        request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        let Some(level) = request.argument() else {
            return out.send(501, "Syntax error in parameters or arguments.").await;
        };

        match level.to_ascii_uppercase().as_str() {
            "C" => {
                session.data_connection.set_secure(false);
                out.send(200, "Command okay.").await
            }
            "P" if ctx.data_config.ssl_configuration().is_none() => {
                debug!("PROT P refused, no SSL configured");
                out.send(536, "Command not supported for policy reasons.").await
            }
            "P" => {
                session.data_connection.set_secure(true);
                out.send(200, "Command okay.").await
            }
            "S" | "E" => out.send(504, "Command not implemented for that parameter.").await,
            _ => out.send(501, "Syntax error in parameters or arguments.").await,
        }
    }
}
