use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use log::info;
use std::io;

/// Handles the USER FTP command.
///
/// Remembers the user name for the following PASS and asks for the password.
pub struct User;

#[async_trait]
impl Command for User {
    async fn execute(
        &self,
        ctx: &FtpServerContext,
        session: &mut Session,
        request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        let Some(username) = request.argument() else {
            return out.send(501, "Syntax error in parameters or arguments.").await;
        };

        if session.is_logged_in() {
            return out.send(530, "Already logged in.").await;
        }

        let anonymous = ctx.user_manager.is_anonymous_name(username);
        if anonymous && !ctx.user_manager.is_anonymous_enabled() {
            session.user_argument = None;
            return out.send(530, "Anonymous connection not allowed.").await;
        }

        info!("USER {} from {}", username, session.peer_addr);
        session.user_argument = Some(username.to_string());
        if anonymous {
            out.send(331, "Guest login okay, send your complete e-mail address as password.")
                .await
        } else {
            out.send(331, "User name okay, need password.").await
        }
    }
}
