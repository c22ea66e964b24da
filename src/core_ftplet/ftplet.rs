use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::session::Session;
use async_trait::async_trait;
use std::io;

/// What the server does after an ftplet hook returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtpletResult {
    /// Run the next ftplet, then the server's own handling.
    Continue,
    /// Stop here; the ftplet has taken care of the reply.
    Skip,
    /// Close the control connection.
    Disconnect,
}

/// Hooks called around the life of a session and around each command.
///
/// Every hook defaults to `Continue`.
#[async_trait]
pub trait Ftplet: Send + Sync {
    async fn on_connect(&self, _session: &mut Session) -> io::Result<FtpletResult> {
        Ok(FtpletResult::Continue)
    }

    async fn on_disconnect(&self, _session: &mut Session) -> io::Result<FtpletResult> {
        Ok(FtpletResult::Continue)
    }

    async fn before_command(
        &self,
        _session: &mut Session,
        _request: &FtpRequest,
        _out: &mut FtpWriter,
    ) -> io::Result<FtpletResult> {
        Ok(FtpletResult::Continue)
    }

    async fn after_command(
        &self,
        _session: &mut Session,
        _request: &FtpRequest,
        _out: &mut FtpWriter,
    ) -> io::Result<FtpletResult> {
        Ok(FtpletResult::Continue)
    }
}
