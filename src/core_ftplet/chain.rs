use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_ftplet::ftplet::{Ftplet, FtpletResult};
use crate::session::Session;
use async_trait::async_trait;
use std::io;
use std::sync::Arc;

/// Ftplets in registration order. Each hook stops at the first result that is not
/// `Continue`.
#[derive(Clone, Default)]
pub struct FtpletChain {
    ftplets: Vec<Arc<dyn Ftplet>>,
}

impl FtpletChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, ftplet: Arc<dyn Ftplet>) {
        self.ftplets.push(ftplet);
    }

    pub fn with(mut self, ftplet: Arc<dyn Ftplet>) -> Self {
        self.add(ftplet);
        self
    }

    pub fn len(&self) -> usize {
        self.ftplets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ftplets.is_empty()
    }
}

#[async_trait]
impl Ftplet for FtpletChain {
    async fn on_connect(&self, session: &mut Session) -> io::Result<FtpletResult> {
        for ftplet in &self.ftplets {
            let result = ftplet.on_connect(session).await?;
            if result != FtpletResult::Continue {
                return Ok(result);
            }
        }
        Ok(FtpletResult::Continue)
    }

    async fn on_disconnect(&self, session: &mut Session) -> io::Result<FtpletResult> {
        for ftplet in &self.ftplets {
            let result = ftplet.on_disconnect(session).await?;
            if result != FtpletResult::Continue {
                return Ok(result);
            }
        }
        Ok(FtpletResult::Continue)
    }

    async fn before_command(
        &self,
        session: &mut Session,
        request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<FtpletResult> {
        for ftplet in &self.ftplets {
            let result = ftplet.before_command(session, request, out).await?;
            if result != FtpletResult::Continue {
                return Ok(result);
            }
        }
        Ok(FtpletResult::Continue)
    }

    async fn after_command(
        &self,
        session: &mut Session,
        request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<FtpletResult> {
        for ftplet in &self.ftplets {
            let result = ftplet.after_command(session, request, out).await?;
            if result != FtpletResult::Continue {
                return Ok(result);
            }
        }
        Ok(FtpletResult::Continue)
    }
}
