use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::core_ftplet::{Ftplet, FtpletResult};
use crate::server::FtpServerContext;
use crate::session::Session;
use log::{debug, info};
use std::io;
use std::sync::Arc;

/// Whether the control connection stays open after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFlow {
    Continue,
    Close,
}

/// Runs one command line through the ftplets and the command registry.
///
/// # Arguments
///
/// * `ctx` - The shared server context.
/// * `session` - The state of the control connection.
/// * `line` - The raw command line, with or without its line terminator.
/// * `out` - The reply writer of the control connection.
///
/// # Returns
///
/// Whether to keep reading commands. An `Err` means the control connection failed.
pub async fn dispatch(
    ctx: &FtpServerContext,
    session: &mut Session,
    line: &str,
    out: &mut FtpWriter,
) -> io::Result<SessionFlow> {
    if line.trim_end_matches(['\r', '\n']).len() > ctx.config.server.max_command_length {
        out.send(500, "Command line too long.").await?;
        return Ok(SessionFlow::Continue);
    }

    let request = FtpRequest::parse(line);
    debug!("{} [{}] > {}", session.peer_addr, session.user_name(), request);

    let keeps_state = request.command().map(|c| c.keeps_state()).unwrap_or(false);
    if !keeps_state {
        session.reset_state();
    }

    let Some((command, handler)) = request
        .command()
        .and_then(|c| ctx.commands.get(&c).map(|handler| (c, Arc::clone(handler))))
    else {
        out.send(500, "Syntax error, command unrecognized.").await?;
        return Ok(SessionFlow::Continue);
    };

    if !session.is_logged_in() && !command.allowed_before_login() {
        out.send(530, "Please login with USER and PASS.").await?;
        return Ok(SessionFlow::Continue);
    }

    match ctx.ftplets.before_command(session, &request, out).await? {
        FtpletResult::Continue => {}
        FtpletResult::Skip => {
            debug!("{} skipped by ftplet", request.verb());
            return Ok(SessionFlow::Continue);
        }
        FtpletResult::Disconnect => {
            info!("Ftplet closed the connection of {} before {}", session.peer_addr, request.verb());
            return Ok(SessionFlow::Close);
        }
    }

    handler.execute(ctx, session, &request, out).await?;

    if ctx.ftplets.after_command(session, &request, out).await? == FtpletResult::Disconnect {
        info!("Ftplet closed the connection of {} after {}", session.peer_addr, request.verb());
        return Ok(SessionFlow::Close);
    }

    if session.closing {
        return Ok(SessionFlow::Close);
    }
    Ok(SessionFlow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_ftpcommand::test_support::Harness;
    use crate::core_ftplet::FtpletChain;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Intercept {
        verb: &'static str,
        before: FtpletResult,
        after: FtpletResult,
        after_calls: AtomicUsize,
    }

    #[async_trait]
    impl Ftplet for Intercept {
        async fn before_command(
            &self,
            _session: &mut Session,
            request: &FtpRequest,
            out: &mut FtpWriter,
        ) -> io::Result<FtpletResult> {
            if request.verb() != self.verb {
                return Ok(FtpletResult::Continue);
            }
            if self.before == FtpletResult::Skip {
                out.send(550, "Blocked.").await?;
            }
            Ok(self.before)
        }

        async fn after_command(
            &self,
            _session: &mut Session,
            request: &FtpRequest,
            _out: &mut FtpWriter,
        ) -> io::Result<FtpletResult> {
            if request.verb() != self.verb {
                return Ok(FtpletResult::Continue);
            }
            self.after_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.after)
        }
    }

    fn intercept(verb: &'static str, before: FtpletResult, after: FtpletResult) -> Arc<Intercept> {
        Arc::new(Intercept {
            verb,
            before,
            after,
            after_calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_unknown_verb() {
        let mut h = Harness::new().await;
        assert_eq!(h.run("XYZZY now").await, vec![500]);
        assert_eq!(h.run("").await, vec![500]);
    }

    #[tokio::test]
    async fn test_overlong_line() {
        let mut h = Harness::new().await;
        let line = format!("DELE {}", "a".repeat(5000));
        assert_eq!(h.run(&line).await, vec![500]);
    }

    #[tokio::test]
    async fn test_login_required() {
        let mut h = Harness::new_logged_out().await;
        assert_eq!(h.run("DELE a.txt").await, vec![530]);
        assert_eq!(h.run("PWD").await, vec![530]);
        assert_eq!(h.run("NOOP").await, vec![200]);
        assert_eq!(h.run("SYST").await, vec![215]);
    }

    #[tokio::test]
    async fn test_skip_prevents_body_and_statistics() {
        let ftplet = intercept("DELE", FtpletResult::Skip, FtpletResult::Continue);
        let mut h = Harness::with_ftplets(FtpletChain::new().with(ftplet.clone())).await;
        h.write_file("a.txt", "x");

        assert_eq!(h.run("DELE a.txt").await, vec![550]);
        assert!(h.path("a.txt").exists());
        assert_eq!(h.ctx.statistics.snapshot().deletes, 0);
        assert_eq!(ftplet.after_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_disconnect_before_command() {
        let ftplet = intercept("DELE", FtpletResult::Disconnect, FtpletResult::Continue);
        let mut h = Harness::with_ftplets(FtpletChain::new().with(ftplet)).await;
        h.write_file("a.txt", "x");

        let flow = h.dispatch("DELE a.txt").await;
        assert_eq!(flow, SessionFlow::Close);
        assert!(h.out.replies().is_empty());
        assert!(h.path("a.txt").exists());
    }

    #[tokio::test]
    async fn test_disconnect_after_command() {
        let ftplet = intercept("DELE", FtpletResult::Continue, FtpletResult::Disconnect);
        let mut h = Harness::with_ftplets(FtpletChain::new().with(ftplet.clone())).await;
        h.write_file("a.txt", "x");

        let flow = h.dispatch("DELE a.txt").await;
        assert_eq!(flow, SessionFlow::Close);
        assert_eq!(h.out.replies(), &[250]);
        assert!(!h.path("a.txt").exists());
        assert_eq!(ftplet.after_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_quit_closes() {
        let mut h = Harness::new().await;
        assert_eq!(h.dispatch("QUIT").await, SessionFlow::Close);
        assert_eq!(h.out.replies(), &[221]);
    }

    #[tokio::test]
    async fn test_transient_state_reset_between_commands() {
        let mut h = Harness::new().await;
        h.write_file("a.txt", "x");

        assert_eq!(h.run("RNFR a.txt").await, vec![350]);
        assert_eq!(h.run("NOOP").await, vec![200]);
        assert_eq!(h.run("RNTO b.txt").await, vec![503]);

        assert_eq!(h.run("RNFR a.txt").await, vec![350]);
        assert_eq!(h.run("RNTO b.txt").await, vec![250]);
        assert!(h.path("b.txt").exists());
    }
}
