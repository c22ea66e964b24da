use crate::core_ftpcommand::handlers::Command;
use crate::core_ftpcommand::reply::FtpWriter;
use crate::core_ftpcommand::request::FtpRequest;
use crate::server::FtpServerContext;
use crate::session::Session;
use async_trait::async_trait;
use log::{info, warn};
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Handles the PASS FTP command.
///
/// Authenticates the name given with USER. On success the user's file system view is
/// created and the working directory is reset to its root.
pub struct Pass;

#[async_trait]
impl Command for Pass {
    async fn execute(
        &self,
        ctx: &FtpServerContext,
        session: &mut Session,
        request: &FtpRequest,
        out: &mut FtpWriter,
    ) -> io::Result<()> {
        let Some(username) = session.user_argument.take() else {
            return out.send(503, "Login with USER first.").await;
        };
        let password = request.argument().unwrap_or("").to_string();

        // Server wide login limit
        let max_logins = ctx.config.server.max_logins;
        if max_logins != 0 && ctx.statistics.snapshot().current_logins >= max_logins {
            warn!("Too many users logged in, rejecting {} from {}", username, session.peer_addr);
            session.closing = true;
            return out.send(421, "Too many users logged in, closing control connection.").await;
        }

        // bcrypt is slow on purpose; keep it off the reactor threads.
        let user_manager = Arc::clone(&ctx.user_manager);
        let name = username.clone();
        let authenticated =
            tokio::task::spawn_blocking(move || user_manager.authenticate(&name, &password)).await;

        let user = match authenticated {
            Ok(Ok(user)) => user,
            Ok(Err(e)) => {
                warn!("Login failed for {} from {}: {}", username, session.peer_addr, e);
                let (code, text) = e.to_ftp_response();
                return login_failed(ctx, session, out, code, text).await;
            }
            Err(e) => {
                warn!("Authentication task for {} failed: {}", username, e);
                return login_failed(ctx, session, out, 530, "Authentication failed.").await;
            }
        };

        let view = match ctx.file_system.create_view(&user).await {
            Ok(view) => view,
            Err(e) => {
                warn!("No file system view for {}: {}", user.name, e);
                ctx.statistics.set_login_fail();
                return out.send(530, "Authentication failed.").await;
            }
        };

        info!("Login success - {} from {}", user.name, session.peer_addr);
        ctx.statistics.set_login(user.anonymous);
        session.login(user, view);
        out.send(230, "User logged in, proceed.").await
    }
}

/// Counts a failed attempt, waits the configured delay and replies. Once the failure
/// limit is reached the reply is 421 and the session closes.
async fn login_failed(
    ctx: &FtpServerContext,
    session: &mut Session,
    out: &mut FtpWriter,
    code: u16,
    text: &str,
) -> io::Result<()> {
    session.failed_logins += 1;
    ctx.statistics.set_login_fail();

    let delay = ctx.config.server.login_failure_delay_ms;
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let max_failures = ctx.config.server.max_login_failures;
    if max_failures != 0 && session.failed_logins >= max_failures {
        warn!(
            "{} failed logins from {}, closing connection",
            session.failed_logins, session.peer_addr
        );
        session.closing = true;
        return out.send(421, "Too many failed logins, closing control connection.").await;
    }
    out.send(code, text).await
}

#[cfg(test)]
mod tests {
    use crate::config::ServerConfig;
    use crate::core_ftpcommand::dispatch::SessionFlow;
    use crate::core_ftpcommand::test_support::Harness;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_pass_without_user() {
        let mut h = Harness::new_logged_out().await;
        assert_eq!(h.run("PASS secret").await, vec![503]);
    }

    #[tokio::test]
    async fn test_unknown_user_is_rejected() {
        let mut h = Harness::new_logged_out().await;
        assert_eq!(h.run("USER nobody").await, vec![331]);
        assert_eq!(h.run("PASS secret").await, vec![530]);
        assert!(!h.session.is_logged_in());
        assert_eq!(h.ctx.statistics.snapshot().failed_logins, 1);
        assert_eq!(h.run("PASS secret").await, vec![503]);
    }

    #[tokio::test]
    async fn test_failed_logins_close_connection_at_limit() {
        let mut h = Harness::logged_out_with(ServerConfig {
            max_login_failures: 2,
            login_failure_delay_ms: 50,
            ..Default::default()
        })
        .await;

        h.run("USER nobody").await;
        let started = Instant::now();
        assert_eq!(h.run("PASS wrong").await, vec![530]);
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(!h.session.closing);

        h.run("USER nobody").await;
        assert_eq!(h.dispatch("PASS wrong").await, SessionFlow::Close);
        assert_eq!(h.out.replies(), &[421]);
        assert_eq!(h.session.failed_logins, 2);
        assert_eq!(h.ctx.statistics.snapshot().failed_logins, 2);
    }

    #[tokio::test]
    async fn test_no_failure_limit_when_zero() {
        let mut h = Harness::logged_out_with(ServerConfig {
            max_login_failures: 0,
            login_failure_delay_ms: 0,
            ..Default::default()
        })
        .await;

        for _ in 0..5 {
            h.run("USER nobody").await;
            assert_eq!(h.run("PASS wrong").await, vec![530]);
        }
        assert!(!h.session.closing);
    }

    #[tokio::test]
    async fn test_max_logins_rejects_with_421() {
        let mut h = Harness::logged_out_with(ServerConfig {
            max_logins: 1,
            ..Default::default()
        })
        .await;
        h.ctx.statistics.set_login(false);

        h.run("USER nobody").await;
        assert_eq!(h.dispatch("PASS secret").await, SessionFlow::Close);
        assert_eq!(h.out.replies(), &[421]);
        assert_eq!(h.ctx.statistics.snapshot().failed_logins, 0);
    }
}
